use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::{constraint_violation, ClassifierError, Constraint, Result};
use crate::models::{Message, NewMessage, NewPhysician, Physician};
use crate::schema::{messages, physicians};
use crate::validation::InputValidator;

// Type alias for the database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const MEMORY_URL: &str = ":memory:";

/// Database manager for handling connections and collaborator records.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database connection pool with default pool settings
    pub fn new(database_url: &str) -> Result<Self> {
        Self::with_pool_settings(database_url, 10, Duration::from_secs(30))
    }

    /// Create a connection pool from configuration
    pub fn from_config(config: &DatabaseConfig, database_url: &str) -> Result<Self> {
        Self::with_pool_settings(
            database_url,
            config.max_connections,
            Duration::from_secs(config.connection_timeout_secs),
        )
    }

    /// Private in-memory database, mostly for tests
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_URL)
    }

    fn with_pool_settings(database_url: &str, max_connections: u32, timeout: Duration) -> Result<Self> {
        let path = database_path(database_url);

        // Every in-memory connection is its own database, so the pool must
        // hold exactly one connection and never recycle it.
        let pool = if path == MEMORY_URL {
            let manager = SqliteConnectionManager::memory().with_init(configure_connection);
            Pool::builder()
                .max_size(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connection_timeout(timeout)
                .build(manager)?
        } else {
            // Create parent directory if it doesn't exist
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }

            let manager = SqliteConnectionManager::file(path).with_init(configure_connection);
            Pool::builder()
                .max_size(max_connections)
                .connection_timeout(timeout)
                .build(manager)?
        };

        let conn = pool.get()?;
        Self::run_migrations(&conn)?;
        info!(path, "Database ready");

        Ok(Self { pool })
    }

    /// Run database migrations
    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!(
            "../migrations/2025-08-01-000000_create_physicians_messages/up.sql"
        ))?;
        conn.execute_batch(include_str!(
            "../migrations/2025-08-01-000001_create_classification_rules/up.sql"
        ))?;
        debug!("Migrations applied");
        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Add a new physician
    pub fn add_physician(&self, new_physician: NewPhysician) -> Result<Physician> {
        let conn = self.get_connection()?;
        insert_physician(&conn, new_physician)
    }

    /// Add physicians in a single transaction; nothing is stored if any row fails
    pub fn add_physicians(&self, new_physicians: Vec<NewPhysician>) -> Result<usize> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        let count = new_physicians.len();
        for physician in new_physicians {
            insert_physician(&tx, physician)?;
        }
        tx.commit()?;
        Ok(count)
    }

    /// Get a physician by ID
    pub fn get_physician(&self, physician_id: i64) -> Result<Option<Physician>> {
        let conn = self.get_connection()?;

        let physician = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", physicians::TABLE, physicians::ID),
                params![physician_id],
                map_physician,
            )
            .optional()?;

        Ok(physician)
    }

    /// Add a new message
    pub fn add_message(&self, new_message: NewMessage) -> Result<Message> {
        let conn = self.get_connection()?;
        insert_message(&conn, new_message)
    }

    /// Add messages in a single transaction; nothing is stored if any row fails
    pub fn add_messages(&self, new_messages: Vec<NewMessage>) -> Result<usize> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        let count = new_messages.len();
        for message in new_messages {
            insert_message(&tx, message)?;
        }
        tx.commit()?;
        Ok(count)
    }

    /// Get a message by ID
    pub fn get_message_by_id(&self, message_id: i64) -> Result<Option<Message>> {
        let conn = self.get_connection()?;

        let message = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", messages::TABLE, messages::ID),
                params![message_id],
                map_message,
            )
            .optional()?;

        Ok(message)
    }
}

/// Strip the `sqlite:` / `sqlite://` scheme from a database URL
#[must_use]
pub fn database_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

fn configure_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

fn insert_physician(conn: &Connection, new_physician: NewPhysician) -> Result<Physician> {
    InputValidator::validate_new_physician(&new_physician)?;

    conn.execute(
        &format!(
            "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            physicians::TABLE,
            physicians::ID,
            physicians::NPI,
            physicians::FIRST_NAME,
            physicians::LAST_NAME,
            physicians::SPECIALTY,
            physicians::STATE,
            physicians::CONSENT_OPT_IN,
            physicians::PREFERRED_CHANNEL
        ),
        params![
            new_physician.physician_id,
            new_physician.npi,
            new_physician.first_name,
            new_physician.last_name,
            new_physician.specialty,
            new_physician.state,
            new_physician.consent_opt_in,
            new_physician.preferred_channel
        ],
    )
    .map_err(|e| match constraint_violation(&e) {
        Some(Constraint::Duplicate) => ClassifierError::DuplicateKey(format!(
            "physician {} already exists",
            new_physician.physician_id.unwrap_or_default()
        )),
        _ => e.into(),
    })?;

    Ok(Physician {
        physician_id: conn.last_insert_rowid(),
        npi: new_physician.npi,
        first_name: new_physician.first_name,
        last_name: new_physician.last_name,
        specialty: new_physician.specialty,
        state: new_physician.state,
        consent_opt_in: new_physician.consent_opt_in,
        preferred_channel: new_physician.preferred_channel,
    })
}

fn insert_message(conn: &Connection, new_message: NewMessage) -> Result<Message> {
    InputValidator::validate_new_message(&new_message)?;

    let timestamp = new_message.timestamp.unwrap_or_else(|| Utc::now().naive_utc());

    conn.execute(
        &format!(
            "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            messages::TABLE,
            messages::ID,
            messages::PHYSICIAN_ID,
            messages::CHANNEL,
            messages::DIRECTION,
            messages::TIMESTAMP,
            messages::MESSAGE_TEXT,
            messages::CAMPAIGN_ID,
            messages::TOPIC,
            messages::COMPLIANCE_TAG,
            messages::SENTIMENT,
            messages::DELIVERY_STATUS,
            messages::RESPONSE_LATENCY_SEC
        ),
        params![
            new_message.message_id,
            new_message.physician_id,
            new_message.channel,
            new_message.direction,
            timestamp,
            new_message.message_text,
            new_message.campaign_id,
            new_message.topic,
            new_message.compliance_tag,
            new_message.sentiment,
            new_message.delivery_status,
            new_message.response_latency_sec
        ],
    )
    .map_err(|e| match constraint_violation(&e) {
        Some(Constraint::Duplicate) => ClassifierError::DuplicateKey(format!(
            "message {} already exists",
            new_message.message_id.unwrap_or_default()
        )),
        Some(Constraint::ForeignKey) => {
            ClassifierError::ForeignKey(format!("physician {} does not exist", new_message.physician_id))
        }
        None => e.into(),
    })?;

    Ok(Message {
        message_id: conn.last_insert_rowid(),
        physician_id: new_message.physician_id,
        channel: new_message.channel,
        direction: new_message.direction,
        timestamp,
        message_text: new_message.message_text,
        campaign_id: new_message.campaign_id,
        topic: new_message.topic,
        compliance_tag: new_message.compliance_tag,
        sentiment: new_message.sentiment,
        delivery_status: new_message.delivery_status,
        response_latency_sec: new_message.response_latency_sec,
    })
}

/// Map a database row to a Physician
fn map_physician(row: &Row) -> rusqlite::Result<Physician> {
    Ok(Physician {
        physician_id: row.get(physicians::ID)?,
        npi: row.get(physicians::NPI)?,
        first_name: row.get(physicians::FIRST_NAME)?,
        last_name: row.get(physicians::LAST_NAME)?,
        specialty: row.get(physicians::SPECIALTY)?,
        state: row.get(physicians::STATE)?,
        consent_opt_in: row.get(physicians::CONSENT_OPT_IN)?,
        preferred_channel: row.get(physicians::PREFERRED_CHANNEL)?,
    })
}

/// Map a database row to a Message
fn map_message(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        message_id: row.get(messages::ID)?,
        physician_id: row.get(messages::PHYSICIAN_ID)?,
        channel: row.get(messages::CHANNEL)?,
        direction: row.get(messages::DIRECTION)?,
        timestamp: row.get(messages::TIMESTAMP)?,
        message_text: row.get(messages::MESSAGE_TEXT)?,
        campaign_id: row.get(messages::CAMPAIGN_ID)?,
        topic: row.get(messages::TOPIC)?,
        compliance_tag: row.get(messages::COMPLIANCE_TAG)?,
        sentiment: row.get(messages::SENTIMENT)?,
        delivery_status: row.get(messages::DELIVERY_STATUS)?,
        response_latency_sec: row.get(messages::RESPONSE_LATENCY_SEC)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_strips_scheme() {
        assert_eq!(database_path("sqlite:data/compliance.db"), "data/compliance.db");
        assert_eq!(database_path("sqlite:///tmp/c.db"), "/tmp/c.db");
        assert_eq!(database_path(":memory:"), ":memory:");
        assert_eq!(database_path("plain.db"), "plain.db");
    }

    #[test]
    fn test_in_memory_database_survives_reuse() {
        let db = Database::in_memory().unwrap();
        let physician = db
            .add_physician(NewPhysician {
                specialty: "Cardiology".to_string(),
                state: "NJ".to_string(),
                ..NewPhysician::default()
            })
            .unwrap();

        // Second checkout must see the same database
        assert!(db.get_physician(physician.physician_id).unwrap().is_some());
    }
}
