use crate::db::Database;
use crate::error::Result;
use crate::models::Message;

/// Read access to stored messages, as needed by the classifier
pub trait MessageRepository {
    /// Fetch a message by id, `None` when it does not exist
    fn get_message(&self, message_id: i64) -> Result<Option<Message>>;
}

impl MessageRepository for Database {
    fn get_message(&self, message_id: i64) -> Result<Option<Message>> {
        self.get_message_by_id(message_id)
    }
}
