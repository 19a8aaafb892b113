//! Message classification
//!
//! A message is classified by looking up the rule whose keyword equals the
//! message topic exactly. There is no substring, token or case-insensitive
//! matching: a topic either is a keyword or it classifies to nothing.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{ClassifierError, Result};
use crate::metrics::{self, Outcome};
use crate::models::{ClassMessage, ClassificationRule, NO_RULE_FOUND};
use crate::repository::MessageRepository;
use crate::rules::RuleStore;

/// Resolves messages to classification text
pub struct Classifier {
    messages: Box<dyn MessageRepository>,
    rules: RuleStore,
}

impl Classifier {
    pub fn new(messages: Box<dyn MessageRepository>, rules: RuleStore) -> Self {
        Self { messages, rules }
    }

    /// Classify a stored message by id.
    ///
    /// Fails with [`ClassifierError::NotFound`] when the message does not exist.
    /// Performs no writes.
    pub fn classify(&self, message_id: i64) -> Result<ClassMessage> {
        let start = Instant::now();

        let Some(message) = self.messages.get_message(message_id)? else {
            warn!(message_id, "Classification requested for unknown message");
            metrics::record_classification(Outcome::NotFound, start.elapsed());
            return Err(ClassifierError::NotFound("message"));
        };

        let (text, outcome) = match self.rules.find_rule_by_keyword(&message.topic)? {
            Some(rule) => {
                debug!(message_id, topic = %message.topic, rule_id = %rule.id, "Topic matched rule");
                (render(&rule), Outcome::Matched)
            }
            None => {
                debug!(message_id, topic = %message.topic, "No rule for topic");
                (NO_RULE_FOUND.to_string(), Outcome::Unmatched)
            }
        };

        metrics::record_classification(outcome, start.elapsed());
        info!(message_id, outcome = outcome.as_str(), "Message classified");

        Ok(ClassMessage { message: text })
    }

    /// Classify a bare topic string without a stored message
    pub fn classify_topic(&self, topic: &str) -> Result<String> {
        Ok(self
            .rules
            .find_rule_by_keyword(topic)?
            .map_or_else(|| NO_RULE_FOUND.to_string(), |rule| render(&rule)))
    }
}

/// Render a rule as `name[ action][ requires_append]`.
///
/// Empty or missing optional parts are skipped together with their separator.
#[must_use]
pub fn render(rule: &ClassificationRule) -> String {
    let mut text = rule.name.clone();

    for part in [&rule.action, &rule.requires_append] {
        if let Some(part) = part.as_deref().filter(|p| !p.is_empty()) {
            text.push(' ');
            text.push_str(part);
        }
    }

    text
}
