use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One potential income channel for the current session.
///
/// `amount` is free-text user input parsed on read, never on write, so the
/// struct stores whatever was typed. See [`crate::engine::parse_or_zero`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncomeSource {
    pub id: Uuid,
    pub name: String,
    pub received: bool,
    pub amount: String,
}

impl IncomeSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            received: false,
            amount: String::new(),
        }
    }

    /// Returns the source to its pristine state without changing identity.
    pub fn clear(&mut self) {
        self.received = false;
        self.amount.clear();
    }
}
