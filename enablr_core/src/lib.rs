pub mod access;
pub mod clients;
pub mod events;
pub mod http;
pub mod individuals;
pub mod registrations;
pub mod reminders;
pub mod supporters;
pub mod tasks;
pub mod types;

use std::fmt::{Display, Formatter};

pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A user-facing failure (bad input, missing record, permission problem)
/// as opposed to an infrastructure error. Handlers downcast to this to
/// pick a 4xx status instead of a blanket 500.
#[derive(Debug)]
pub struct DomainError {
    pub reason: String,
}

impl DomainError {
    pub fn new(reason: impl Into<String>) -> DomainError {
        DomainError {
            reason: reason.into(),
        }
    }
}

impl std::error::Error for DomainError {}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}
