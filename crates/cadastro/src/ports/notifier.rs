//! Notifier Port
//!
//! How controllers talk back to the user: blocking notifications and
//! yes/no confirmations.

pub trait Notifier: Send + Sync {
    /// Surface a failure to the user
    fn notify_error(&self, message: &str);

    /// Surface a success or informational message
    fn notify_info(&self, message: &str);

    /// Ask the user to confirm a destructive action
    fn confirm(&self, prompt: &str) -> bool;
}
