//! Supervisor alerts raised by rule effects.

use std::fmt;

/// Notification sent to the supervisor side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Controller whose rule fired.
    pub controller: String,
    pub message: String,
}

impl Alert {
    pub fn new(controller: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.controller, self.message)
    }
}
