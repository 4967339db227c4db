//! Request-scoped logging.
//!
//! Each request gets its own `RequestLog`, passed down the pipeline, so every
//! line it writes carries the request id.

use std::fmt::Display;

use uuid::Uuid;

const TARGET: &str = "getpass";

#[derive(Debug, Clone)]
pub struct RequestLog {
    request_id: Uuid,
}

impl RequestLog {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn debug(&self, message: impl Display) {
        log::debug!(target: TARGET, "[{}] {}", self.request_id, message);
    }

    pub fn info(&self, message: impl Display) {
        log::info!(target: TARGET, "[{}] {}", self.request_id, message);
    }

    pub fn warn(&self, message: impl Display) {
        log::warn!(target: TARGET, "[{}] {}", self.request_id, message);
    }

    pub fn error(&self, message: impl Display) {
        log::error!(target: TARGET, "[{}] {}", self.request_id, message);
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new()
    }
}
