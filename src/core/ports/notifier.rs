use async_trait::async_trait;
use serde::Serialize;

use crate::error::Error;

/// Outbound message payloads. Rendering (text, buttons, localization) is the
/// transport's concern; the core only states what happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Notice {
    /// Fanned out to every administrator on submission. Carries enough to
    /// render the approve/reject affordance keyed by `tg_id`.
    ApplicationReceived {
        tg_id: i64,
        first_name: String,
        last_name: String,
        username: String,
        reason: Option<String>,
    },
    Approved {
        credential: String,
    },
    Rejected,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: i64, notice: Notice) -> Result<(), Error>;
}
