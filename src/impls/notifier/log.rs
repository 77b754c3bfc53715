use async_trait::async_trait;
use log::info;

use crate::core::ports::notifier::{Notice, Notifier};
use crate::error::Error;

/// Default sink: writes every notice to the log. Real transports implement
/// [`Notifier`] themselves.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: i64, notice: Notice) -> Result<(), Error> {
        info!("notice for {}: {:?}", recipient, notice);
        Ok(())
    }
}
