use async_trait::async_trait;

use crate::core::models::application::{Application, ApplicationQuery, Apply, DecisionPatch};
use crate::error::Error;

/// Storage port for applicant records. Implementations own durability and
/// must publish records atomically: a reader never observes a half-written
/// record, and an entry that cannot be read back is skipped during scans
/// rather than failing the whole operation.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Creates the pending record for a first-time applicant. Fails with
    /// [`Error::AlreadyExists`] when a record for `tg_id` is already present.
    async fn insert(&self, data: Apply) -> Result<Application, Error>;

    async fn get(&self, tg_id: i64) -> Result<Option<Application>, Error>;

    /// Merges a decision into the existing record and persists the result.
    /// Fails with [`Error::NotFound`] when no readable record exists.
    async fn patch(&self, tg_id: i64, patch: DecisionPatch) -> Result<Application, Error>;

    async fn count(&self, query: &ApplicationQuery) -> Result<i64, Error>;

    async fn list(&self, query: &ApplicationQuery) -> Result<Vec<Application>, Error>;
}
