use crate::core::models::application::{ApplicationQuery, Status};
use crate::core::ports::repository::ApplicationStore;
use crate::error::Error;

/// Number of applicants currently holding an approved slot, excluding the
/// given ids (administrators do not consume capacity). Always re-reads the
/// store; a stale count here would directly cause over-admission.
pub async fn approved_count<S>(store: &S, exclude: &[i64]) -> Result<i64, Error>
where
    S: ApplicationStore,
{
    store
        .count(&ApplicationQuery {
            status_eq: Some(Status::Approved),
            tg_id_not_in: exclude.to_vec(),
        })
        .await
}

pub async fn remaining<S>(store: &S, max_beta: i64, exclude: &[i64]) -> Result<i64, Error>
where
    S: ApplicationStore,
{
    let taken = approved_count(store, exclude).await?;
    Ok((max_beta - taken).max(0))
}
