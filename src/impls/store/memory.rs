use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::models::application::{Application, ApplicationQuery, Apply, DecisionPatch};
use crate::core::ports::repository::ApplicationStore;
use crate::error::Error;

/// Map-backed store with the same contract as the durable one. Used by tests
/// and ephemeral deployments.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<i64, Application>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert(&self, data: Apply) -> Result<Application, Error> {
        let mut records = self.records.write().await;
        if records.contains_key(&data.tg_id) {
            return Err(Error::AlreadyExists(data.tg_id));
        }
        let application = Application::pending(data);
        records.insert(application.tg_id, application.clone());
        Ok(application)
    }

    async fn get(&self, tg_id: i64) -> Result<Option<Application>, Error> {
        Ok(self.records.read().await.get(&tg_id).cloned())
    }

    async fn patch(&self, tg_id: i64, patch: DecisionPatch) -> Result<Application, Error> {
        let mut records = self.records.write().await;
        let application = records.get_mut(&tg_id).ok_or(Error::NotFound(tg_id))?;
        application.merge(patch);
        Ok(application.clone())
    }

    async fn count(&self, query: &ApplicationQuery) -> Result<i64, Error> {
        let records = self.records.read().await;
        Ok(records.values().filter(|a| query.matches(a)).count() as i64)
    }

    async fn list(&self, query: &ApplicationQuery) -> Result<Vec<Application>, Error> {
        let records = self.records.read().await;
        let mut applications: Vec<Application> =
            records.values().filter(|a| query.matches(a)).cloned().collect();
        applications.sort_by_key(|a| (a.applied_at, a.tg_id));
        Ok(applications)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::core::models::application::Status;

    fn apply(tg_id: i64) -> Apply {
        Apply {
            tg_id,
            first_name: "Ann".to_owned(),
            last_name: "Tester".to_owned(),
            username: "ann".to_owned(),
            reason: None,
        }
    }

    #[tokio::test]
    async fn contract_matches_the_durable_store() {
        let store = MemoryStore::new();
        let created = store.insert(apply(1)).await.unwrap();
        assert_eq!(created.status, Status::Pending);
        assert!(matches!(
            store.insert(apply(1)).await,
            Err(Error::AlreadyExists(1))
        ));
        let patched = store
            .patch(
                1,
                DecisionPatch {
                    status: Status::Rejected,
                    credential: None,
                    decided_at: Utc::now(),
                    decided_by: 9,
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.status, Status::Rejected);
        assert_eq!(store.get(1).await.unwrap().unwrap(), patched);
        assert!(matches!(
            store
                .patch(
                    2,
                    DecisionPatch {
                        status: Status::Rejected,
                        credential: None,
                        decided_at: Utc::now(),
                        decided_by: 9,
                    },
                )
                .await,
            Err(Error::NotFound(2))
        ));
    }

    #[tokio::test]
    async fn count_filters_by_status_and_exclusion() {
        let store = MemoryStore::new();
        for id in 1..=3 {
            store.insert(apply(id)).await.unwrap();
        }
        store
            .patch(
                2,
                DecisionPatch {
                    status: Status::Approved,
                    credential: Some("key".into()),
                    decided_at: Utc::now(),
                    decided_by: 9,
                },
            )
            .await
            .unwrap();
        let approved = ApplicationQuery {
            status_eq: Some(Status::Approved),
            ..Default::default()
        };
        assert_eq!(store.count(&approved).await.unwrap(), 1);
        let approved_excluding_2 = ApplicationQuery {
            status_eq: Some(Status::Approved),
            tg_id_not_in: vec![2],
        };
        assert_eq!(store.count(&approved_excluding_2).await.unwrap(), 0);
    }
}
