use std::collections::HashSet;

use chrono::Utc;
use log::{info, warn};
use rand::Rng;
use tokio::sync::Mutex;

use crate::core::models::application::{
    Application, ApplicationQuery, Apply, DecisionPatch, Status,
};
use crate::core::ports::notifier::{Notice, Notifier};
use crate::core::ports::repository::ApplicationStore;
use crate::core::services::capacity;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// What an operation did, reported as a value. Duplicate submissions,
/// re-decisions, capacity misses and authorization misses are all normal
/// outcomes here; [`Error`] is reserved for storage failures.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Submitted(Application),
    AlreadyApplied,
    Approved { credential: String },
    Rejected,
    AlreadyDecided(Status),
    CapacityExhausted,
    UnknownApplicant,
    NotAuthorized,
}

/// The approval state machine. All mutating operations run their
/// read-check-write sequence under one gate: capacity is a store-wide
/// quantity, so a single lock covers both the per-applicant race and the
/// two-approvals-on-the-last-slot race. Notification I/O happens after the
/// gate is released.
pub struct BetaProgram<S, N> {
    store: S,
    notifier: N,
    admin_ids: HashSet<i64>,
    max_beta: i64,
    gate: Mutex<()>,
}

impl<S, N> BetaProgram<S, N>
where
    S: ApplicationStore,
    N: Notifier,
{
    pub fn new(store: S, notifier: N, admin_ids: HashSet<i64>, max_beta: i64) -> Self {
        Self {
            store,
            notifier,
            admin_ids,
            max_beta,
            gate: Mutex::new(()),
        }
    }

    pub async fn submit(&self, data: Apply) -> Result<Outcome, Error> {
        let created = {
            let _gate = self.gate.lock().await;
            if self.store.get(data.tg_id).await?.is_some() {
                return Ok(Outcome::AlreadyApplied);
            }
            self.store.insert(data).await?
        };
        info!("application {} submitted", created.tg_id);
        let notice = Notice::ApplicationReceived {
            tg_id: created.tg_id,
            first_name: created.first_name.clone(),
            last_name: created.last_name.clone(),
            username: created.username.clone(),
            reason: created.reason.clone(),
        };
        for admin_id in &self.admin_ids {
            self.deliver(*admin_id, notice.clone()).await;
        }
        Ok(Outcome::Submitted(created))
    }

    pub async fn decide(
        &self,
        tg_id: i64,
        decision: Decision,
        decided_by: i64,
    ) -> Result<Outcome, Error> {
        if !self.admin_ids.contains(&decided_by) {
            return Ok(Outcome::NotAuthorized);
        }
        let outcome = {
            let _gate = self.gate.lock().await;
            let current = match self.store.get(tg_id).await? {
                Some(application) => application,
                None => return Ok(Outcome::UnknownApplicant),
            };
            if current.status.is_terminal() {
                return Ok(Outcome::AlreadyDecided(current.status));
            }
            match decision {
                Decision::Reject => {
                    self.store
                        .patch(
                            tg_id,
                            DecisionPatch {
                                status: Status::Rejected,
                                credential: None,
                                decided_at: Utc::now(),
                                decided_by,
                            },
                        )
                        .await?;
                    Outcome::Rejected
                }
                Decision::Approve => {
                    let exclude: Vec<i64> = self.admin_ids.iter().copied().collect();
                    if capacity::remaining(&self.store, self.max_beta, &exclude).await? <= 0 {
                        Outcome::CapacityExhausted
                    } else {
                        let credential = random_credential();
                        self.store
                            .patch(
                                tg_id,
                                DecisionPatch {
                                    status: Status::Approved,
                                    credential: Some(credential.clone()),
                                    decided_at: Utc::now(),
                                    decided_by,
                                },
                            )
                            .await?;
                        Outcome::Approved { credential }
                    }
                }
            }
        };
        match &outcome {
            Outcome::Approved { credential } => {
                info!("application {} approved by {}", tg_id, decided_by);
                self.deliver(
                    tg_id,
                    Notice::Approved {
                        credential: credential.clone(),
                    },
                )
                .await;
            }
            Outcome::Rejected => {
                info!("application {} rejected by {}", tg_id, decided_by);
                self.deliver(tg_id, Notice::Rejected).await;
            }
            Outcome::CapacityExhausted => {
                info!("application {} left pending, beta is full", tg_id);
            }
            _ => {}
        }
        Ok(outcome)
    }

    pub async fn status_of(&self, tg_id: i64) -> Result<Option<Application>, Error> {
        self.store.get(tg_id).await
    }

    pub async fn pending_applications(&self) -> Result<Vec<Application>, Error> {
        self.store
            .list(&ApplicationQuery {
                status_eq: Some(Status::Pending),
                ..Default::default()
            })
            .await
    }

    /// A delivery failure must not roll back a committed transition and must
    /// not block the remaining recipients.
    async fn deliver(&self, recipient: i64, notice: Notice) {
        if let Err(e) = self.notifier.notify(recipient, notice).await {
            warn!("failed to notify {}: {}", recipient, e);
        }
    }
}

fn random_credential() -> String {
    let chars = b"1234567890abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::thread_rng();
    let mut key = String::new();
    for _ in 0..32 {
        let i = rng.gen_range(0..chars.len());
        key.push(chars[i] as char);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::random_credential;

    #[test]
    fn credential_is_32_alphanumeric_chars() {
        let key = random_credential();
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn credentials_are_unique() {
        assert_ne!(random_credential(), random_credential());
    }
}
