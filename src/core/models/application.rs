use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Pending)
    }
}

/// One applicant's durable record. `tg_id` is the primary key; everything
/// except `status` and the decision metadata is captured once at submission.
/// Disk field names keep the legacy layout (`vpn_key`, `approved_at`,
/// `approved_by`) so stores written under it stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub tg_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub status: Status,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(rename = "vpn_key", default)]
    pub credential: Option<String>,
    pub applied_at: DateTime<Utc>,
    #[serde(rename = "approved_at", default)]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(rename = "approved_by", default)]
    pub decided_by: Option<i64>,
}

impl Application {
    pub fn pending(data: Apply) -> Self {
        Self {
            tg_id: data.tg_id,
            first_name: data.first_name,
            last_name: data.last_name,
            username: data.username,
            status: Status::Pending,
            reason: data.reason,
            credential: None,
            applied_at: Utc::now(),
            decided_at: None,
            decided_by: None,
        }
    }

    pub fn merge(&mut self, patch: DecisionPatch) {
        self.status = patch.status;
        self.credential = patch.credential;
        self.decided_at = Some(patch.decided_at);
        self.decided_by = Some(patch.decided_by);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Apply {
    pub tg_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub reason: Option<String>,
}

/// The only patch shape the state machine issues: a terminal transition
/// together with its decision metadata.
#[derive(Debug, Clone)]
pub struct DecisionPatch {
    pub status: Status,
    pub credential: Option<String>,
    pub decided_at: DateTime<Utc>,
    pub decided_by: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationQuery {
    pub status_eq: Option<Status>,
    pub tg_id_not_in: Vec<i64>,
}

impl ApplicationQuery {
    pub fn matches(&self, application: &Application) -> bool {
        if let Some(status) = self.status_eq {
            if application.status != status {
                return false;
            }
        }
        !self.tg_id_not_in.contains(&application.tg_id)
    }
}
