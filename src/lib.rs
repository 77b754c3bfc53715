//! Beta-access request manager: applicants submit a registration request,
//! administrators approve or reject it, and a global capacity ceiling bounds
//! how many applicants hold approved status at once. The chat transport is
//! an external collaborator talking to [`BetaProgram`] and implementing
//! [`Notifier`]; this crate owns the records and the approval state machine.

pub mod config;
pub mod core;
pub mod error;
pub mod impls;
pub mod sanitize;

pub use crate::config::Config;
pub use crate::core::models::application::{
    Application, ApplicationQuery, Apply, DecisionPatch, Status,
};
pub use crate::core::ports::notifier::{Notice, Notifier};
pub use crate::core::ports::repository::ApplicationStore;
pub use crate::core::services::application::{BetaProgram, Decision, Outcome};
pub use crate::error::Error;
