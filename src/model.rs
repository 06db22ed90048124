//! Data types shared across the trainer.
//!
//! Everything here is plain data: the simulated remote record, activity
//! definitions and validator results. Behavior lives with the components
//! that own each type.

mod activity;
mod remote;
mod validation;

pub use activity::{ActivityConfig, Mission, SeedFile};
pub use remote::{PrStatus, PullRequest, RemoteCommit, RemoteRepository};
pub use validation::ValidationResult;
