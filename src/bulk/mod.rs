//! Bulk operations over eligible (PR, branch) pairs
//!
//! Uses the same two-phase pattern as the pick workflow:
//! 1. Plan - select eligible pairs (pure, testable)
//! 2. Execute - call the platform and record outcomes (effectful)

mod execute;
mod plan;
mod refresh;

pub use execute::{BulkOutcome, BulkReport, PairFailure, execute_bulk};
pub use plan::{BulkOperation, BulkPlan, BulkScope, BulkStep, plan_bulk, validate_pair};
pub use refresh::{RefreshReport, refresh_ci_status};
