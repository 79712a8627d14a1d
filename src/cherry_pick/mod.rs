//! Cherry-pick workflow
//!
//! Two-phase pattern matching the bulk engine:
//! 1. Plan - validate the request against the ledger (pure, testable)
//! 2. Execute - git, assistant handoff, publication, recording (effectful)

mod assistant;
mod message;
mod plan;
mod workflow;

pub use assistant::{Assistant, ConflictContext};
pub use message::{SIGNOFF_PREFIX, needs_normalization, normalize_signoffs};
pub use plan::{
    PickPlan, RELEASE_BRANCH_PREFIX, cherry_pick_body, cherry_pick_title, plan_pick,
    scratch_branch, version_token,
};
pub use workflow::{
    PickResult, PickedBranch, execute_pick, normalize_head_message, resolve_conflicts,
};
