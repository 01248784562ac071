pub mod forms;
pub mod ledger;
pub mod queries;
pub mod types;
pub mod workflow;

pub use ledger::{VotingLedger, VotingStats};
pub use queries::*;
pub use types::*;
pub use workflow::WorkflowChange;
