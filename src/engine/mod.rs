pub mod composer;
pub mod composition;
pub mod group;
pub mod pair_history;
pub mod planner;
pub mod session;

pub use composer::GroupComposer;
pub use composition::{AnyComposition, CompositionValidator, GenderBalance, GenderTally};
pub use group::{Group, Session};
pub use pair_history::{HistorySnapshot, PairHistory};
pub use planner::{GroupPlan, plan};
pub use session::{SessionOrchestrator, SessionReport};
