//! Actor layer: a long-lived analysis actor reached through a cloneable handle.

pub mod analysis;
pub mod messages;
pub mod traits;

pub use analysis::AnalysisActorHandle;
pub use traits::AnalysisActor;
