//! The host side of a run: upload, round loop, frontier exchange and
//! level aggregation.

pub mod aggregate;
pub mod bfs;
pub mod context;
pub mod engine;
pub mod exchange;
pub mod populate;

pub use aggregate::LevelMap;
pub use bfs::{RunReport, run_bfs, run_simulated};
pub use context::{OrchestratorContext, PhaseTimes};
pub use engine::{EngineState, RoundStats, SyncEngine};
pub use exchange::{FrontierExchange, Step, TopologyExchange};
