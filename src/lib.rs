pub mod args;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod runner;
pub mod score;
pub mod standings;
pub mod storage;

pub use config::EngineConfig;
pub use engine::{RunOutcome, SkipReason, score_tournament};
pub use error::EngineError;
pub use standings::season_standings;
