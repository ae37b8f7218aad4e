//! Doubles (2v2) court scheduling that keeps playing time even and steers
//! away from repeated partners and opponents.

pub mod action;
pub mod builder;
pub mod cache;
pub mod config;
pub mod fairness;
pub mod model;
pub mod report;
pub mod rng;
pub mod schedule;

pub use config::{ConfigError, ScheduleConfig};
pub use model::entity::{Match, PairKey, PlayerId};
pub use model::history::{History, PairCounts};
pub use model::weights::Weights;
pub use report::ScheduleReport;
pub use schedule::{generate_schedule, ScheduleError};
