//! Agent-side runtime pieces built on the Waggle knowledge map.
//!
//! This crate owns everything an agent needs around its [`KnowledgeMap`]:
//! typed configuration, plan-following navigation, and the target
//! bookkeeping that goes with sending and receiving snapshots.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `waggle-config.yaml` into
//!   strongly-typed structs.
//! - [`exchange`] -- Snapshot send/receive with [`TargetDisclosure`].
//! - [`navigator`] -- [`Navigator`]: a map plus the plan being walked.
//!
//! [`KnowledgeMap`]: waggle_world::KnowledgeMap
//! [`TargetDisclosure`]: exchange::TargetDisclosure
//! [`Navigator`]: navigator::Navigator

pub mod config;
pub mod exchange;
pub mod navigator;

// Re-export primary types at crate root.
pub use config::{ConfigError, WaggleConfig};
pub use exchange::{ExchangeError, TargetDisclosure};
pub use navigator::Navigator;
