//! GAALab Runner: configuration, strategies, orchestration, delivery.
//!
//! This crate builds on `gaalab-core` to provide:
//! - TOML configuration with defaults and validation
//! - Provider chain assembly (Yahoo, CSV import, synthetic)
//! - The GAA momentum and SPY/TIP strategies behind one `Strategy` trait
//! - Sequential strategy runner that isolates failures
//! - Message file and webhook sinks

pub mod chain;
pub mod config;
pub mod runner;
pub mod sink;
pub mod strategy;

pub use chain::provider_chain;
pub use config::{AppConfig, ConfigError};
pub use runner::{deliver, notifications, run_strategies, StrategyRun};
pub use sink::{MessageFileSink, NotificationSink, SinkError, WebhookSink};
pub use strategy::{build_strategies, GaaMomentum, RunContext, SpyTips, Strategy, StrategyError};
