#![forbid(unsafe_code)]

pub mod config;
pub mod digits;
pub mod model;
pub mod numbers;
pub mod opponent;
pub mod phase;
pub mod scoring;
pub mod time;

pub use config::{ConfigError, GameConfig};
pub use phase::Phase;
pub use time::Clock;
