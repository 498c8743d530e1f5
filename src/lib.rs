// src/lib.rs
pub mod config;
pub mod engine;
pub mod recorder;
pub mod signal;
pub mod types;
pub use config::ScanConfig;
pub use recorder::DataRecorder;
pub use signal::{ChannelSet, RangeState, ScanDriver, ScanError, TimeAxis};
