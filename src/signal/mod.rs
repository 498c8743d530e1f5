// src/signal/mod.rs
// Rolling time-window engine: shared axis, per-channel windows, axis ranging.
pub mod axis;
pub mod channel;
pub mod driver;
pub mod error;
pub mod range;
pub mod set;
pub mod source;
pub use axis::TimeAxis;
pub use channel::{Channel, Normalizer};
pub use driver::{ScanDriver, ScanHeader, ScanState, TickRecord, TickReport, TickSink};
pub use error::ScanError;
pub use range::RangeState;
pub use set::{ChannelSet, Series};
pub use source::{AcquisitionSource, ManualSource, Reading, SimulatedSource};
