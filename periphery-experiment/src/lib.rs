pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod sequencer;
pub mod setup;
pub mod sink;

pub use config::{DirectionCalibration, ExperimentConfig};
pub use display::Display;
pub use error::{ExperimentError, Result};
pub use sequencer::TrialSequencer;
pub use sink::{CsvSink, DiscardSink, ResultSink};
