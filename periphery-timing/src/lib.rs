pub mod timer;

pub use timer::{FrameStats, HighPrecisionTimer, SimulatedTimer, Timer};
