pub mod metrics;
pub mod render;

pub use metrics::ScreenMetrics;
pub use render::{FrameStats, SkiaRenderer};
