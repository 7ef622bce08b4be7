use crate::error::Result;
use periphery_core::{ResponseKey, Scene};

/// Presentation surface and keyboard the experiment runs against.
pub trait Display {
    /// Draws `scene` and swaps it onto the screen. Keys pressed before the
    /// swap are discarded.
    fn present(&mut self, scene: &Scene) -> Result<()>;

    /// Blocks until one of `allowed` is pressed and returns it. A close
    /// request on the surface yields `ExperimentError::AbortedByUser`.
    fn await_response(&mut self, allowed: &[ResponseKey]) -> Result<ResponseKey>;
}

impl<D: Display + ?Sized> Display for &mut D {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        (**self).present(scene)
    }

    fn await_response(&mut self, allowed: &[ResponseKey]) -> Result<ResponseKey> {
        (**self).await_response(allowed)
    }
}
