/// Maps screen centimeters (origin at the center, y up) to pixels
/// (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMetrics {
    pub width: u32,
    pub height: u32,
    pub px_per_cm: f32,
}

impl ScreenMetrics {
    pub fn new(width: u32, height: u32, monitor_width_cm: f64) -> Self {
        Self {
            width,
            height,
            px_per_cm: (width as f64 / monitor_width_cm) as f32,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn to_pixels(&self, position_cm: (f64, f64)) -> (f32, f32) {
        let (cx, cy) = self.center();
        (
            cx + position_cm.0 as f32 * self.px_per_cm,
            cy - position_cm.1 as f32 * self.px_per_cm,
        )
    }

    pub fn length_px(&self, cm: f64) -> f32 {
        cm as f32 * self.px_per_cm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
    }

    #[test]
    fn uhd_panel_two_meters_wide() {
        let m = ScreenMetrics::new(3840, 2160, 200.0);
        assert!((m.px_per_cm - 19.2).abs() < 1e-5);
        assert_eq!(m.to_pixels((0.0, 0.0)), (1920.0, 1080.0));
        assert!(close(m.to_pixels((10.0, 0.0)), (2112.0, 1080.0)));
        // Up on screen is a smaller row index.
        assert!(close(m.to_pixels((0.0, 10.0)), (1920.0, 888.0)));
        assert!((m.length_px(5.0) - 96.0).abs() < 1e-3);
    }
}
