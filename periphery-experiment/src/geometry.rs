use crate::config::ExperimentConfig;
use periphery_core::Direction;

/// Where and how large the letter array is drawn, in screen centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StimulusGeometry {
    pub height_cm: f64,
    pub position_cm: (f64, f64),
}

/// Linear size on the screen of `angle_deg` seen from `viewing_distance_cm`.
pub fn angle_to_cm(angle_deg: f64, viewing_distance_cm: f64) -> f64 {
    angle_deg.to_radians().tan() * viewing_distance_cm
}

pub fn stimulus_geometry(
    config: &ExperimentConfig,
    size_deg: f64,
    angle_deg: f64,
    direction: Direction,
) -> StimulusGeometry {
    let calibration = config.calibration_for(direction);
    let height_cm = angle_to_cm(size_deg, config.viewing_distance_cm) * config.legibility_ratio;
    let offset_cm = angle_to_cm(angle_deg, config.viewing_distance_cm);

    let x = calibration.x_multiplier * offset_cm;
    let mut y = calibration.y_multiplier * offset_cm + calibration.y_offset_cm;
    if angle_deg == 0.0 && direction.is_vertical() {
        y += config.centering_nudge_cm;
    }

    StimulusGeometry {
        height_cm,
        position_cm: (x, y),
    }
}
