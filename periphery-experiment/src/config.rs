use crate::error::{ExperimentError, Result};
use crate::sink::session_path;
use chrono::NaiveDate;
use periphery_core::scene::{BLACK, RED, WHITE};
use periphery_core::{DEFAULT_ALPHABET, Direction, LETTER_SIZES_DEG, Rgba, TextItem};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Screen-specific spacing adjustments and the screen-edge limit for one
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionCalibration {
    pub x_multiplier: f64,
    pub y_multiplier: f64,
    pub y_offset_cm: f64,
    /// Largest eccentricity that still fits on screen, in degrees.
    pub max_angle_deg: f64,
}

impl DirectionCalibration {
    const fn new(x_multiplier: f64, y_multiplier: f64, y_offset_cm: f64, max_angle_deg: f64) -> Self {
        Self {
            x_multiplier,
            y_multiplier,
            y_offset_cm,
            max_angle_deg,
        }
    }
}

/// A fixed piece of text such as the fixation dot or the instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub text: String,
    pub position_cm: (f64, f64),
    pub height_cm: f64,
    pub color: Rgba,
}

impl MarkerConfig {
    pub fn to_item(&self) -> TextItem {
        TextItem {
            content: self.text.clone(),
            position_cm: self.position_cm,
            height_cm: self.height_cm,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    /// Physical width of the monitor, used to map centimeters to pixels.
    pub monitor_width_cm: f64,
    pub font_path: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "Crowded Periphery".to_string(),
            monitor_width_cm: 200.0,
            font_path: PathBuf::from("assets/DejaVuSans.ttf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// chrono format string for the date part of the file name.
    pub date_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Data"),
            date_format: "%m-%d".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub experiment_name: String,
    pub letters: Vec<char>,
    pub sizes_deg: Vec<f64>,
    pub viewing_distance_cm: f64,
    /// Ratio of font height to the x-height of the letters in use.
    pub legibility_ratio: f64,
    /// Extra upward shift for vertical directions while the target sits on
    /// fixation.
    pub centering_nudge_cm: f64,
    /// Indexed by `Direction::index()`.
    pub calibration: [DirectionCalibration; 4],
    pub fixation_interval_ms: u64,
    pub fixation: MarkerConfig,
    pub instructions: MarkerConfig,
    pub stimulus_color: Rgba,
    pub background: Rgba,
    pub display: DisplayConfig,
    pub output: OutputConfig,
    /// Fixed seed for the stimulus RNG; drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            experiment_name: "Crowded Periphery".to_string(),
            letters: DEFAULT_ALPHABET.to_vec(),
            sizes_deg: LETTER_SIZES_DEG.to_vec(),
            viewing_distance_cm: 35.0,
            legibility_ratio: 2.3378,
            centering_nudge_cm: 0.2,
            calibration: [
                DirectionCalibration::new(1.62, 0.0, 0.2, 61.0),
                DirectionCalibration::new(0.0, -1.562, 0.0, 42.0),
                DirectionCalibration::new(-1.68, 0.0, 0.2, 61.0),
                DirectionCalibration::new(0.0, 1.748, 0.0, 42.0),
            ],
            fixation_interval_ms: 500,
            fixation: MarkerConfig {
                text: ".".to_string(),
                position_cm: (0.0, 1.1),
                height_cm: 3.0,
                color: RED,
            },
            instructions: MarkerConfig {
                text: "  Align the edge of the headrest stand \n\
                       with the edge of the tape marked 35cm \n\n       \
                       Press Spacebar to continue"
                    .to_string(),
                position_cm: (0.0, 5.0),
                height_cm: 5.0,
                color: BLACK,
            },
            stimulus_color: BLACK,
            background: WHITE,
            display: DisplayConfig::default(),
            output: OutputConfig::default(),
            seed: None,
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ExperimentError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ExperimentError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(ExperimentError::InvalidConfig(msg.to_string()));
        if self.letters.is_empty() {
            return fail("letters must not be empty");
        }
        if self.letters.iter().any(|c| !c.is_alphanumeric()) {
            return fail("letters must be alphanumeric");
        }
        if self.sizes_deg.is_empty() {
            return fail("sizes_deg must not be empty");
        }
        if self.sizes_deg.iter().any(|s| !(*s > 0.0 && *s < 90.0)) {
            return fail("sizes_deg must lie strictly between 0 and 90");
        }
        if !(self.viewing_distance_cm > 0.0) {
            return fail("viewing_distance_cm must be positive");
        }
        if !(self.display.monitor_width_cm > 0.0) {
            return fail("display.monitor_width_cm must be positive");
        }
        if self
            .calibration
            .iter()
            .any(|c| !(c.max_angle_deg >= 0.0 && c.max_angle_deg < 90.0))
        {
            return fail("calibration max_angle_deg must lie in [0, 90)");
        }
        Ok(())
    }

    pub fn calibration_for(&self, direction: Direction) -> &DirectionCalibration {
        &self.calibration[direction.index()]
    }

    pub fn max_angle(&self, direction: Direction) -> f64 {
        self.calibration_for(direction).max_angle_deg
    }

    pub fn fixation_interval(&self) -> Duration {
        Duration::from_millis(self.fixation_interval_ms)
    }

    /// Results file for `participant` on `date`.
    pub fn session_file(&self, participant: &str, date: NaiveDate) -> PathBuf {
        let date = date.format(&self.output.date_format).to_string();
        session_path(&self.output.directory, participant, &date, &self.experiment_name)
    }
}
