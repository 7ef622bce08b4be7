//! Session setup screens shown before the first trial.

use crate::config::ExperimentConfig;
use crate::display::Display;
use crate::error::{ExperimentError, Result};
use periphery_core::{ResponseKey, Scene, TextItem};

const PROMPT_POSITION_CM: (f64, f64) = (0.0, 5.0);
const PROMPT_HEIGHT_CM: f64 = 4.0;
const ENTRY_POSITION_CM: (f64, f64) = (0.0, -5.0);
const MAX_PARTICIPANT_LEN: usize = 32;

fn prompt_scene(config: &ExperimentConfig, prompt: &str, entry: Option<&str>) -> Scene {
    let mut scene = Scene::new(config.background).with(TextItem {
        content: prompt.to_string(),
        position_cm: PROMPT_POSITION_CM,
        height_cm: PROMPT_HEIGHT_CM,
        color: config.instructions.color,
    });
    if let Some(entry) = entry {
        scene = scene.with(TextItem {
            content: format!("{entry}_"),
            position_cm: ENTRY_POSITION_CM,
            height_cm: PROMPT_HEIGHT_CM,
            color: config.stimulus_color,
        });
    }
    scene
}

/// Asks whether results should be written to disk.
pub fn ask_record_data<D: Display>(display: &mut D, config: &ExperimentConfig) -> Result<bool> {
    display.present(&prompt_scene(config, "Record data?\n\nY = yes    N = no", None))?;
    let allowed = [
        ResponseKey::Char('y'),
        ResponseKey::Char('n'),
        ResponseKey::Escape,
    ];
    match display.await_response(&allowed)? {
        ResponseKey::Char('y') => Ok(true),
        ResponseKey::Char('n') => Ok(false),
        _ => Err(ExperimentError::AbortedByUser),
    }
}

fn participant_keys() -> Vec<ResponseKey> {
    let mut keys: Vec<ResponseKey> = ('a'..='z')
        .chain('0'..='9')
        .chain(['-', '_'])
        .map(ResponseKey::Char)
        .collect();
    keys.extend([
        ResponseKey::Space,
        ResponseKey::Backspace,
        ResponseKey::Enter,
        ResponseKey::Escape,
    ]);
    keys
}

/// Reads the participant identifier. `None` means the participant cancelled
/// with escape.
pub fn ask_participant<D: Display>(
    display: &mut D,
    config: &ExperimentConfig,
) -> Result<Option<String>> {
    let allowed = participant_keys();
    let mut entry = String::new();
    loop {
        display.present(&prompt_scene(
            config,
            &format!("{}\n\nParticipant:", config.experiment_name),
            Some(&entry),
        ))?;
        match display.await_response(&allowed)? {
            ResponseKey::Escape => return Ok(None),
            ResponseKey::Enter if !entry.trim().is_empty() => {
                return Ok(Some(entry.trim().to_string()));
            }
            ResponseKey::Enter => {}
            ResponseKey::Backspace => {
                entry.pop();
            }
            ResponseKey::Space if entry.len() < MAX_PARTICIPANT_LEN => entry.push(' '),
            ResponseKey::Char(c) if entry.len() < MAX_PARTICIPANT_LEN => entry.push(c),
            _ => {}
        }
    }
}
