#![allow(dead_code)]

use periphery_core::{ResponseKey, Scene, TextItem};
use periphery_experiment::{Display, Result};
use std::collections::VecDeque;

type Observer = Box<dyn FnMut(&Scene) -> ResponseKey>;

/// Display double: records every presented scene and answers from a key
/// script first, then from an observer callback.
pub struct ScriptedDisplay {
    pub scenes: Vec<Scene>,
    pub script: VecDeque<ResponseKey>,
    pub observer: Option<Observer>,
    pub awaits: usize,
}

impl ScriptedDisplay {
    pub fn with_keys(keys: impl IntoIterator<Item = ResponseKey>) -> Self {
        Self {
            scenes: Vec::new(),
            script: keys.into_iter().collect(),
            observer: None,
            awaits: 0,
        }
    }

    pub fn with_observer(observer: impl FnMut(&Scene) -> ResponseKey + 'static) -> Self {
        Self {
            scenes: Vec::new(),
            script: VecDeque::new(),
            observer: Some(Box::new(observer)),
            awaits: 0,
        }
    }

    /// Scenes that contained a letter array.
    pub fn stimulus_scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter().filter(|s| letter_array(s).is_some())
    }
}

impl Display for ScriptedDisplay {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        self.scenes.push(scene.clone());
        Ok(())
    }

    fn await_response(&mut self, allowed: &[ResponseKey]) -> Result<ResponseKey> {
        self.awaits += 1;
        let key = match self.script.pop_front() {
            Some(key) => key,
            None => match (&mut self.observer, self.scenes.last()) {
                (Some(observer), Some(scene)) => observer(scene),
                _ => ResponseKey::Escape,
            },
        };
        assert!(allowed.contains(&key), "{key:?} not in {allowed:?}");
        Ok(key)
    }
}

/// The letter-array item of a scene: three rows of three letters.
pub fn letter_array(scene: &Scene) -> Option<&TextItem> {
    scene.items.iter().find(|item| {
        let chars: Vec<char> = item.content.chars().collect();
        chars.len() == 11 && chars[3] == '\n' && chars[7] == '\n'
    })
}

pub fn target_of(scene: &Scene) -> Option<char> {
    letter_array(scene).and_then(|item| item.content.chars().nth(5))
}

/// Continues past instructions, then always names the target.
pub fn perfect_observer(scene: &Scene) -> ResponseKey {
    match target_of(scene) {
        Some(target) => ResponseKey::letter(target),
        None => ResponseKey::Space,
    }
}

/// Continues past instructions, then never answers with a letter.
pub fn blind_observer(_scene: &Scene) -> ResponseKey {
    ResponseKey::Space
}
