use crate::config::ExperimentConfig;
use crate::display::Display;
use crate::error::{ExperimentError, Result};
use crate::geometry::stimulus_geometry;
use crate::sink::ResultSink;
use periphery_core::{
    Condition, Direction, LetterArray, ResponseKey, ResultRecord, Scene, StaircaseState, TextItem,
    TrialOutcome,
};
use periphery_timing::Timer;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Drives one staircase per size × direction condition, sizes in random
/// order and directions re-shuffled within every size.
pub struct TrialSequencer<'c, D, K, T, R>
where
    D: Display,
    K: ResultSink,
    T: Timer,
    R: Rng,
{
    pub config: &'c ExperimentConfig,
    pub display: D,
    pub sink: K,
    pub timer: T,
    pub rng: R,
    response_keys: Vec<ResponseKey>,
}

impl<'c, D, K, T, R> TrialSequencer<'c, D, K, T, R>
where
    D: Display,
    K: ResultSink,
    T: Timer,
    R: Rng,
{
    pub fn new(config: &'c ExperimentConfig, display: D, sink: K, timer: T, rng: R) -> Result<Self> {
        config.validate()?;
        let mut response_keys: Vec<ResponseKey> =
            config.letters.iter().map(|c| ResponseKey::letter(*c)).collect();
        response_keys.extend([ResponseKey::Space, ResponseKey::Escape]);
        Ok(Self {
            config,
            display,
            sink,
            timer,
            rng,
            response_keys,
        })
    }

    /// Keys accepted as an answer to a stimulus.
    pub fn response_keys(&self) -> &[ResponseKey] {
        &self.response_keys
    }

    /// Runs the whole session and returns the result of every condition in
    /// the order they were run. The sink is flushed on every exit path,
    /// including an abort.
    pub fn run(&mut self) -> Result<Vec<ResultRecord>> {
        let outcome = self.run_all();
        let flushed = self.sink.flush();
        let results = outcome?;
        flushed?;
        info!(conditions = results.len(), "session complete");
        Ok(results)
    }

    fn run_all(&mut self) -> Result<Vec<ResultRecord>> {
        self.show_instructions()?;

        let mut sizes = self.config.sizes_deg.clone();
        sizes.shuffle(&mut self.rng);
        let mut directions = Direction::ALL;
        let mut results = Vec::with_capacity(sizes.len() * directions.len());

        for size in sizes {
            directions.shuffle(&mut self.rng);
            for direction in directions {
                let record = self.run_condition(Condition::new(size, direction))?;
                self.sink.append(&record)?;
                results.push(record);
            }
        }
        Ok(results)
    }

    /// Chin-rest alignment screen; continues on space.
    pub fn show_instructions(&mut self) -> Result<()> {
        let scene = Scene::new(self.config.background).with(self.config.instructions.to_item());
        self.display.present(&scene)?;
        match self
            .display
            .await_response(&[ResponseKey::Space, ResponseKey::Escape])?
        {
            ResponseKey::Space => Ok(()),
            _ => {
                info!("aborted at instructions");
                Err(ExperimentError::AbortedByUser)
            }
        }
    }

    /// Runs a fresh staircase for `condition` until it completes.
    pub fn run_condition(&mut self, condition: Condition) -> Result<ResultRecord> {
        let max_angle = self.config.max_angle(condition.direction);
        info!(
            size_deg = condition.size_deg,
            direction = %condition.direction,
            max_angle,
            "condition started"
        );

        let mut state = StaircaseState::new();
        while !state.completed {
            let outcome = self.run_trial(condition, state.angle)?;
            state = state.advance(outcome.correct, max_angle);
        }

        info!(
            size_deg = condition.size_deg,
            direction = %condition.direction,
            angle_deg = state.angle,
            responses = state.responses,
            reversals = state.num_reversals,
            "condition complete"
        );
        Ok(ResultRecord::new(condition, state.angle))
    }

    /// Fixation, pause, stimulus, response.
    pub fn run_trial(&mut self, condition: Condition, angle_deg: f64) -> Result<TrialOutcome> {
        let letters = LetterArray::generate(&self.config.letters, &mut self.rng)
            .ok_or_else(|| ExperimentError::InvalidConfig("letters must not be empty".into()))?;
        let geometry = stimulus_geometry(
            self.config,
            condition.size_deg,
            angle_deg,
            condition.direction,
        );

        let fixation = Scene::new(self.config.background).with(self.config.fixation.to_item());
        self.display.present(&fixation)?;
        self.timer.sleep(self.config.fixation_interval());

        let stimulus = fixation.with(TextItem {
            content: letters.text(),
            position_cm: geometry.position_cm,
            height_cm: geometry.height_cm,
            color: self.config.stimulus_color,
        });
        self.display.present(&stimulus)?;
        let onset = self.timer.now();

        let key = self.display.await_response(&self.response_keys)?;
        if key == ResponseKey::Escape {
            info!(
                size_deg = condition.size_deg,
                direction = %condition.direction,
                angle_deg,
                "escape pressed, aborting"
            );
            return Err(ExperimentError::AbortedByUser);
        }

        let outcome = TrialOutcome::judge(letters.target(), key, self.timer.elapsed(onset));
        debug!(
            angle_deg,
            target = %outcome.target,
            key = ?outcome.key,
            correct = outcome.correct,
            rt_ms = outcome.reaction_time.as_secs_f64() * 1e3,
            "trial"
        );
        Ok(outcome)
    }
}
