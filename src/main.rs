use anyhow::Result;
use chrono::Local;
use periphery_experiment::setup::{ask_participant, ask_record_data};
use periphery_experiment::{
    CsvSink, DiscardSink, ExperimentConfig, ResultSink, TrialSequencer,
};
use periphery_timing::HighPrecisionTimer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod display;
use display::WindowDisplay;

/// Names a JSON file overriding the default configuration.
const CONFIG_ENV: &str = "PERIPHERY_CONFIG";

fn load_config() -> Result<ExperimentConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "loading configuration");
            Ok(ExperimentConfig::load(&path)?)
        }
        None => Ok(ExperimentConfig::default()),
    }
}

/// How a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Completed,
    /// The participant left the identifier entry before any trial.
    Cancelled,
}

impl SessionEnd {
    fn describe(self) -> &'static str {
        match self {
            SessionEnd::Completed => "experiment finished",
            SessionEnd::Cancelled => "participant entry cancelled, no trials run",
        }
    }
}

/// Setup prompts, then every staircase.
fn run_session(
    config: &ExperimentConfig,
    display: &mut WindowDisplay,
) -> periphery_experiment::Result<SessionEnd> {
    let sink: Box<dyn ResultSink> = if ask_record_data(display, config)? {
        let Some(participant) = ask_participant(display, config)? else {
            return Ok(SessionEnd::Cancelled);
        };
        let path = config.session_file(&participant, Local::now().date_naive());
        Box::new(CsvSink::open(path)?)
    } else {
        info!("recording disabled");
        Box::new(DiscardSink)
    };

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut sequencer = TrialSequencer::new(config, display, sink, HighPrecisionTimer::new(), rng)?;
    sequencer.run()?;
    Ok(SessionEnd::Completed)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "starting"
    );
    let config = load_config()?;
    let mut display = WindowDisplay::open(&config)?;

    match run_session(&config, &mut display) {
        Ok(end) => {
            info!("{}", end.describe());
            Ok(())
        }
        Err(e) if e.is_abort() => {
            info!("experiment aborted");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
