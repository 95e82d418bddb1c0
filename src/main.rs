use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use log::*;
use err_derive::Error;

mod appctl;
mod artifacts;
mod charts;
mod classifier;
mod config;
mod form;
mod record;
mod report;
mod senti;
mod store;
mod vectorizer;

use self::appctl::AppCtl;
use self::config::{Config, CONFIG_FILE};
use self::form::ConsoleForm;
use self::senti::Senti;
use self::store::FeedbackStore;

#[derive(Debug, Error)]
pub enum Error {
    #[error(display = "Please enter feedback before submitting.")]
    EmptyFeedback,
    #[error(display = "Input invalid: {}", _0)]
    ValidationError(#[error(source)] validator::ValidationErrors),
    #[error(display = "Config syntax invalid")]
    ConfigError(#[error(source)] toml::de::Error),
    #[error(display = "Cannot read or write file")]
    IoError(#[error(source)] std::io::Error),
    #[error(display = "Feedback store unreadable: {}", _0)]
    CsvError(#[error(source)] csv::Error),
    #[error(display = "Model artifact corrupt: {}", _0)]
    ArtifactError(#[error(source)] serde_json::Error),
    #[error(display = "Model artifact missing: {:?}", _0)]
    ArtifactMissing(PathBuf),
    #[error(display = "Model artifacts disagree: {}", _0)]
    ArtifactMismatch(String),
    #[error(display = "Classifier gave no prediction")]
    NoPrediction,
    #[error(display = "Unable to draw chart: {}", _0)]
    ChartError(String),
    #[error(display = "Feedback store lock poisoned")]
    StoreLocked,
}

pub const APP_TITLE: &str = "🛍️ Mall Customer Feedback System";

fn main() -> Result<(), Error> {
    let config = Config::load(CONFIG_FILE)?;

    if config.debug {
        std::env::set_var("RUST_LOG", "feedy=debug");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "feedy=info");
    }
    pretty_env_logger::init();

    info!("Loading sentiment model");
    let (classifier, vectorizer) = artifacts::load(&config.model_path, &config.vectorizer_path)?;

    let appctl = Arc::new(AppCtl::new(
        Senti::new(vectorizer, classifier),
        FeedbackStore::new(&config.feedback_path),
        config.chart_dir(),
        config.recent_count,
    ));

    debug!("Setting up stop signals");
    let appctl_signal = appctl.clone();
    let mut signal_count = 0;
    ctrlc::set_handler(move || {
        if signal_count > 0 {
            std::process::exit(1);
        } else {
            appctl_signal.stop();
            signal_count += 1;
        }
    })
    .expect("Error setting Ctrl-C handler");

    info!("Feedback stored in {}", appctl.store().path().display());
    let stdin = io::stdin();
    let stdout = io::stdout();
    ConsoleForm::new(&appctl, stdin.lock(), stdout.lock()).run()?;

    info!("Goodbye");
    Ok(())
}
