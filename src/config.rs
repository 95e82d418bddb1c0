use serde::Deserialize;
#[allow(unused_imports)] // Validate is required by the derive but not always by name.
use validator::{ValidationError, Validate};
use validator_derive::Validate;

use std::path::{Path, PathBuf};

use log::*;

use crate::Error;

pub const CONFIG_FILE: &str = "feedy.toml";

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct Config {
    #[serde(default = "default_model_path")]
    #[validate(custom = "ensure_artifact_file")]
    pub model_path: String,

    #[serde(default = "default_vectorizer_path")]
    #[validate(custom = "ensure_artifact_file")]
    pub vectorizer_path: String,

    #[serde(default = "default_feedback_path")]
    pub feedback_path: String,

    #[serde(default = "default_chart_dir")]
    pub chart_dir: Option<String>,

    #[serde(default = "default_recent_count")]
    #[validate(range(min = 1, max = 100))]
    pub recent_count: usize,

    #[serde(default = "default_debug")]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            vectorizer_path: default_vectorizer_path(),
            feedback_path: default_feedback_path(),
            chart_dir: default_chart_dir(),
            recent_count: default_recent_count(),
            debug: default_debug(),
        }
    }
}

impl Config {
    /// Reads the config at `path`, falling back to the defaults when the
    /// file does not exist. The result is validated either way.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let config: Config = if path.exists() {
            toml::from_str(&std::fs::read_to_string(path)?)?
        } else {
            Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Where SVG charts go. An empty `chart_dir` turns them off.
    pub fn chart_dir(&self) -> Option<PathBuf> {
        self.chart_dir
            .as_ref()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
    }
}

fn default_model_path() -> String {
    "sentiment_model.json".to_string()
}

fn default_vectorizer_path() -> String {
    "vectorizer.json".to_string()
}

fn default_feedback_path() -> String {
    "mall_feedback.csv".to_string()
}

fn default_chart_dir() -> Option<String> {
    Some("charts".to_string())
}

fn default_recent_count() -> usize {
    5
}

fn default_debug() -> bool {
    false
}

fn ensure_artifact_file(artifact_path: &str) -> Result<(), ValidationError> {
    if PathBuf::from(artifact_path).is_file() {
        Ok(())
    } else {
        debug!("Config: artifact {} missing", artifact_path);
        Err(ValidationError::new("Model artifact missing"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    fn touch(dir: &Path, name: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, "{}").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn defaults_use_fixed_paths() {
        let config = Config::default();
        assert_eq!(config.model_path, "sentiment_model.json");
        assert_eq!(config.vectorizer_path, "vectorizer.json");
        assert_eq!(config.feedback_path, "mall_feedback.csv");
        assert_eq!(config.chart_dir(), Some(PathBuf::from("charts")));
        assert_eq!(config.recent_count, 5);
        assert!(!config.debug);
    }

    #[test]
    fn reads_toml_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let model = touch(dir.path(), "model.json");
        let vectorizer = touch(dir.path(), "vec.json");
        let config_path = dir.path().join("feedy.toml");
        fs::write(
            &config_path,
            format!(
                "model_path = {:?}\nvectorizer_path = {:?}\nrecent_count = 3\ndebug = true\n",
                model, vectorizer
            ),
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.model_path, model);
        assert_eq!(config.vectorizer_path, vectorizer);
        assert_eq!(config.recent_count, 3);
        assert!(config.debug);
        assert_eq!(config.feedback_path, "mall_feedback.csv");
    }

    #[test]
    fn empty_chart_dir_disables_charts() {
        let config = Config {
            chart_dir: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.chart_dir(), None);
    }

    #[test]
    fn missing_artifact_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let vectorizer = touch(dir.path(), "vec.json");
        let config_path = dir.path().join("feedy.toml");
        fs::write(
            &config_path,
            format!(
                "model_path = \"{}/nope.json\"\nvectorizer_path = {:?}\n",
                dir.path().display(),
                vectorizer
            ),
        )
        .unwrap();

        match Config::load(&config_path) {
            Err(Error::ValidationError(_)) => {}
            other => panic!("Expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn recent_count_out_of_range_fails() {
        let dir = tempfile::tempdir().unwrap();
        let model = touch(dir.path(), "model.json");
        let vectorizer = touch(dir.path(), "vec.json");
        let config_path = dir.path().join("feedy.toml");
        fs::write(
            &config_path,
            format!(
                "model_path = {:?}\nvectorizer_path = {:?}\nrecent_count = 0\n",
                model, vectorizer
            ),
        )
        .unwrap();

        assert!(matches!(Config::load(&config_path), Err(Error::ValidationError(_))));
    }

    #[test]
    fn bad_syntax_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("feedy.toml");
        fs::write(&config_path, "model_path = [").unwrap();

        assert!(matches!(Config::load(&config_path), Err(Error::ConfigError(_))));
    }
}
