use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::*;

use crate::classifier::ArtifactClassifier;
use crate::vectorizer::{TfidfVectorizer, Vectorizer};
use crate::Error;

fn open_artifact(path: &Path) -> Result<BufReader<File>, Error> {
    if !path.is_file() {
        return Err(Error::ArtifactMissing(path.to_path_buf()));
    }
    Ok(BufReader::new(File::open(path)?))
}

/// Loads the trained classifier and its vectorizer. Both must agree on the
/// number of feature columns.
pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
    model_path: P,
    vectorizer_path: Q,
) -> Result<(ArtifactClassifier, TfidfVectorizer), Error> {
    let model_path = model_path.as_ref();
    let vectorizer_path = vectorizer_path.as_ref();

    debug!("Loading vectorizer from {}", vectorizer_path.display());
    let vectorizer = TfidfVectorizer::from_reader(open_artifact(vectorizer_path)?)?;

    debug!("Loading classifier from {}", model_path.display());
    let classifier = ArtifactClassifier::from_reader(open_artifact(model_path)?)?;
    classifier.check_shape(vectorizer.dim())?;

    info!("Model ready with {} features", vectorizer.dim());
    Ok((classifier, vectorizer))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::classifier::Classifier;
    use std::fs;

    const VECTORIZER: &str = r#"{"vocabulary": {"great": 0, "awful": 1}}"#;
    const MODEL: &str =
        r#"{"kind": "linear", "coef": [1.5, -1.5], "intercept": 0.0, "classes": [0, 1]}"#;

    #[test]
    fn loads_matching_artifacts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let model_path = dir.path().join("model.json");
        let vectorizer_path = dir.path().join("vectorizer.json");
        fs::write(&model_path, MODEL)?;
        fs::write(&vectorizer_path, VECTORIZER)?;

        let (classifier, vectorizer) = load(&model_path, &vectorizer_path)?;
        let rows = vectorizer.transform(&["Great shops", "awful parking"]);
        assert_eq!(classifier.predict(&rows), vec![1, 0]);
        Ok(())
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let vectorizer_path = dir.path().join("vectorizer.json");
        fs::write(&vectorizer_path, VECTORIZER).unwrap();

        match load(dir.path().join("absent.json"), &vectorizer_path) {
            Err(Error::ArtifactMissing(path)) => assert!(path.ends_with("absent.json")),
            other => panic!("Expected missing artifact, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let vectorizer_path = dir.path().join("vectorizer.json");
        fs::write(&model_path, "\u{80}pickle").unwrap();
        fs::write(&vectorizer_path, VECTORIZER).unwrap();

        assert!(matches!(
            load(&model_path, &vectorizer_path),
            Err(Error::ArtifactError(_))
        ));
    }

    #[test]
    fn feature_count_must_agree() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let vectorizer_path = dir.path().join("vectorizer.json");
        fs::write(
            &model_path,
            r#"{"kind": "linear", "coef": [1.0], "intercept": 0.0, "classes": [0, 1]}"#,
        )
        .unwrap();
        fs::write(&vectorizer_path, VECTORIZER).unwrap();

        assert!(matches!(
            load(&model_path, &vectorizer_path),
            Err(Error::ArtifactMismatch(_))
        ));
    }

    #[test]
    fn demo_artifacts_classify_sensibly() -> anyhow::Result<()> {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
        let (classifier, vectorizer) = load(
            demos.join("sentiment_model.json"),
            demos.join("vectorizer.json"),
        )?;
        let rows = vectorizer.transform(&[
            "The staff were friendly and helpful",
            "Rude staff, dirty toilets",
            "The food court is not good",
        ]);
        assert_eq!(classifier.predict(&rows), vec![1, 0, 0]);
        Ok(())
    }
}
