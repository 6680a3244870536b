//! Disease profiles.
//!
//! A [`DiseaseProfile`] is the static description of one supported screening: which form fields
//! the prediction pair was fitted on (and in what order), where its artifacts live, where its
//! screening log is written and which two labels a prediction maps to.
//!
//! Profiles come either from the built-in table ([`ProfileSet::builtin`]) or from a YAML file
//! ([`ProfileSet::from_yaml_str`]):
//!
//! ```yaml
//! profiles:
//!   - key: diabetes
//!     display_name: Diabetes
//!     feature_names: [Pregnancies, Glucose, BloodPressure]
//!     high_risk_message: "High risk"
//!     low_risk_message: "Low risk"
//!     # optional, relative paths resolve against the artifact / data directory
//!     model_artifact: diabetes_model.json
//!     preprocessor_artifact: diabetes_preprocessor.json
//!     storage_location: diabetes/results.txt
//! ```
//!
//! Built-in profiles log to `<data_dir>/<Display dir>/results.txt` (for example
//! `Results/Diabetes/results.txt`), the layout earlier deployments already have on disk, so
//! their history stays visible. Profiles from a file default to `<data_dir>/<key>/results.txt`;
//! set `storage_location` to point a file profile at an existing log.

use crate::constants::{
    MODEL_ARTIFACT_SUFFIX, PREPROCESSOR_ARTIFACT_SUFFIX, RESERVED_RECORD_KEYS, RESULTS_FILENAME,
};
use crate::error::{ScreeningError, ScreeningResult};
use screening_types::{DiseaseKey, NonEmptyText};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const DEFAULT_HIGH_RISK_MESSAGE: &str = "🔴 High Risk – please consult a doctor.";
const DEFAULT_LOW_RISK_MESSAGE: &str = "🟢 Low Risk – stay healthy!";

/// Static configuration for one supported disease.
#[derive(Clone, Debug, PartialEq)]
pub struct DiseaseProfile {
    pub key: DiseaseKey,
    pub display_name: NonEmptyText,
    /// Ordered feature keys; the prediction pair sees a row in exactly this order.
    pub feature_names: Vec<String>,
    pub model_artifact: PathBuf,
    pub preprocessor_artifact: PathBuf,
    /// Path of the append-only screening log.
    pub storage_location: PathBuf,
    pub high_risk_message: String,
    pub low_risk_message: String,
}

impl DiseaseProfile {
    /// Builds a profile using the default artifact and log locations for `key`.
    pub fn with_default_locations(
        key: DiseaseKey,
        display_name: NonEmptyText,
        feature_names: Vec<String>,
        data_dir: &Path,
        artifact_dir: &Path,
    ) -> Self {
        Self {
            model_artifact: artifact_dir.join(format!("{key}{MODEL_ARTIFACT_SUFFIX}")),
            preprocessor_artifact: artifact_dir.join(format!("{key}{PREPROCESSOR_ARTIFACT_SUFFIX}")),
            storage_location: data_dir.join(key.as_str()).join(RESULTS_FILENAME),
            key,
            display_name,
            feature_names,
            high_risk_message: DEFAULT_HIGH_RISK_MESSAGE.into(),
            low_risk_message: DEFAULT_LOW_RISK_MESSAGE.into(),
        }
    }

    /// Maps a binary class to one of the two fixed labels.
    pub fn label_for_class(&self, class: u8) -> &str {
        if class == 1 {
            &self.high_risk_message
        } else {
            &self.low_risk_message
        }
    }

    /// Checks the invariants every profile must satisfy before it is used.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::InvalidConfig`] if the feature list is empty, contains blank,
    /// duplicate or reserved names, or either risk message is blank.
    pub fn validate(&self) -> ScreeningResult<()> {
        if self.feature_names.is_empty() {
            return Err(ScreeningError::InvalidConfig(format!(
                "profile '{}' has no feature names",
                self.key
            )));
        }

        let mut seen = HashSet::new();
        for name in &self.feature_names {
            if name.trim().is_empty() {
                return Err(ScreeningError::InvalidConfig(format!(
                    "profile '{}' has a blank feature name",
                    self.key
                )));
            }
            if RESERVED_RECORD_KEYS.contains(&name.as_str()) {
                return Err(ScreeningError::InvalidConfig(format!(
                    "profile '{}' uses reserved feature name '{}'",
                    self.key, name
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(ScreeningError::InvalidConfig(format!(
                    "profile '{}' lists feature '{}' more than once",
                    self.key, name
                )));
            }
        }

        if self.high_risk_message.trim().is_empty() || self.low_risk_message.trim().is_empty() {
            return Err(ScreeningError::InvalidConfig(format!(
                "profile '{}' has a blank risk message",
                self.key
            )));
        }

        Ok(())
    }
}

/// The ordered, key-unique set of profiles the service runs with.
#[derive(Clone, Debug, Default)]
pub struct ProfileSet {
    profiles: Vec<DiseaseProfile>,
}

impl ProfileSet {
    /// Validates every profile and rejects duplicate keys.
    pub fn new(profiles: Vec<DiseaseProfile>) -> ScreeningResult<Self> {
        let mut keys = HashSet::new();
        for profile in &profiles {
            profile.validate()?;
            if !keys.insert(profile.key.clone()) {
                return Err(ScreeningError::InvalidConfig(format!(
                    "disease '{}' is configured more than once",
                    profile.key
                )));
            }
        }
        Ok(Self { profiles })
    }

    /// The five built-in diseases, with artifacts under `artifact_dir` and logs under `data_dir`.
    pub fn builtin(data_dir: &Path, artifact_dir: &Path) -> ScreeningResult<Self> {
        let table: [(&str, &str, &str, &[&str], &str, &str); 5] = [
            (
                "heart",
                "Heart Disease",
                "Heart",
                &["cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang"],
                "🔴 High Risk – please consult a doctor.",
                "🟢 Low Risk – stay healthy!",
            ),
            (
                "diabetes",
                "Diabetes",
                "Diabetes",
                &[
                    "Pregnancies",
                    "Glucose",
                    "BloodPressure",
                    "SkinThickness",
                    "Insulin",
                    "BMI",
                    "DiabetesPedigreeFunction",
                    "Age",
                ],
                "🔴 High Risk – please consult a doctor.",
                "🟢 Low Risk – keep up the healthy lifestyle!",
            ),
            (
                "cancer",
                "Breast Cancer",
                "Cancer",
                &[
                    "concave points_mean",
                    "area_mean",
                    "radius_mean",
                    "perimeter_mean",
                    "concavity_mean",
                ],
                "🔴 High Risk – please consult an oncologist.",
                "🟢 Low Risk – maintain regular screenings!",
            ),
            (
                "kidney",
                "Chronic Kidney Disease",
                "Kidney",
                &["bp", "sg", "al", "su", "rbc", "pc", "pcc"],
                "🔴 High Risk – please consult a nephrologist.",
                "🟢 Low Risk – maintain regular checkups!",
            ),
            (
                "liver",
                "Liver Disease",
                "Liver",
                &[
                    "Total_Bilirubin",
                    "Direct_Bilirubin",
                    "Alkaline_Phosphotase",
                    "Alamine_Aminotransferase",
                    "Total_Protiens",
                    "Albumin",
                    "Albumin_and_Globulin_Ratio",
                ],
                "🔴 High Risk – please consult a hepatologist.",
                "🟢 Low Risk – keep monitoring regularly.",
            ),
        ];

        let mut profiles = Vec::with_capacity(table.len());
        for (key, name, log_dir, features, high, low) in table {
            let key = DiseaseKey::new(key).map_err(|e| ScreeningError::InvalidConfig(e.to_string()))?;
            let name =
                NonEmptyText::new(name).map_err(|e| ScreeningError::InvalidConfig(e.to_string()))?;
            let mut profile = DiseaseProfile::with_default_locations(
                key,
                name,
                features.iter().map(|f| f.to_string()).collect(),
                data_dir,
                artifact_dir,
            );
            profile.storage_location = data_dir.join(log_dir).join(RESULTS_FILENAME);
            profile.high_risk_message = high.into();
            profile.low_risk_message = low.into();
            profiles.push(profile);
        }

        Self::new(profiles)
    }

    /// Parses a YAML profiles document.
    ///
    /// Relative artifact paths resolve against `artifact_dir`, relative storage locations
    /// against `data_dir`.
    pub fn from_yaml_str(yaml: &str, data_dir: &Path, artifact_dir: &Path) -> ScreeningResult<Self> {
        let file: ProfilesFile = serde_yaml::from_str(yaml).map_err(ScreeningError::ProfilesParse)?;

        let profiles = file
            .profiles
            .into_iter()
            .map(|entry| entry.into_profile(data_dir, artifact_dir))
            .collect();

        Self::new(profiles)
    }

    pub fn from_yaml_file(path: &Path, data_dir: &Path, artifact_dir: &Path) -> ScreeningResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ScreeningError::ProfilesRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml, data_dir, artifact_dir)
    }

    pub fn get(&self, key: &str) -> Option<&DiseaseProfile> {
        self.profiles.iter().find(|p| p.key.as_str() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiseaseProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfilesFile {
    profiles: Vec<ProfileEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileEntry {
    key: DiseaseKey,
    display_name: NonEmptyText,
    feature_names: Vec<String>,
    #[serde(default)]
    high_risk_message: Option<String>,
    #[serde(default)]
    low_risk_message: Option<String>,
    #[serde(default)]
    model_artifact: Option<PathBuf>,
    #[serde(default)]
    preprocessor_artifact: Option<PathBuf>,
    #[serde(default)]
    storage_location: Option<PathBuf>,
}

impl ProfileEntry {
    fn into_profile(self, data_dir: &Path, artifact_dir: &Path) -> DiseaseProfile {
        let mut profile = DiseaseProfile::with_default_locations(
            self.key,
            self.display_name,
            self.feature_names,
            data_dir,
            artifact_dir,
        );

        if let Some(path) = self.model_artifact {
            profile.model_artifact = artifact_dir.join(path);
        }
        if let Some(path) = self.preprocessor_artifact {
            profile.preprocessor_artifact = artifact_dir.join(path);
        }
        if let Some(path) = self.storage_location {
            profile.storage_location = data_dir.join(path);
        }
        if let Some(message) = self.high_risk_message {
            profile.high_risk_message = message;
        }
        if let Some(message) = self.low_risk_message {
            profile.low_risk_message = message;
        }

        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs() -> (PathBuf, PathBuf) {
        (PathBuf::from("/data"), PathBuf::from("/models"))
    }

    #[test]
    fn builtin_profiles_are_valid() {
        let (data, models) = dirs();
        let set = ProfileSet::builtin(&data, &models).unwrap();

        assert_eq!(set.len(), 5);
        let revalidated = ProfileSet::new(set.iter().cloned().collect());
        assert!(revalidated.is_ok());
    }

    #[test]
    fn builtin_diabetes_profile_uses_default_locations() {
        let (data, models) = dirs();
        let set = ProfileSet::builtin(&data, &models).unwrap();
        let diabetes = set.get("diabetes").expect("diabetes profile exists");

        assert_eq!(diabetes.feature_names.len(), 8);
        assert_eq!(diabetes.feature_names[0], "Pregnancies");
        assert_eq!(
            diabetes.model_artifact,
            PathBuf::from("/models/diabetes_model.json")
        );
        assert_eq!(
            diabetes.preprocessor_artifact,
            PathBuf::from("/models/diabetes_preprocessor.json")
        );
        assert_eq!(
            diabetes.storage_location,
            PathBuf::from("/data/Diabetes/results.txt")
        );
    }

    #[test]
    fn builtin_logs_use_capitalised_disease_directories() {
        let (data, models) = dirs();
        let set = ProfileSet::builtin(&data, &models).unwrap();

        let locations: Vec<PathBuf> = set
            .iter()
            .map(|p| p.storage_location.clone())
            .collect();
        assert_eq!(
            locations,
            ["Heart", "Diabetes", "Cancer", "Kidney", "Liver"]
                .iter()
                .map(|d| PathBuf::from("/data").join(d).join("results.txt"))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn get_returns_none_for_unknown_disease() {
        let (data, models) = dirs();
        let set = ProfileSet::builtin(&data, &models).unwrap();

        assert!(set.get("flu").is_none());
        assert!(set.get("").is_none());
    }

    #[test]
    fn label_for_class_selects_fixed_messages() {
        let (data, models) = dirs();
        let set = ProfileSet::builtin(&data, &models).unwrap();
        let kidney = set.get("kidney").unwrap();

        assert_eq!(kidney.label_for_class(1), kidney.high_risk_message);
        assert_eq!(kidney.label_for_class(0), kidney.low_risk_message);
    }

    #[test]
    fn yaml_profiles_resolve_paths_and_defaults() {
        let yaml = r#"
profiles:
  - key: flu
    display_name: Influenza
    feature_names: [temp, cough]
    model_artifact: custom/flu.json
  - key: cold
    display_name: Common Cold
    feature_names: [sneezes]
    low_risk_message: "all good"
    storage_location: colds.jsonl
"#;
        let (data, models) = dirs();
        let set = ProfileSet::from_yaml_str(yaml, &data, &models).expect("yaml should parse");

        let flu = set.get("flu").unwrap();
        assert_eq!(flu.storage_location, PathBuf::from("/data/flu/results.txt"));
        assert_eq!(flu.model_artifact, PathBuf::from("/models/custom/flu.json"));
        assert_eq!(
            flu.preprocessor_artifact,
            PathBuf::from("/models/flu_preprocessor.json")
        );
        assert_eq!(flu.high_risk_message, DEFAULT_HIGH_RISK_MESSAGE);

        let cold = set.get("cold").unwrap();
        assert_eq!(cold.storage_location, PathBuf::from("/data/colds.jsonl"));
        assert_eq!(cold.low_risk_message, "all good");
    }

    #[test]
    fn yaml_rejects_duplicate_keys() {
        let yaml = r#"
profiles:
  - key: flu
    display_name: A
    feature_names: [a]
  - key: flu
    display_name: B
    feature_names: [b]
"#;
        let (data, models) = dirs();
        let err = ProfileSet::from_yaml_str(yaml, &data, &models).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidConfig(msg) if msg.contains("more than once")));
    }

    #[test]
    fn yaml_rejects_reserved_and_duplicate_feature_names() {
        let (data, models) = dirs();

        let reserved = "profiles:\n  - key: flu\n    display_name: Flu\n    feature_names: [id, temp]\n";
        let err = ProfileSet::from_yaml_str(reserved, &data, &models).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidConfig(msg) if msg.contains("reserved")));

        let duplicate =
            "profiles:\n  - key: flu\n    display_name: Flu\n    feature_names: [temp, temp]\n";
        let err = ProfileSet::from_yaml_str(duplicate, &data, &models).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidConfig(msg) if msg.contains("more than once")));
    }

    #[test]
    fn yaml_rejects_invalid_disease_key() {
        let yaml = "profiles:\n  - key: Flu/2\n    display_name: Flu\n    feature_names: [temp]\n";
        let (data, models) = dirs();
        let err = ProfileSet::from_yaml_str(yaml, &data, &models).unwrap_err();
        assert!(matches!(err, ScreeningError::ProfilesParse(_)));
    }

    #[test]
    fn yaml_rejects_empty_feature_list() {
        let yaml = "profiles:\n  - key: flu\n    display_name: Flu\n    feature_names: []\n";
        let (data, models) = dirs();
        let err = ProfileSet::from_yaml_str(yaml, &data, &models).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidConfig(_)));
    }
}
