//! Loaded prediction pairs, one per configured disease.
//!
//! Artifacts are loaded once at startup. A disease whose artifacts fail to load stays
//! [`ArtifactState::Degraded`] for the life of the process: its screenings still succeed and are
//! persisted, but every prediction comes back as an error marker.

use crate::artifacts::PredictionPair;
use crate::profile::ProfileSet;
use screening_types::DiseaseKey;
use std::collections::BTreeMap;

#[derive(Debug)]
pub enum ArtifactState {
    Ready(PredictionPair),
    /// Load failure, rendered for logs and the status endpoint.
    Degraded(String),
}

impl ArtifactState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Readiness of one disease's prediction pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub disease: DiseaseKey,
    pub ready: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    states: BTreeMap<DiseaseKey, ArtifactState>,
}

impl ArtifactRegistry {
    /// An empty registry; every lookup reports the disease as not loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the prediction pair of every profile in `profiles`.
    ///
    /// Never fails. Each load failure is logged and recorded as a degraded state.
    pub fn load(profiles: &ProfileSet) -> Self {
        let mut registry = Self::new();

        for profile in profiles.iter() {
            let state = match PredictionPair::load(profile) {
                Ok(pair) => {
                    tracing::info!(disease = %profile.key, "loaded prediction artifacts");
                    ArtifactState::Ready(pair)
                }
                Err(e) => {
                    tracing::error!(
                        disease = %profile.key,
                        "prediction artifacts unavailable, predictions will report errors: {}",
                        e
                    );
                    ArtifactState::Degraded(e.to_string())
                }
            };
            registry.insert(profile.key.clone(), state);
        }

        registry
    }

    pub fn insert(&mut self, disease: DiseaseKey, state: ArtifactState) {
        self.states.insert(disease, state);
    }

    pub fn get(&self, disease: &DiseaseKey) -> Option<&ArtifactState> {
        self.states.get(disease)
    }

    /// Per-disease readiness, ordered by disease key.
    pub fn status(&self) -> Vec<ArtifactStatus> {
        self.states
            .iter()
            .map(|(disease, state)| ArtifactStatus {
                disease: disease.clone(),
                ready: state.is_ready(),
                error: match state {
                    ArtifactState::Ready(_) => None,
                    ArtifactState::Degraded(reason) => Some(reason.clone()),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_marks_missing_artifacts_as_degraded() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let profiles = ProfileSet::builtin(temp_dir.path(), temp_dir.path()).unwrap();

        let registry = ArtifactRegistry::load(&profiles);

        let status = registry.status();
        assert_eq!(status.len(), 5);
        assert!(status.iter().all(|s| !s.ready && s.error.is_some()));
    }

    #[test]
    fn load_marks_valid_pair_as_ready() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let yaml = "profiles:\n  - key: flu\n    display_name: Flu\n    feature_names: [temp]\n";
        let profiles = ProfileSet::from_yaml_str(yaml, temp_dir.path(), temp_dir.path()).unwrap();
        fs::write(
            temp_dir.path().join("flu_preprocessor.json"),
            r#"{"feature_names": ["temp"]}"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("flu_model.json"),
            r#"{"type": "decision_tree", "nodes": [{"leaf": 0}]}"#,
        )
        .unwrap();

        let registry = ArtifactRegistry::load(&profiles);

        let flu = DiseaseKey::new("flu").unwrap();
        assert!(registry.get(&flu).is_some_and(ArtifactState::is_ready));
        assert_eq!(
            registry.status(),
            vec![ArtifactStatus {
                disease: flu,
                ready: true,
                error: None
            }]
        );
    }

    #[test]
    fn unknown_disease_is_absent() {
        let registry = ArtifactRegistry::new();
        assert!(registry.get(&DiseaseKey::new("flu").unwrap()).is_none());
        assert!(registry.status().is_empty());
    }
}
