//! Feature map → risk label.

use crate::constants::ERROR_MARKER_PREFIX;
use crate::profile::DiseaseProfile;
use crate::registry::{ArtifactRegistry, ArtifactState};
use std::collections::HashMap;
use std::sync::Arc;

/// Runs a disease's prediction pair over a feature map.
///
/// The service is fail-soft: [`PredictionService::predict`] always yields a label. When the pair
/// is missing, failed to load, or rejects the row, the label is an error marker (see
/// [`is_error_marker`]) so the screening can still be recorded.
#[derive(Clone, Debug)]
pub struct PredictionService {
    registry: Arc<ArtifactRegistry>,
}

impl PredictionService {
    pub fn new(registry: Arc<ArtifactRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ArtifactRegistry> {
        &self.registry
    }

    /// Predicts the risk label for `features`.
    ///
    /// The row is built in `profile.feature_names` order. Keys the profile does not name are
    /// ignored and missing keys count as `0.0`.
    pub fn predict(&self, profile: &DiseaseProfile, features: &HashMap<String, f64>) -> String {
        let pair = match self.registry.get(&profile.key) {
            Some(ArtifactState::Ready(pair)) => pair,
            Some(ArtifactState::Degraded(reason)) => return error_marker(reason),
            None => return error_marker("prediction artifacts not loaded"),
        };

        let row: Vec<f64> = profile
            .feature_names
            .iter()
            .map(|name| features.get(name).copied().unwrap_or(0.0))
            .collect();

        match pair.predict_row(&row) {
            Ok(class) => profile.label_for_class(class).to_string(),
            Err(e) => {
                tracing::warn!(disease = %profile.key, "prediction failed: {}", e);
                error_marker(&e.to_string())
            }
        }
    }
}

fn error_marker(reason: &str) -> String {
    format!("{ERROR_MARKER_PREFIX}{reason}")
}

/// Whether `label` reports a failed prediction rather than a risk level.
pub fn is_error_marker(label: &str) -> bool {
    label.starts_with(ERROR_MARKER_PREFIX)
}
