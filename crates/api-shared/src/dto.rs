//! Request and response bodies of the REST surface.

use screening_core::{
    is_error_marker, ArtifactStatus, DiseaseProfile, Record, ResultView,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    pub diseases: Vec<DiseaseStatus>,
}

/// Whether a disease's prediction artifacts loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiseaseStatus {
    pub disease: String,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ArtifactStatus> for DiseaseStatus {
    fn from(status: ArtifactStatus) -> Self {
        Self {
            disease: status.disease.to_string(),
            ready: status.ready,
            error: status.error,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiseaseSummary {
    pub key: String,
    pub display_name: String,
    pub ready: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListDiseasesRes {
    pub diseases: Vec<DiseaseSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiseaseProfileRes {
    pub key: String,
    pub display_name: String,
    /// Form fields, in the order the model expects them.
    pub feature_names: Vec<String>,
    pub high_risk_message: String,
    pub low_risk_message: String,
    pub ready: bool,
}

impl DiseaseProfileRes {
    pub fn new(profile: &DiseaseProfile, ready: bool) -> Self {
        Self {
            key: profile.key.to_string(),
            display_name: profile.display_name.to_string(),
            feature_names: profile.feature_names.clone(),
            high_risk_message: profile.high_risk_message.clone(),
            low_risk_message: profile.low_risk_message.clone(),
            ready,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmitScreeningReq {
    /// Raw values keyed by feature name. Missing or blank values count as zero.
    #[serde(default)]
    pub features: HashMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmitScreeningRes {
    pub id: String,
    pub disease: String,
    pub results_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeatureValueRes {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordRes {
    pub id: String,
    pub timestamp: String,
    pub features: Vec<FeatureValueRes>,
    pub prediction: String,
    /// Set when the prediction could not be computed.
    pub prediction_failed: bool,
}

impl From<Record> for RecordRes {
    fn from(record: Record) -> Self {
        Self {
            id: record.id.to_string(),
            prediction_failed: is_error_marker(&record.prediction_label),
            timestamp: record.timestamp,
            features: record
                .features
                .into_iter()
                .map(|(name, value)| FeatureValueRes { name, value })
                .collect(),
            prediction: record.prediction_label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResultViewRes {
    pub disease: String,
    /// `current` or `all`.
    pub view: String,
    pub current: Option<RecordRes>,
    pub history: Vec<RecordRes>,
}

impl From<ResultView> for ResultViewRes {
    fn from(view: ResultView) -> Self {
        Self {
            disease: view.disease.to_string(),
            view: view.view_mode.to_string(),
            current: view.current.map(RecordRes::from),
            history: view.history.into_iter().map(RecordRes::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub ok: bool,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use screening_core::{DiseaseKey, ViewMode};

    #[test]
    fn record_res_flags_error_markers() {
        let ok = Record::new(vec![("a".into(), "1".into())], "🟢 Low Risk – stay healthy!".into());
        let failed = Record::new(vec![], "❌ Error during prediction: boom".into());

        let ok = RecordRes::from(ok);
        assert!(!ok.prediction_failed);
        assert_eq!(
            ok.features,
            vec![FeatureValueRes {
                name: "a".into(),
                value: "1".into()
            }]
        );
        assert!(RecordRes::from(failed).prediction_failed);
    }

    #[test]
    fn result_view_res_carries_view_mode() {
        let view = ResultView {
            disease: DiseaseKey::new("heart").unwrap(),
            view_mode: ViewMode::Current,
            current: None,
            history: vec![],
        };

        let json = serde_json::to_value(ResultViewRes::from(view)).unwrap();
        assert_eq!(json["disease"], "heart");
        assert_eq!(json["view"], "current");
        assert!(json["current"].is_null());
    }

    #[test]
    fn submit_request_defaults_to_no_features() {
        let req: SubmitScreeningReq = serde_json::from_str("{}").unwrap();
        assert!(req.features.is_empty());
    }
}
