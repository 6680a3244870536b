//! # Screening Core
//!
//! Core business logic for the multi-disease screening service.
//!
//! This crate contains the data model and file operations:
//! - Disease profiles (built-in table or YAML file)
//! - Prediction pairs loaded from JSON artifacts, held in an [`ArtifactRegistry`]
//! - The fail-soft [`PredictionService`]
//! - Append-only per-disease screening logs ([`RecordStore`])
//! - [`ScreeningService`], which ties the above together for submissions and result views
//!
//! **No API concerns**: HTTP servers and DTOs belong in `api-rest` and `api-shared`.

pub mod artifacts;
pub mod config;
pub mod constants;
pub mod error;
pub mod prediction;
pub mod profile;
pub mod record;
pub mod registry;
pub mod screening;
pub mod store;
pub mod validation;
pub mod view;

pub use artifacts::{Classify, PredictionError, PredictionPair, Transform};
pub use config::{
    artifact_dir_from_env_value, data_dir_from_env_value, profiles_file_from_env_value, CoreConfig,
};
pub use error::{ArtifactLoadError, ScreeningError, ScreeningResult};
pub use prediction::{is_error_marker, PredictionService};
pub use profile::{DiseaseProfile, ProfileSet};
pub use record::Record;
pub use registry::{ArtifactRegistry, ArtifactState, ArtifactStatus};
pub use screening::ScreeningService;
pub use store::RecordStore;
pub use view::{ResultView, ViewMode};

pub use screening_types::{DiseaseKey, NonEmptyText};
pub use screening_uuid::RecordId;
