//! Screening orchestration.
//!
//! [`ScreeningService`] is the single entry point the API layer talks to. It owns one
//! [`RecordStore`] per configured disease and the shared [`PredictionService`], and is cheap to
//! clone into request handlers.

use crate::config::CoreConfig;
use crate::error::{ScreeningError, ScreeningResult};
use crate::prediction::PredictionService;
use crate::profile::{DiseaseProfile, ProfileSet};
use crate::record::Record;
use crate::registry::{ArtifactRegistry, ArtifactStatus};
use crate::store::RecordStore;
use crate::validation::coerce_features;
use crate::view::{assemble, ResultView, ViewMode};
use screening_types::DiseaseKey;
use screening_uuid::RecordId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ScreeningService {
    cfg: Arc<CoreConfig>,
    prediction: PredictionService,
    stores: Arc<BTreeMap<DiseaseKey, RecordStore>>,
}

impl ScreeningService {
    /// Creates the service, loading every disease's prediction artifacts.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let registry = ArtifactRegistry::load(cfg.profiles());
        Self::with_registry(cfg, Arc::new(registry))
    }

    /// Creates the service over an already-built registry.
    pub fn with_registry(cfg: Arc<CoreConfig>, registry: Arc<ArtifactRegistry>) -> Self {
        let stores = cfg
            .profiles()
            .iter()
            .map(|profile| {
                (
                    profile.key.clone(),
                    RecordStore::new(profile.key.clone(), profile.storage_location.clone()),
                )
            })
            .collect();

        Self {
            cfg,
            prediction: PredictionService::new(registry),
            stores: Arc::new(stores),
        }
    }

    pub fn profiles(&self) -> &ProfileSet {
        self.cfg.profiles()
    }

    pub fn profile(&self, disease: &str) -> ScreeningResult<&DiseaseProfile> {
        self.cfg
            .profiles()
            .get(disease)
            .ok_or_else(|| ScreeningError::UnknownDisease(disease.to_string()))
    }

    pub fn artifact_status(&self) -> Vec<ArtifactStatus> {
        self.prediction.registry().status()
    }

    fn store(&self, profile: &DiseaseProfile) -> ScreeningResult<&RecordStore> {
        self.stores
            .get(&profile.key)
            .ok_or_else(|| ScreeningError::UnknownDisease(profile.key.to_string()))
    }

    /// Records one screening and returns its id.
    ///
    /// The submission is coerced, predicted and appended to the disease's log. A failed
    /// prediction does not fail the submission; the record carries an error marker label.
    ///
    /// # Errors
    ///
    /// - [`ScreeningError::UnknownDisease`] if no profile has key `disease`
    /// - [`ScreeningError::MalformedInput`] if a submitted value is not numeric
    /// - [`ScreeningError::StorageWrite`] (or a related storage error) if the append fails
    ///
    /// Nothing is persisted when an error is returned.
    pub fn submit(&self, disease: &str, raw: &HashMap<String, String>) -> ScreeningResult<RecordId> {
        let profile = self.profile(disease)?;
        let store = self.store(profile)?;

        let coerced = coerce_features(profile, raw)?;
        let label = self.prediction.predict(profile, &coerced.numeric);
        let record = Record::new(coerced.submitted, label);

        store.append(&record)?;

        tracing::info!(disease = %profile.key, id = %record.id, "screening recorded");
        Ok(record.id)
    }

    /// Every record for `disease`, oldest first.
    pub fn records(&self, disease: &str) -> ScreeningResult<Vec<Record>> {
        let profile = self.profile(disease)?;
        Ok(self.store(profile)?.load_all())
    }

    /// Builds the result view for `record_id` under `view_mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::UnknownDisease`] if no profile has key `disease`. A missing or
    /// unknown record id is not an error; the view simply has no current record.
    pub fn result_view(
        &self,
        disease: &str,
        record_id: Option<&str>,
        view_mode: Option<&str>,
    ) -> ScreeningResult<ResultView> {
        let profile = self.profile(disease)?;
        let records = self.store(profile)?.load_all();

        Ok(assemble(
            profile.key.clone(),
            records,
            record_id,
            ViewMode::parse(view_mode),
        ))
    }
}
