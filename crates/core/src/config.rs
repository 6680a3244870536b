//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Core
//! code never reads environment variables itself; the binary reads them and hands the raw
//! values to the `*_from_env_value` helpers below.

use crate::constants::{DEFAULT_ARTIFACT_DIR, DEFAULT_DATA_DIR};
use crate::error::{ScreeningError, ScreeningResult};
use crate::profile::ProfileSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    artifact_dir: PathBuf,
    profiles: Arc<ProfileSet>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// When `profiles_file` is `None` the built-in disease table is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the profiles file cannot be read or parsed, or if the resulting
    /// profile set is empty or invalid.
    pub fn new(
        data_dir: PathBuf,
        artifact_dir: PathBuf,
        profiles_file: Option<PathBuf>,
    ) -> ScreeningResult<Self> {
        let profiles = match profiles_file {
            Some(path) => ProfileSet::from_yaml_file(&path, &data_dir, &artifact_dir)?,
            None => ProfileSet::builtin(&data_dir, &artifact_dir)?,
        };

        Self::with_profiles(data_dir, artifact_dir, profiles)
    }

    /// Create a `CoreConfig` from an already-built profile set.
    pub fn with_profiles(
        data_dir: PathBuf,
        artifact_dir: PathBuf,
        profiles: ProfileSet,
    ) -> ScreeningResult<Self> {
        if profiles.is_empty() {
            return Err(ScreeningError::InvalidConfig(
                "at least one disease profile is required".into(),
            ));
        }

        Ok(Self {
            data_dir,
            artifact_dir,
            profiles: Arc::new(profiles),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    pub fn profiles(&self) -> &Arc<ProfileSet> {
        &self.profiles
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the screening data directory; blank or missing values fall back to the default.
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_DATA_DIR.into()))
}

/// Resolve the artifact directory; blank or missing values fall back to the default.
pub fn artifact_dir_from_env_value(value: Option<String>) -> PathBuf {
    PathBuf::from(non_blank(value).unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.into()))
}

/// Resolve the optional profiles file.
///
/// # Errors
///
/// Returns [`ScreeningError::InvalidConfig`] if a path is given but is not a file.
pub fn profiles_file_from_env_value(value: Option<String>) -> ScreeningResult<Option<PathBuf>> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) => {
            let path = PathBuf::from(v);
            if path.is_file() {
                Ok(Some(path))
            } else {
                Err(ScreeningError::InvalidConfig(format!(
                    "profiles file does not exist: {}",
                    path.display()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_for_missing_or_blank_values() {
        assert_eq!(data_dir_from_env_value(None), PathBuf::from("Results"));
        assert_eq!(
            data_dir_from_env_value(Some("   ".into())),
            PathBuf::from("Results")
        );
        assert_eq!(
            artifact_dir_from_env_value(None),
            PathBuf::from("final_models")
        );
        assert_eq!(
            artifact_dir_from_env_value(Some(" /srv/models ".into())),
            PathBuf::from("/srv/models")
        );
    }

    #[test]
    fn profiles_file_must_exist() {
        assert!(profiles_file_from_env_value(None).unwrap().is_none());
        assert!(profiles_file_from_env_value(Some(String::new()))
            .unwrap()
            .is_none());

        let err = profiles_file_from_env_value(Some("/definitely/not/here.yaml".into()))
            .expect_err("missing file should be rejected");
        assert!(matches!(err, ScreeningError::InvalidConfig(_)));
    }

    #[test]
    fn new_uses_builtin_profiles_without_file() {
        let cfg = CoreConfig::new("data".into(), "models".into(), None)
            .expect("CoreConfig::new should succeed");

        assert_eq!(cfg.profiles().len(), 5);
        assert_eq!(cfg.data_dir(), Path::new("data"));
        assert_eq!(cfg.artifact_dir(), Path::new("models"));
    }

    #[test]
    fn new_loads_profiles_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("profiles.yaml");
        fs::write(
            &path,
            "profiles:\n  - key: flu\n    display_name: Flu\n    feature_names: [temp]\n",
        )
        .unwrap();

        let cfg = CoreConfig::new("data".into(), "models".into(), Some(path))
            .expect("CoreConfig::new should succeed");

        assert_eq!(cfg.profiles().len(), 1);
        assert!(cfg.profiles().get("flu").is_some());
    }

    #[test]
    fn empty_profiles_file_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("profiles.yaml");
        fs::write(&path, "profiles: []\n").unwrap();

        let err = CoreConfig::new("data".into(), "models".into(), Some(path)).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidConfig(_)));
    }
}
