//! Submission coercion.
//!
//! Every entry point (HTML form or JSON) goes through [`coerce_features`], so a submission is
//! either accepted under one policy or rejected before anything is predicted or persisted:
//!
//! - a feature that is absent or blank counts as `0.0` and is stored as submitted
//! - a present value must parse as `f64` after trimming; `nan` and `inf` parse and are left to
//!   the preprocessor
//! - any other value rejects the whole submission with [`ScreeningError::MalformedInput`]

use crate::error::{ScreeningError, ScreeningResult};
use crate::profile::DiseaseProfile;
use std::collections::HashMap;

/// A submission after coercion.
#[derive(Clone, Debug, PartialEq)]
pub struct CoercedFeatures {
    /// Numeric value per profile feature.
    pub numeric: HashMap<String, f64>,
    /// Submitted strings in profile order; absent features are `""`.
    pub submitted: Vec<(String, String)>,
}

/// Coerces `raw` against the feature list of `profile`. Keys the profile does not name are
/// dropped.
///
/// # Errors
///
/// Returns [`ScreeningError::MalformedInput`] naming every feature whose value is present,
/// non-blank and not a number.
pub fn coerce_features(
    profile: &DiseaseProfile,
    raw: &HashMap<String, String>,
) -> ScreeningResult<CoercedFeatures> {
    let mut numeric = HashMap::with_capacity(profile.feature_names.len());
    let mut submitted = Vec::with_capacity(profile.feature_names.len());
    let mut malformed = Vec::new();

    for name in &profile.feature_names {
        let value = raw.get(name).map(String::as_str).unwrap_or_default();
        let trimmed = value.trim();

        let parsed = if trimmed.is_empty() {
            0.0
        } else {
            match trimmed.parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    malformed.push(name.clone());
                    continue;
                }
            }
        };

        numeric.insert(name.clone(), parsed);
        submitted.push((name.clone(), value.to_string()));
    }

    if !malformed.is_empty() {
        return Err(ScreeningError::MalformedInput { fields: malformed });
    }

    Ok(CoercedFeatures { numeric, submitted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileSet;
    use std::path::Path;

    fn heart() -> DiseaseProfile {
        ProfileSet::builtin(Path::new("data"), Path::new("models"))
            .unwrap()
            .get("heart")
            .cloned()
            .unwrap()
    }

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn absent_and_blank_values_default_to_zero() {
        let coerced = coerce_features(&heart(), &raw(&[("cp", "  "), ("chol", "240")])).unwrap();

        assert_eq!(coerced.numeric["cp"], 0.0);
        assert_eq!(coerced.numeric["trestbps"], 0.0);
        assert_eq!(coerced.numeric["chol"], 240.0);
        assert_eq!(coerced.numeric.len(), 7);
    }

    #[test]
    fn submitted_values_keep_profile_order_and_raw_text() {
        let coerced =
            coerce_features(&heart(), &raw(&[("chol", " 240 "), ("cp", "1"), ("extra", "x")]))
                .unwrap();

        let names: Vec<&str> = coerced.submitted.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            ["cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang"]
        );
        assert_eq!(coerced.submitted[0].1, "1");
        assert_eq!(coerced.submitted[1].1, "");
        assert_eq!(coerced.submitted[2].1, " 240 ");
    }

    #[test]
    fn non_numeric_values_are_rejected_by_name() {
        let err = coerce_features(&heart(), &raw(&[("cp", "abc"), ("exang", "yes"), ("fbs", "1")]))
            .unwrap_err();

        match err {
            ScreeningError::MalformedInput { fields } => {
                assert_eq!(fields, vec!["cp".to_string(), "exang".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nan_is_accepted_for_imputation() {
        let coerced = coerce_features(&heart(), &raw(&[("chol", "nan")])).unwrap();
        assert!(coerced.numeric["chol"].is_nan());
    }
}
