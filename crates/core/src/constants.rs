//! Constants used throughout the screening core crate.
//!
//! Path defaults, artifact naming and the on-disk record keys live here so the store, the
//! registry and the profile loader agree on them.

/// Default directory holding one sub-directory (and log) per disease.
pub const DEFAULT_DATA_DIR: &str = "Results";

/// Default directory holding the serialized prediction pairs.
pub const DEFAULT_ARTIFACT_DIR: &str = "final_models";

/// Filename of a disease's append-only screening log. One JSON object per line.
pub const RESULTS_FILENAME: &str = "results.txt";

/// Suffix appended to the disease key to form the default model artifact filename.
pub const MODEL_ARTIFACT_SUFFIX: &str = "_model.json";

/// Suffix appended to the disease key to form the default preprocessor artifact filename.
pub const PREPROCESSOR_ARTIFACT_SUFFIX: &str = "_preprocessor.json";

/// Log-line key holding the record id.
pub const RECORD_ID_KEY: &str = "id";

/// Log-line key holding the creation timestamp.
pub const RECORD_TIMESTAMP_KEY: &str = "ts";

/// Log-line key holding the prediction label.
pub const RECORD_PREDICTION_KEY: &str = "Prediction";

/// Keys that can never be used as feature names.
pub const RESERVED_RECORD_KEYS: [&str; 3] =
    [RECORD_ID_KEY, RECORD_TIMESTAMP_KEY, RECORD_PREDICTION_KEY];

/// Prefix of every label produced when a prediction could not be computed.
pub const ERROR_MARKER_PREFIX: &str = "❌ Error during prediction: ";

/// Prefix of lines written by the retired free-text log format.
pub const LEGACY_INPUT_PREFIX: &str = "Input: ";

/// Separator between the input fragment and the label in the retired log format.
pub const LEGACY_PREDICTION_SEPARATOR: &str = ", Prediction: ";

/// Default decision threshold for probabilistic models.
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;
