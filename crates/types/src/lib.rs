//! Validated text types shared by the screening crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input is not a valid disease key
    #[error("invalid disease key '{0}' (only lowercase a-z, 0-9, '-' and '_' allowed)")]
    InvalidDiseaseKey(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, returning `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a supported disease, e.g. `diabetes`.
///
/// Keys appear in URL paths and directory names, so they are restricted to lowercase ASCII
/// letters, digits, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiseaseKey(String);

impl DiseaseKey {
    /// Maximum accepted key length.
    pub const MAX_LEN: usize = 64;

    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let key = input.as_ref().trim();
        if key.is_empty() {
            return Err(TextError::Empty);
        }

        let ok = key.len() <= Self::MAX_LEN
            && key
                .bytes()
                .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_'));
        if !ok {
            return Err(TextError::InvalidDiseaseKey(key.to_owned()));
        }

        Ok(Self(key.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiseaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DiseaseKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for DiseaseKey {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiseaseKey::new(s)
    }
}

impl serde::Serialize for DiseaseKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for DiseaseKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DiseaseKey::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Glucose  ").unwrap();
        assert_eq!(text.as_str(), "Glucose");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   ").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn disease_key_accepts_slugs() {
        for key in ["heart", "diabetes", "type-2_diabetes", "liver2"] {
            assert_eq!(DiseaseKey::new(key).unwrap().as_str(), key);
        }
    }

    #[test]
    fn disease_key_rejects_unsafe_input() {
        for key in ["Heart", "../liver", "kid ney", "liver/", "é"] {
            assert!(
                matches!(DiseaseKey::new(key), Err(TextError::InvalidDiseaseKey(_))),
                "{key} should be rejected"
            );
        }
        assert_eq!(DiseaseKey::new("").unwrap_err(), TextError::Empty);
        assert!(DiseaseKey::new("a".repeat(65)).is_err());
    }

    #[test]
    fn disease_key_deserialize_validates() {
        let key: DiseaseKey = serde_json::from_str("\"kidney\"").unwrap();
        assert_eq!(key.as_str(), "kidney");
        assert!(serde_json::from_str::<DiseaseKey>("\"KIDNEY\"").is_err());
    }
}
