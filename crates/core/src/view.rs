//! Current vs history partition of a disease's screenings.

use crate::record::Record;
use screening_types::DiseaseKey;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Only the requested record.
    Current,
    /// The requested record plus every other one.
    #[default]
    All,
}

impl ViewMode {
    /// `"current"` selects [`ViewMode::Current`]; anything else, including no value, is `All`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("current") => Self::Current,
            _ => Self::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultView {
    pub disease: DiseaseKey,
    pub view_mode: ViewMode,
    pub current: Option<Record>,
    /// Every record except `current`, in store order. Always empty in `Current` mode.
    pub history: Vec<Record>,
}

/// Splits `records` into the record with id `record_id` and the rest.
///
/// An absent or unparsable id matches nothing.
pub fn assemble(
    disease: DiseaseKey,
    records: Vec<Record>,
    record_id: Option<&str>,
    view_mode: ViewMode,
) -> ResultView {
    let wanted = record_id.and_then(|raw| screening_uuid::RecordId::parse(raw.trim()).ok());

    let mut current = None;
    let mut history = Vec::new();
    for record in records {
        if current.is_none() && Some(record.id) == wanted {
            current = Some(record);
        } else if view_mode == ViewMode::All {
            history.push(record);
        }
    }

    ResultView {
        disease,
        view_mode,
        current,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new(vec![("a".into(), i.to_string())], "label".into()))
            .collect()
    }

    fn key() -> DiseaseKey {
        DiseaseKey::new("heart").unwrap()
    }

    #[test]
    fn view_mode_parsing() {
        assert_eq!(ViewMode::parse(Some("current")), ViewMode::Current);
        assert_eq!(ViewMode::parse(Some("all")), ViewMode::All);
        assert_eq!(ViewMode::parse(Some("CURRENT")), ViewMode::All);
        assert_eq!(ViewMode::parse(Some("")), ViewMode::All);
        assert_eq!(ViewMode::parse(None), ViewMode::All);
    }

    #[test]
    fn current_mode_never_has_history() {
        let all = records(4);
        let id = all[2].id.to_string();

        let view = assemble(key(), all.clone(), Some(&id), ViewMode::Current);
        assert_eq!(view.current.as_ref(), Some(&all[2]));
        assert!(view.history.is_empty());

        let view = assemble(key(), all, Some("missing"), ViewMode::Current);
        assert!(view.current.is_none());
        assert!(view.history.is_empty());
    }

    #[test]
    fn all_mode_splits_current_from_history_in_order() {
        let all = records(3);
        let id = all[1].id.to_string();

        let view = assemble(key(), all.clone(), Some(&id), ViewMode::All);

        assert_eq!(view.current, Some(all[1].clone()));
        assert_eq!(view.history, vec![all[0].clone(), all[2].clone()]);
        assert_eq!(view.view_mode, ViewMode::All);
    }

    #[test]
    fn unknown_or_absent_id_puts_everything_in_history() {
        let all = records(3);

        let view = assemble(
            key(),
            all.clone(),
            Some("550e8400-e29b-41d4-a716-446655440000"),
            ViewMode::All,
        );
        assert!(view.current.is_none());
        assert_eq!(view.history, all);

        let view = assemble(key(), all.clone(), None, ViewMode::All);
        assert_eq!(view.history, all);
    }
}
