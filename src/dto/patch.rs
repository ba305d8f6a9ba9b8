use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Update value for a nullable column.
///
/// A missing key deserializes to [`Patch::Absent`] (the field carries
/// `#[serde(default)]`), an explicit `null` to [`Patch::Null`] and anything else
/// to [`Patch::Value`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// `None` when absent, otherwise the new column value
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    /// Writes the patch into an active model slot, leaving it untouched when absent
    pub fn apply_to(self, slot: &mut ActiveValue<Option<T>>)
    where
        Option<T>: Into<sea_orm::Value>,
    {
        if let Some(value) = self.into_option() {
            *slot = Set(value);
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue::{NotSet, Unchanged};

    #[derive(Debug, Deserialize, Serialize)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        note: Patch<String>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        let null: Probe = serde_json::from_str(r#"{"note": null}"#).unwrap();
        let value: Probe = serde_json::from_str(r#"{"note": "fragile"}"#).unwrap();

        assert_eq!(absent.note, Patch::Absent);
        assert_eq!(null.note, Patch::Null);
        assert_eq!(value.note, Patch::Value("fragile".to_string()));
    }

    #[test]
    fn absent_is_not_serialized() {
        let probe = Probe {
            note: Patch::Absent,
        };
        assert_eq!(serde_json::to_string(&probe).unwrap(), "{}");

        let probe = Probe { note: Patch::Null };
        assert_eq!(serde_json::to_string(&probe).unwrap(), r#"{"note":null}"#);
    }

    #[test]
    fn apply_to_only_touches_present_fields() {
        let mut slot: ActiveValue<Option<String>> = Unchanged(Some("keep".into()));
        Patch::<String>::Absent.apply_to(&mut slot);
        assert_eq!(slot, Unchanged(Some("keep".into())));

        Patch::<String>::Null.apply_to(&mut slot);
        assert_eq!(slot, Set(None));

        let mut slot: ActiveValue<Option<String>> = NotSet;
        Patch::Value("new".to_string()).apply_to(&mut slot);
        assert_eq!(slot, Set(Some("new".into())));
    }
}
