// src/common/patch.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Campo de atualização parcial que distingue "ausente" de "null".
///
/// Use sempre com `#[serde(default)]`: campo ausente vira `Missing`,
/// `null` vira `Null` e qualquer valor vira `Value`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    /// Aplica a mudança numa coluna anulável.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Missing => {}
            Patch::Null => *target = None,
            Patch::Value(v) => *target = Some(v),
        }
    }

    /// O novo valor, quando o campo veio preenchido.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
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
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

// Usado pelo utoipa para documentar o default dos payloads.
impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => v.serialize(serializer),
            Patch::Missing | Patch::Null => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        notes: Patch<String>,
        #[serde(default)]
        budget: Patch<i64>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let p: Payload = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(p.notes, Patch::Null);
        assert!(p.budget.is_missing());

        let p: Payload = serde_json::from_str(r#"{"notes": "ok", "budget": 10}"#).unwrap();
        assert_eq!(p.notes, Patch::Value("ok".to_string()));
        assert_eq!(p.budget.value(), Some(&10));
    }

    #[test]
    fn serializes_as_plain_value_or_null() {
        assert_eq!(serde_json::to_value(Patch::Value(5)).unwrap(), serde_json::json!(5));
        assert_eq!(serde_json::to_value(Patch::<i64>::Null).unwrap(), serde_json::Value::Null);
        assert_eq!(serde_json::to_value(Patch::<i64>::Missing).unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn apply_to_only_touches_present_fields() {
        let mut notes = Some("antigo".to_string());
        Patch::Missing.apply_to(&mut notes);
        assert_eq!(notes.as_deref(), Some("antigo"));

        Patch::Null.apply_to(&mut notes);
        assert_eq!(notes, None);

        Patch::Value("novo".to_string()).apply_to(&mut notes);
        assert_eq!(notes.as_deref(), Some("novo"));
    }
}
