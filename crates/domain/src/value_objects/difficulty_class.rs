//! Difficulty class value object
//!
//! The host stores a DC either as a bare number or as an object carrying
//! presentation metadata. Only `value` takes part in the degree calculation.

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// The target a check total is compared against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DifficultyClassInput")]
pub struct DifficultyClass {
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Slug of the statistic the DC was derived from (e.g. "reflex")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistic: Option<String>,
}

impl DifficultyClass {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            label: None,
            visible: false,
            slug: None,
            statistic: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_statistic(mut self, statistic: impl Into<String>) -> Self {
        self.statistic = Some(statistic.into());
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Validate a loosely-typed DC value coming from host data.
    pub fn from_number(value: f64) -> Result<Self, DomainError> {
        Ok(Self::new(integral_dc(Some(value))?))
    }
}

impl From<i32> for DifficultyClass {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

/// Wire shape accepted from the host before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DifficultyClassInput {
    Bare(f64),
    #[serde(rename_all = "camelCase")]
    Detailed {
        #[serde(default)]
        value: Option<f64>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        visible: bool,
        #[serde(default)]
        slug: Option<String>,
        #[serde(default)]
        statistic: Option<String>,
    },
}

impl TryFrom<DifficultyClassInput> for DifficultyClass {
    type Error = DomainError;

    fn try_from(input: DifficultyClassInput) -> Result<Self, Self::Error> {
        match input {
            DifficultyClassInput::Bare(value) => DifficultyClass::from_number(value),
            DifficultyClassInput::Detailed {
                value,
                label,
                visible,
                slug,
                statistic,
            } => Ok(DifficultyClass {
                value: integral_dc(value)?,
                label,
                visible,
                slug,
                statistic,
            }),
        }
    }
}

fn integral_dc(value: Option<f64>) -> Result<i32, DomainError> {
    let value = value.ok_or_else(|| DomainError::invalid_dc("value is missing"))?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(DomainError::invalid_dc(format!("{} is not an integer", value)));
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(DomainError::invalid_dc(format!("{} is out of range", value)));
    }
    Ok(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_bare_number() {
        let dc: DifficultyClass = serde_json::from_str("15").unwrap();
        assert_eq!(dc, DifficultyClass::new(15));
    }

    #[test]
    fn deserializes_object_with_metadata() {
        let dc: DifficultyClass = serde_json::from_str(
            r#"{"value": 22, "label": "Reflex DC", "visible": true, "statistic": "reflex"}"#,
        )
        .unwrap();
        assert_eq!(dc.value, 22);
        assert_eq!(dc.label.as_deref(), Some("Reflex DC"));
        assert!(dc.visible);
        assert_eq!(dc.statistic.as_deref(), Some("reflex"));
    }

    #[test]
    fn rejects_missing_value() {
        let err = serde_json::from_str::<DifficultyClass>(r#"{"label": "AC"}"#).unwrap_err();
        assert!(err.to_string().contains("value is missing"));
    }

    #[test]
    fn rejects_non_numeric_and_fractional_values() {
        assert!(serde_json::from_str::<DifficultyClass>(r#""hard""#).is_err());
        assert!(serde_json::from_str::<DifficultyClass>("15.5").is_err());
        assert!(matches!(
            DifficultyClass::from_number(f64::NAN),
            Err(DomainError::InvalidDifficultyClass(_))
        ));
    }
}
