//! Validated primitives shared across the CMVR workspace.
//!
//! These types carry their invariants in the type system so that the condition engine never
//! has to re-check them: a [`ConditionId`] is never blank, a [`NonEmptyText`] always has
//! visible content, and a [`ComplianceStatus`] is one of the three choices offered on the
//! ECC monitoring checklist.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input did not name a known compliance status
    #[error("unknown compliance status: '{0}'")]
    UnknownStatus(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err(TextError::Empty)` if the input is empty or contains only whitespace.
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

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

/// Identifier of a checklist condition.
///
/// Default conditions use the stable ids of the template definition (`"1"`, `"7a"`, ...).
/// Custom conditions use generated ids. Either way the id is an opaque, non-blank string and
/// is what the display labeller shows for nested rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionId(NonEmptyText);

impl ConditionId {
    /// Creates a condition id, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `Err(TextError::Empty)` if nothing is left after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        NonEmptyText::new(input).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ConditionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for ConditionId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for ConditionId {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConditionId::new(s)
    }
}

impl serde::Serialize for ConditionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for ConditionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        NonEmptyText::deserialize(deserializer).map(Self)
    }
}

/// The compliance choice recorded against a condition.
///
/// Serialized with the camel-case keys the report generator already consumes
/// (`complied`, `partiallyComplied`, `notComplied`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComplianceStatus {
    Complied,
    PartiallyComplied,
    NotComplied,
}

impl ComplianceStatus {
    /// Returns the wire key for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Complied => "complied",
            ComplianceStatus::PartiallyComplied => "partiallyComplied",
            ComplianceStatus::NotComplied => "notComplied",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceStatus {
    type Err = TextError;

    /// Accepts the wire key as well as the kebab/snake spellings typed on a command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalised.as_str() {
            "complied" => Ok(ComplianceStatus::Complied),
            "partiallycomplied" | "partial" => Ok(ComplianceStatus::PartiallyComplied),
            "notcomplied" => Ok(ComplianceStatus::NotComplied),
            _ => Err(TextError::UnknownStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Dust suppression  ").unwrap();
        assert_eq!(text.as_str(), "Dust suppression");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert!(matches!(NonEmptyText::new(" \t"), Err(TextError::Empty)));
    }

    #[test]
    fn test_condition_id_rejects_blank() {
        assert!(ConditionId::new("").is_err());
        assert_eq!(ConditionId::new(" 7a ").unwrap().as_str(), "7a");
    }

    #[test]
    fn test_condition_id_deserialize_rejects_blank() {
        let err = serde_json::from_str::<ConditionId>("\"  \"");
        assert!(err.is_err());

        let id: ConditionId = serde_json::from_str("\"7b\"").unwrap();
        assert_eq!(id.to_string(), "7b");
    }

    #[test]
    fn test_compliance_status_wire_keys() {
        let json = serde_json::to_string(&ComplianceStatus::PartiallyComplied).unwrap();
        assert_eq!(json, "\"partiallyComplied\"");
        assert_eq!(ComplianceStatus::NotComplied.as_str(), "notComplied");
    }

    #[test]
    fn test_compliance_status_parses_cli_spellings() {
        assert_eq!(
            "partially-complied".parse::<ComplianceStatus>().unwrap(),
            ComplianceStatus::PartiallyComplied
        );
        assert_eq!(
            "NOT_COMPLIED".parse::<ComplianceStatus>().unwrap(),
            ComplianceStatus::NotComplied
        );
        assert_eq!(
            "complied".parse::<ComplianceStatus>().unwrap(),
            ComplianceStatus::Complied
        );

        let err = "maybe".parse::<ComplianceStatus>().expect_err("should reject");
        assert!(matches!(err, TextError::UnknownStatus(s) if s == "maybe"));
    }
}
