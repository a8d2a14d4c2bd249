//! Bilingual text fields and their total normalization.
//!
//! Course, video, and material titles/descriptions are bilingual. Source data
//! arrives in three shapes:
//!
//! 1. A structured object: `{"primary": "...", "secondary": "..."}`
//! 2. A JSON-serialized string of that object (legacy rows written by the old
//!    admin panel): `"{\"primary\":\"...\",\"secondary\":\"...\"}"`
//! 3. Bare plain text (the oldest rows): `"Intro to Sourdough"`
//!
//! Normalization always succeeds: anything that does not parse as shape 1 or 2
//! is treated as plain primary-language text with an empty secondary. The API
//! boundary is the only place this parsing happens; everything past it works
//! with [`LocalizedText`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A normalized bilingual text value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocalizedText {
    /// Primary-language text. Required for titles.
    pub primary: String,
    /// Secondary-language text. Optional, defaults to empty.
    #[serde(default)]
    pub secondary: String,
}

/// Inbound bilingual text as accepted by the API: either the structured
/// object or a single string (which may itself be legacy serialized JSON).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocalizedInput {
    Structured(LocalizedText),
    Text(String),
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

impl LocalizedText {
    /// Build from plain primary-language text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            primary: text.into(),
            secondary: String::new(),
        }
    }

    /// Normalize raw text into a `LocalizedText`. Never fails.
    ///
    /// The string is first tried as a JSON-serialized structured object; if it
    /// is not one (not JSON, not an object, or missing a string `primary`
    /// field), the raw input is kept verbatim as the primary text.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(map)) => {
                if let Some(serde_json::Value::String(primary)) = map.get("primary") {
                    let secondary = match map.get("secondary") {
                        Some(serde_json::Value::String(s)) => s.clone(),
                        _ => String::new(),
                    };
                    return Self {
                        primary: primary.clone(),
                        secondary,
                    };
                }
                Self::plain(raw)
            }
            _ => Self::plain(raw),
        }
    }

    /// True when both language fields are empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.primary.trim().is_empty() && self.secondary.trim().is_empty()
    }

    /// Require a non-blank primary text, e.g. for titles.
    ///
    /// `field` names the offending field in the validation message.
    pub fn require_primary(&self, field: &str) -> Result<(), CoreError> {
        if self.primary.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Field '{field}' requires a non-empty primary-language value"
            )));
        }
        Ok(())
    }
}

impl From<LocalizedInput> for LocalizedText {
    fn from(input: LocalizedInput) -> Self {
        match input {
            LocalizedInput::Structured(text) => text,
            LocalizedInput::Text(raw) => LocalizedText::parse(&raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- parse ---------------------------------------------------------------

    #[test]
    fn parses_serialized_structured_form() {
        let text = LocalizedText::parse(r#"{"primary":"Hello","secondary":"Salom"}"#);
        assert_eq!(text.primary, "Hello");
        assert_eq!(text.secondary, "Salom");
    }

    #[test]
    fn parses_serialized_form_without_secondary() {
        let text = LocalizedText::parse(r#"{"primary":"Hello"}"#);
        assert_eq!(text.primary, "Hello");
        assert_eq!(text.secondary, "");
    }

    #[test]
    fn plain_text_becomes_primary() {
        let text = LocalizedText::parse("Intro to Sourdough");
        assert_eq!(text.primary, "Intro to Sourdough");
        assert_eq!(text.secondary, "");
    }

    #[test]
    fn malformed_json_kept_verbatim_as_primary() {
        let raw = r#"{"primary": unterminated"#;
        let text = LocalizedText::parse(raw);
        assert_eq!(text.primary, raw);
    }

    #[test]
    fn json_object_without_primary_kept_verbatim() {
        let raw = r#"{"title":"wrong shape"}"#;
        let text = LocalizedText::parse(raw);
        assert_eq!(text.primary, raw);
        assert_eq!(text.secondary, "");
    }

    #[test]
    fn json_non_object_kept_verbatim() {
        for raw in [r#"[1,2,3]"#, "42", "true"] {
            let text = LocalizedText::parse(raw);
            assert_eq!(text.primary, raw, "input: {raw}");
        }
    }

    #[test]
    fn json_object_with_non_string_primary_kept_verbatim() {
        let raw = r#"{"primary": 7}"#;
        let text = LocalizedText::parse(raw);
        assert_eq!(text.primary, raw);
    }

    #[test]
    fn non_string_secondary_defaults_to_empty() {
        let text = LocalizedText::parse(r#"{"primary":"ok","secondary":null}"#);
        assert_eq!(text.primary, "ok");
        assert_eq!(text.secondary, "");
    }

    #[test]
    fn empty_string_parses_to_blank() {
        let text = LocalizedText::parse("");
        assert!(text.is_blank());
    }

    // -- LocalizedInput ------------------------------------------------------

    #[test]
    fn structured_input_passes_through() {
        let input: LocalizedInput =
            serde_json::from_str(r#"{"primary":"A","secondary":"B"}"#).unwrap();
        let text = LocalizedText::from(input);
        assert_eq!(text.primary, "A");
        assert_eq!(text.secondary, "B");
    }

    #[test]
    fn string_input_is_normalized() {
        let input: LocalizedInput = serde_json::from_str(r#""plain title""#).unwrap();
        let text = LocalizedText::from(input);
        assert_eq!(text.primary, "plain title");
    }

    #[test]
    fn string_input_holding_serialized_object_is_unwrapped() {
        let input: LocalizedInput =
            serde_json::from_str(r#""{\"primary\":\"X\",\"secondary\":\"Y\"}""#).unwrap();
        let text = LocalizedText::from(input);
        assert_eq!(text.primary, "X");
        assert_eq!(text.secondary, "Y");
    }

    // -- require_primary -----------------------------------------------------

    #[test]
    fn require_primary_accepts_non_empty() {
        assert!(LocalizedText::plain("t").require_primary("title").is_ok());
    }

    #[test]
    fn require_primary_rejects_blank() {
        let err = LocalizedText::plain("   ").require_primary("title");
        assert!(err.is_err());
    }
}
