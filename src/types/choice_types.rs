// Choice elements: one slot, a closed set of permitted types, selected by key suffix

use serde_json::Value;

use crate::codec::{DecodeContext, EncodeContext};
use crate::error::Result;

/// A closed set of alternatives for a `name[x]` element.
///
/// Implementations are generated by [`fhir_choice!`](crate::fhir_choice); the
/// choice codec is the only caller of `decode_alternative` / `encode_alternative`.
pub trait ChoiceType: Sized {
    /// Rust name of the sum type, reported as the field's type in schemas.
    const NAME: &'static str;

    /// Permitted type suffixes, capitalized as they appear on the wire.
    const ALTERNATIVES: &'static [&'static str];

    /// Suffix of the alternative this value holds.
    fn suffix(&self) -> &'static str;

    /// Decodes `value` as the alternative named by `suffix`.
    ///
    /// Returns `Ok(None)` when `suffix` is not one of [`Self::ALTERNATIVES`].
    fn decode_alternative(
        suffix: &str,
        value: Value,
        ctx: &mut DecodeContext<'_>,
    ) -> Result<Option<Self>>;

    fn encode_alternative(&self, ctx: &mut EncodeContext<'_>) -> Result<Value>;

    fn permits(suffix: &str) -> bool {
        Self::ALTERNATIVES.contains(&suffix)
    }
}

/// Wire key for a choice alternative: `onset` + `Age` -> `onsetAge`.
pub fn choice_key(base_name: &str, suffix: &str) -> String {
    format!("{base_name}{suffix}")
}

/// Type suffix for a FHIR type code: `dateTime` -> `DateTime`.
pub fn type_suffix(type_code: &str) -> String {
    capitalize_first(type_code)
}

/// Splits `key` into a type suffix if it is `base_name` followed by a capitalized name.
///
/// `valueQuantity` with base `value` yields `Quantity`; `valueSet` yields `Set`
/// (it is up to the caller to know `valueSet` is a plain field); `values` and
/// `value` yield nothing.
pub fn split_choice_key<'k>(key: &'k str, base_name: &str) -> Option<&'k str> {
    let suffix = key.strip_prefix(base_name)?;
    match suffix.chars().next() {
        Some(first) if first.is_ascii_uppercase() => Some(suffix),
        _ => None,
    }
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_choice_key() {
        assert_eq!(split_choice_key("onsetDateTime", "onset"), Some("DateTime"));
        assert_eq!(split_choice_key("valueQuantity", "value"), Some("Quantity"));
        assert_eq!(split_choice_key("onset", "onset"), None);
        assert_eq!(split_choice_key("onsets", "onset"), None);
        assert_eq!(split_choice_key("abatementAge", "onset"), None);
    }

    #[test]
    fn test_type_suffix() {
        assert_eq!(type_suffix("dateTime"), "DateTime");
        assert_eq!(type_suffix("string"), "String");
        assert_eq!(type_suffix("CodeableConcept"), "CodeableConcept");
        assert_eq!(type_suffix(""), "");
        assert_eq!(choice_key("onset", &type_suffix("dateTime")), "onsetDateTime");
    }
}
