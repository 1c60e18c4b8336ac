use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub fhir_version: FhirVersion,
    pub required_fields: RequiredFieldPolicy,
    pub unknown_fields: UnknownFieldPolicy,
    pub validate_primitives: bool,
    pub pretty: bool,
    pub summary: SummaryMode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FhirVersion {
    #[serde(rename = "4.0.1")]
    R4,
}

/// What to do when a required element is absent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequiredFieldPolicy {
    /// Fail the call with `MissingRequiredField`.
    #[default]
    Strict,
    /// Record a warning and leave the field empty.
    Lenient,
}

/// What to do with object members the structure's schema does not describe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Keep them on the node and emit them again on encode.
    #[default]
    Preserve,
    /// Discard them with a warning.
    Drop,
    /// Fail the call with `UnknownField`.
    Reject,
}

/// Which elements the encoder writes, after the `_summary` search parameter.
///
/// Filtering applies to resources and their backbone elements. Datatype values
/// are written whole, and `resourceType` is always written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Every element.
    #[default]
    All,
    /// Summary elements only, plus `id` and `meta`.
    True,
    /// Every element not flagged as a summary element.
    False,
    /// The narrative `text`, plus `id` and `meta`.
    Text,
    /// Every element except the narrative `text`.
    Data,
}

impl SummaryMode {
    /// Whether members outside the schema are still written.
    pub fn keeps_unknown_members(self) -> bool {
        matches!(self, Self::All | Self::False | Self::Data)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            fhir_version: FhirVersion::R4,
            required_fields: RequiredFieldPolicy::Strict,
            unknown_fields: UnknownFieldPolicy::Preserve,
            validate_primitives: true,
            pretty: false,
            summary: SummaryMode::All,
        }
    }
}

impl CodecConfig {
    pub fn strict() -> Self {
        Self::default().with_unknown_fields(UnknownFieldPolicy::Reject)
    }

    pub fn lenient() -> Self {
        Self::default().with_required_fields(RequiredFieldPolicy::Lenient)
    }

    pub fn from_json_str(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }

    pub fn with_required_fields(mut self, policy: RequiredFieldPolicy) -> Self {
        self.required_fields = policy;
        self
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    pub fn with_primitive_validation(mut self, enabled: bool) -> Self {
        self.validate_primitives = enabled;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_summary(mut self, summary: SummaryMode) -> Self {
        self.summary = summary;
        self
    }
}
