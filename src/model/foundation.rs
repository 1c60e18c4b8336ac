//! Infrastructure resources: Basic, Bundle, OperationOutcome and Parameters.
//!
//! `Bundle.entry.resource`, `Bundle.entry.response.outcome` and
//! `Parameters.parameter.resource` hold a nested [`Resource`] and are decoded
//! through the same discriminator dispatch as a top-level payload.

use std::collections::BTreeMap;
use std::fmt;

use super::datatypes::{CodeableConcept, ExtensionValue, Identifier, Reference, ReferenceTarget};
use super::Resource;
use crate::codec::{DecodeIssue, IssueSeverity};
use crate::error::FhirCodecError;
use crate::primitives::{Code, Date, Instant, Uri};
use crate::fhir_structure;

fhir_structure! {
    /// A resource for data that has no dedicated resource type.
    domain_resource Basic {
        identifier: repeated Identifier = "identifier" [summary],
        code: required CodeableConcept = "code" [summary],
        subject: optional Reference = "subject" [summary],
        created: optional Date = "created",
        author: optional Reference = "author" [summary],
    }
}

fhir_structure! {
    resource Bundle {
        identifier: optional Identifier = "identifier" [summary],
        type_: required Code = "type" [summary],
        timestamp: optional Instant = "timestamp" [summary],
        total: optional u32 = "total" [summary],
        link: repeated BundleLink = "link" [summary],
        entry: repeated BundleEntry = "entry" [summary],
    }
}

fhir_structure! {
    backbone BundleLink {
        relation: required String = "relation" [summary],
        url: required Uri = "url" [summary],
    }
}

fhir_structure! {
    backbone BundleEntry {
        link: repeated BundleLink = "link" [summary],
        full_url: optional Uri = "fullUrl" [summary],
        resource: optional Resource = "resource" [summary],
        search: optional BundleEntrySearch = "search" [summary],
        request: optional BundleEntryRequest = "request" [summary],
        response: optional BundleEntryResponse = "response" [summary],
    }
}

fhir_structure! {
    backbone BundleEntrySearch {
        mode: optional Code = "mode" [summary],
        score: optional rust_decimal::Decimal = "score" [summary],
    }
}

fhir_structure! {
    backbone BundleEntryRequest {
        method: required Code = "method" [summary],
        url: required Uri = "url" [summary],
        if_none_match: optional String = "ifNoneMatch" [summary],
        if_modified_since: optional Instant = "ifModifiedSince" [summary],
        if_match: optional String = "ifMatch" [summary],
        if_none_exist: optional String = "ifNoneExist" [summary],
    }
}

fhir_structure! {
    backbone BundleEntryResponse {
        status: required String = "status" [summary],
        location: optional Uri = "location" [summary],
        etag: optional String = "etag" [summary],
        last_modified: optional Instant = "lastModified" [summary],
        outcome: optional Resource = "outcome" [summary],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleType {
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    History,
    Searchset,
    Collection,
}

impl BundleType {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Message => "message",
            Self::Transaction => "transaction",
            Self::TransactionResponse => "transaction-response",
            Self::Batch => "batch",
            Self::BatchResponse => "batch-response",
            Self::History => "history",
            Self::Searchset => "searchset",
            Self::Collection => "collection",
        }
    }
}

impl fmt::Display for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl Bundle {
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            type_: bundle_type.as_code().to_string(),
            ..Default::default()
        }
    }

    pub fn searchset() -> Self {
        Self::new(BundleType::Searchset)
    }

    pub fn transaction() -> Self {
        Self::new(BundleType::Transaction)
    }

    pub fn batch() -> Self {
        Self::new(BundleType::Batch)
    }

    pub fn collection() -> Self {
        Self::new(BundleType::Collection)
    }

    /// Appends an entry and keeps `total` in step.
    ///
    /// Without a `full_url` the entry gets a fresh `urn:uuid:` identity so that
    /// other entries can reference it inside a transaction.
    pub fn add_entry(&mut self, resource: impl Into<Resource>, full_url: Option<String>) {
        let full_url =
            full_url.unwrap_or_else(|| format!("urn:uuid:{}", uuid::Uuid::new_v4()));
        self.entry.push(BundleEntry {
            full_url: Some(full_url),
            resource: Some(resource.into()),
            ..Default::default()
        });

        self.total = Some(match self.total {
            Some(total) => total.saturating_add(1),
            None => u32::try_from(self.entry.len()).unwrap_or(u32::MAX),
        });
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|entry| entry.resource.as_ref())
    }

    pub fn resources_of_type<'b, 't>(
        &'b self,
        resource_type: &'t str,
    ) -> impl Iterator<Item = &'b Resource> + use<'b, 't> {
        self.resources()
            .filter(move |resource| resource.resource_type() == resource_type)
    }

    pub fn find_resource(&self, resource_type: &str, id: &str) -> Option<&Resource> {
        self.resources_of_type(resource_type)
            .find(|resource| resource.id() == Some(id))
    }

    /// Resolves a reference against the entries: `fullUrl` first, then `Type/id`.
    pub fn resolve_reference(&self, reference: &str) -> Option<&Resource> {
        if reference.is_empty() {
            return None;
        }

        if let Some(resource) = self
            .entry
            .iter()
            .find(|entry| entry.full_url.as_deref() == Some(reference))
            .and_then(|entry| entry.resource.as_ref())
        {
            return Some(resource);
        }

        match ReferenceTarget::parse(reference).ok()? {
            ReferenceTarget::Relative {
                resource_type, id, ..
            } => self.find_resource(&resource_type, &id),
            ReferenceTarget::Absolute(url) => {
                let mut segments = url.path_segments()?.rev();
                let id = segments.next()?;
                let resource_type = segments.next()?;
                self.find_resource(resource_type, id)
            }
            ReferenceTarget::Contained(_) => None,
        }
    }

    /// Distinct resource types present, sorted.
    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.resources().map(Resource::resource_type).collect();
        types.sort_unstable();
        types.dedup();
        types
    }

    pub fn count_by_type(&self, resource_type: &str) -> usize {
        self.resources_of_type(resource_type).count()
    }

    /// Entry count per resource type.
    pub fn type_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for resource in self.resources() {
            *counts.entry(resource.resource_type()).or_insert(0) += 1;
        }
        counts
    }

    pub fn link(&self, relation: &str) -> Option<&str> {
        self.link
            .iter()
            .find(|link| link.relation == relation)
            .map(|link| link.url.as_str())
    }
}

fhir_structure! {
    /// Outcome of an operation: errors, warnings and information for a user.
    domain_resource OperationOutcome {
        issue: repeated OperationOutcomeIssue = "issue" [summary],
    }
}

fhir_structure! {
    backbone OperationOutcomeIssue {
        severity: required Code = "severity" [summary],
        code: required Code = "code" [summary],
        details: optional CodeableConcept = "details" [summary],
        diagnostics: optional String = "diagnostics" [summary],
        location: repeated String = "location" [summary],
        expression: repeated String = "expression" [summary],
    }
}

impl OperationOutcomeIssue {
    pub fn new(severity: &str, code: &str) -> Self {
        Self {
            severity: severity.to_string(),
            code: code.to_string(),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity.as_str(), "fatal" | "error")
    }
}

impl OperationOutcome {
    /// Reports a codec failure as a single-issue outcome.
    pub fn from_error(error: &FhirCodecError) -> Self {
        let code = match error {
            FhirCodecError::MalformedPayload { .. }
            | FhirCodecError::AmbiguousChoice { .. }
            | FhirCodecError::UnknownField { .. } => "structure",
            FhirCodecError::MissingDiscriminator { .. }
            | FhirCodecError::MissingRequiredField { .. } => "required",
            FhirCodecError::UnknownVariant { .. } => "not-supported",
            FhirCodecError::UnknownChoiceAlternative { .. }
            | FhirCodecError::InvalidReference { .. } => "value",
            FhirCodecError::ResourceTypeMismatch { .. } => "invalid",
            FhirCodecError::Registration { .. } | FhirCodecError::Serialization(_) => "exception",
        };

        let mut issue = OperationOutcomeIssue::new("error", code);
        issue.diagnostics = Some(error.to_string());
        issue.expression = error.path().map(str::to_string).into_iter().collect();

        Self {
            issue: vec![issue],
            ..Default::default()
        }
    }

    pub fn from_issues(issues: &[DecodeIssue]) -> Self {
        let issue = issues
            .iter()
            .map(|found| {
                let severity = match found.severity {
                    IssueSeverity::Error => "error",
                    IssueSeverity::Warning => "warning",
                    IssueSeverity::Information => "information",
                };
                let mut issue = OperationOutcomeIssue::new(severity, &found.code);
                issue.diagnostics = Some(found.message.clone());
                if !found.path.is_empty() {
                    issue.expression.push(found.path.clone());
                }
                issue
            })
            .collect();

        Self {
            issue,
            ..Default::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        self.issue.iter().any(OperationOutcomeIssue::is_error)
    }
}

fhir_structure! {
    /// Operation inputs and outputs. Not persisted on its own.
    resource Parameters {
        parameter: repeated ParametersParameter = "parameter" [summary],
    }
}

fhir_structure! {
    backbone ParametersParameter {
        name: required String = "name" [summary],
        value: choice ExtensionValue = "value" [summary],
        resource: optional Resource = "resource" [summary],
        part: repeated ParametersParameter = "part" [summary],
    }
}

impl ParametersParameter {
    pub fn with_value(name: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn with_resource(name: impl Into<String>, resource: impl Into<Resource>) -> Self {
        Self {
            name: name.into(),
            resource: Some(resource.into()),
            ..Default::default()
        }
    }
}

impl Parameters {
    pub fn get(&self, name: &str) -> Option<&ParametersParameter> {
        self.parameter.iter().find(|parameter| parameter.name == name)
    }

    pub fn get_all<'p>(&'p self, name: &'p str) -> impl Iterator<Item = &'p ParametersParameter> {
        self.parameter
            .iter()
            .filter(move |parameter| parameter.name == name)
    }
}
