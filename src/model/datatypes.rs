//! Complex datatypes and the choice sets built from them.

use rust_decimal::Decimal;
use url::Url as ParsedUrl;

use crate::error::{FhirCodecError, Result};
use crate::primitives::{
    Base64Binary, Canonical, Code, Date, DateTime, Id, Instant, Markdown, Oid, Time, Uri, Url,
    Uuid,
};
use crate::{fhir_choice, fhir_structure};

fhir_structure! {
    /// An out-of-schema (url, value) pair. Extensions nest: an entry may carry
    /// further extensions instead of, or besides, a value.
    element Extension {
        url: required Uri = "url",
        value: choice ExtensionValue = "value",
    }
}

fhir_choice! {
    /// Values an extension or a `Parameters` parameter may carry.
    ExtensionValue {
        Base64Binary(Base64Binary) = "Base64Binary",
        Boolean(bool) = "Boolean",
        Canonical(Canonical) = "Canonical",
        Code(Code) = "Code",
        Date(Date) = "Date",
        DateTime(DateTime) = "DateTime",
        Decimal(Decimal) = "Decimal",
        Id(Id) = "Id",
        Instant(Instant) = "Instant",
        Integer(i32) = "Integer",
        Markdown(Markdown) = "Markdown",
        Oid(Oid) = "Oid",
        PositiveInt(u32) = "PositiveInt",
        String(String) = "String",
        Time(Time) = "Time",
        UnsignedInt(u32) = "UnsignedInt",
        Uri(Uri) = "Uri",
        Url(Url) = "Url",
        Uuid(Uuid) = "Uuid",
        Address(Address) = "Address",
        Age(Age) = "Age",
        Annotation(Annotation) = "Annotation",
        Attachment(Attachment) = "Attachment",
        CodeableConcept(CodeableConcept) = "CodeableConcept",
        Coding(Coding) = "Coding",
        ContactPoint(ContactPoint) = "ContactPoint",
        Duration(Duration) = "Duration",
        HumanName(HumanName) = "HumanName",
        Identifier(Identifier) = "Identifier",
        Period(Period) = "Period",
        Quantity(Quantity) = "Quantity",
        Range(Range) = "Range",
        Ratio(Ratio) = "Ratio",
        Reference(Reference) = "Reference",
        Timing(Timing) = "Timing",
        Dosage(Dosage) = "Dosage",
        Meta(Meta) = "Meta",
    }
}

impl Extension {
    pub fn new(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            value: Some(value),
            ..Default::default()
        }
    }

    /// An extension that only groups nested extensions.
    pub fn complex(url: impl Into<String>, extension: Vec<Extension>) -> Self {
        Self {
            url: url.into(),
            extension,
            ..Default::default()
        }
    }

    pub fn nested(&self, url: &str) -> Option<&Extension> {
        find_extension(&self.extension, url)
    }
}

/// First extension in `extensions` with the given url.
pub fn find_extension<'e>(extensions: &'e [Extension], url: &str) -> Option<&'e Extension> {
    extensions.iter().find(|extension| extension.url == url)
}

pub fn extensions_by_url<'e>(
    extensions: &'e [Extension],
    url: &'e str,
) -> impl Iterator<Item = &'e Extension> {
    extensions.iter().filter(move |extension| extension.url == url)
}

fhir_structure! {
    element Meta {
        version_id: optional Id = "versionId",
        last_updated: optional Instant = "lastUpdated",
        source: optional Uri = "source",
        profile: repeated Canonical = "profile",
        security: repeated Coding = "security",
        tag: repeated Coding = "tag",
    }
}

fhir_structure! {
    element Narrative {
        status: required Code = "status",
        div: required String = "div",
    }
}

fhir_structure! {
    element Coding {
        system: optional Uri = "system",
        version: optional String = "version",
        code: optional Code = "code",
        display: optional String = "display",
        user_selected: optional bool = "userSelected",
    }
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

fhir_structure! {
    element CodeableConcept {
        coding: repeated Coding = "coding",
        text: optional String = "text",
    }
}

impl CodeableConcept {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            ..Default::default()
        }
    }

    pub fn has_coding(&self, system: &str, code: &str) -> bool {
        self.coding.iter().any(|coding| {
            coding.system.as_deref() == Some(system) && coding.code.as_deref() == Some(code)
        })
    }
}

fhir_structure! {
    element Identifier {
        use_: optional Code = "use",
        type_: optional CodeableConcept = "type",
        system: optional Uri = "system",
        value: optional String = "value",
        period: optional Period = "period",
        assigner: optional Box<Reference> = "assigner",
    }
}

fhir_structure! {
    element Reference {
        reference: optional String = "reference",
        type_: optional Uri = "type",
        identifier: optional Identifier = "identifier",
        display: optional String = "display",
    }
}

/// What a literal reference string points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget {
    /// `#id`: a resource in the enclosing resource's `contained` list.
    Contained(String),
    /// `Type/id` or `Type/id/_history/version`.
    Relative {
        resource_type: String,
        id: String,
        version: Option<String>,
    },
    Absolute(ParsedUrl),
}

impl ReferenceTarget {
    pub fn parse(reference: &str) -> Result<Self> {
        if let Some(id) = reference.strip_prefix('#') {
            if id.is_empty() {
                return Err(FhirCodecError::invalid_reference(
                    reference,
                    "contained reference has no id",
                ));
            }
            return Ok(Self::Contained(id.to_string()));
        }

        if reference.contains("://") || reference.starts_with("urn:") {
            return ParsedUrl::parse(reference)
                .map(Self::Absolute)
                .map_err(|err| FhirCodecError::invalid_reference(reference, err.to_string()));
        }

        let segments: Vec<&str> = reference.split('/').collect();
        let (resource_type, id, version) = match segments.as_slice() {
            [resource_type, id] => (*resource_type, *id, None),
            [resource_type, id, "_history", version] if !version.is_empty() => {
                (*resource_type, *id, Some(version.to_string()))
            }
            _ => {
                return Err(FhirCodecError::invalid_reference(
                    reference,
                    "expected `Type/id` or `Type/id/_history/version`",
                ));
            }
        };

        if !is_resource_type_name(resource_type) {
            return Err(FhirCodecError::invalid_reference(
                reference,
                format!("`{resource_type}` is not a resource type name"),
            ));
        }
        if !is_logical_id(id) {
            return Err(FhirCodecError::invalid_reference(
                reference,
                format!("`{id}` is not a valid id"),
            ));
        }

        Ok(Self::Relative {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
            version,
        })
    }
}

fn is_resource_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

fn is_logical_id(id: &str) -> bool {
    (1..=64).contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

impl Reference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    /// A relative `Type/id` reference.
    pub fn to(resource_type: &str, id: &str) -> Self {
        Self::new(format!("{resource_type}/{id}"))
    }

    /// Classifies the literal reference; `None` if this reference only has an identifier or display.
    pub fn target(&self) -> Result<Option<ReferenceTarget>> {
        self.reference
            .as_deref()
            .map(ReferenceTarget::parse)
            .transpose()
    }
}

fhir_structure! {
    element Period {
        start: optional DateTime = "start",
        end: optional DateTime = "end",
    }
}

fhir_structure! {
    element Quantity {
        value: optional Decimal = "value",
        comparator: optional Code = "comparator",
        unit: optional String = "unit",
        system: optional Uri = "system",
        code: optional Code = "code",
    }
}

impl Quantity {
    pub fn ucum(value: Decimal, code: &str) -> Self {
        Self {
            value: Some(value),
            unit: Some(code.to_string()),
            system: Some("http://unitsofmeasure.org".to_string()),
            code: Some(code.to_string()),
            ..Default::default()
        }
    }
}

fhir_structure! {
    element Age {
        value: optional Decimal = "value",
        comparator: optional Code = "comparator",
        unit: optional String = "unit",
        system: optional Uri = "system",
        code: optional Code = "code",
    }
}

fhir_structure! {
    element Duration {
        value: optional Decimal = "value",
        comparator: optional Code = "comparator",
        unit: optional String = "unit",
        system: optional Uri = "system",
        code: optional Code = "code",
    }
}

fhir_structure! {
    element Range {
        low: optional Quantity = "low",
        high: optional Quantity = "high",
    }
}

fhir_structure! {
    element Ratio {
        numerator: optional Quantity = "numerator",
        denominator: optional Quantity = "denominator",
    }
}

fhir_structure! {
    element Annotation {
        author: choice AnnotationAuthor = "author",
        time: optional DateTime = "time",
        text: required Markdown = "text",
    }
}

fhir_choice! {
    AnnotationAuthor {
        Reference(Reference) = "Reference",
        String(String) = "String",
    }
}

fhir_structure! {
    element HumanName {
        use_: optional Code = "use",
        text: optional String = "text",
        family: optional String = "family",
        given: repeated String = "given",
        prefix: repeated String = "prefix",
        suffix: repeated String = "suffix",
        period: optional Period = "period",
    }
}

fhir_structure! {
    element Address {
        use_: optional Code = "use",
        type_: optional Code = "type",
        text: optional String = "text",
        line: repeated String = "line",
        city: optional String = "city",
        district: optional String = "district",
        state: optional String = "state",
        postal_code: optional String = "postalCode",
        country: optional String = "country",
        period: optional Period = "period",
    }
}

fhir_structure! {
    element ContactPoint {
        system: optional Code = "system",
        value: optional String = "value",
        use_: optional Code = "use",
        rank: optional u32 = "rank",
        period: optional Period = "period",
    }
}

fhir_structure! {
    element Attachment {
        content_type: optional Code = "contentType",
        language: optional Code = "language",
        data: optional Base64Binary = "data",
        url: optional Url = "url",
        size: optional u32 = "size",
        hash: optional Base64Binary = "hash",
        title: optional String = "title",
        creation: optional DateTime = "creation",
    }
}

fhir_structure! {
    backbone Timing {
        event: repeated DateTime = "event",
        repeat: optional TimingRepeat = "repeat",
        code: optional CodeableConcept = "code",
    }
}

fhir_structure! {
    element TimingRepeat {
        bounds: choice TimingBounds = "bounds",
        count: optional u32 = "count",
        count_max: optional u32 = "countMax",
        duration: optional Decimal = "duration",
        duration_max: optional Decimal = "durationMax",
        duration_unit: optional Code = "durationUnit",
        frequency: optional u32 = "frequency",
        frequency_max: optional u32 = "frequencyMax",
        period: optional Decimal = "period",
        period_max: optional Decimal = "periodMax",
        period_unit: optional Code = "periodUnit",
        day_of_week: repeated Code = "dayOfWeek",
        time_of_day: repeated Time = "timeOfDay",
        when: repeated Code = "when",
        offset: optional u32 = "offset",
    }
}

fhir_choice! {
    TimingBounds {
        Duration(Duration) = "Duration",
        Range(Range) = "Range",
        Period(Period) = "Period",
    }
}

fhir_structure! {
    backbone Dosage {
        sequence: optional i32 = "sequence",
        text: optional String = "text",
        additional_instruction: repeated CodeableConcept = "additionalInstruction",
        patient_instruction: optional String = "patientInstruction",
        timing: optional Timing = "timing",
        as_needed: choice BooleanOrCodeableConcept = "asNeeded",
        site: optional CodeableConcept = "site",
        route: optional CodeableConcept = "route",
        method: optional CodeableConcept = "method",
        dose_and_rate: repeated DosageDoseAndRate = "doseAndRate",
        max_dose_per_period: optional Ratio = "maxDosePerPeriod",
        max_dose_per_administration: optional Quantity = "maxDosePerAdministration",
        max_dose_per_lifetime: optional Quantity = "maxDosePerLifetime",
    }
}

fhir_structure! {
    element DosageDoseAndRate {
        type_: optional CodeableConcept = "type",
        dose: choice DoseChoice = "dose",
        rate: choice RateChoice = "rate",
    }
}

fhir_choice! {
    BooleanOrCodeableConcept {
        Boolean(bool) = "Boolean",
        CodeableConcept(CodeableConcept) = "CodeableConcept",
    }
}

fhir_choice! {
    DoseChoice {
        Range(Range) = "Range",
        Quantity(Quantity) = "Quantity",
    }
}

fhir_choice! {
    RateChoice {
        Ratio(Ratio) = "Ratio",
        Range(Range) = "Range",
        Quantity(Quantity) = "Quantity",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FhirStructure;
    use crate::types::{ChoiceType, FieldKind};

    #[test]
    fn test_reference_targets() {
        assert_eq!(
            ReferenceTarget::parse("#med1").unwrap(),
            ReferenceTarget::Contained("med1".to_string())
        );
        assert_eq!(
            ReferenceTarget::parse("Patient/123/_history/2").unwrap(),
            ReferenceTarget::Relative {
                resource_type: "Patient".to_string(),
                id: "123".to_string(),
                version: Some("2".to_string()),
            }
        );
        assert!(matches!(
            ReferenceTarget::parse("https://example.org/fhir/Patient/1").unwrap(),
            ReferenceTarget::Absolute(_)
        ));
        assert!(matches!(
            ReferenceTarget::parse("urn:uuid:61ebe359-bfdc-4613-8bf2-c5e300945f0a").unwrap(),
            ReferenceTarget::Absolute(_)
        ));
    }

    #[test]
    fn test_invalid_references() {
        for reference in ["#", "patient/1", "Patient", "Patient/", "Patient/a b", "Patient/1/2"] {
            let err = ReferenceTarget::parse(reference).unwrap_err();
            assert!(
                matches!(err, FhirCodecError::InvalidReference { .. }),
                "{reference} should be rejected"
            );
        }
        assert_eq!(Reference::default().target().unwrap(), None);
    }

    #[test]
    fn test_schema_for_extension() {
        let schema = Extension::SCHEMA;
        assert_eq!(schema.name, "Extension");
        let value = schema.field("value").unwrap();
        assert_eq!(value.kind, FieldKind::OptionalChoice);
        assert_eq!(value.alternatives, ExtensionValue::ALTERNATIVES);
        assert_eq!(schema.field("url").unwrap().kind, FieldKind::Required);
    }

    #[test]
    fn test_find_extension() {
        let extensions = vec![
            Extension::new("http://a", ExtensionValue::Boolean(true)),
            Extension::new("http://b", ExtensionValue::String("x".to_string())),
            Extension::new("http://a", ExtensionValue::Boolean(false)),
        ];
        let found = find_extension(&extensions, "http://a").unwrap();
        assert_eq!(found.value, Some(ExtensionValue::Boolean(true)));
        assert_eq!(extensions_by_url(&extensions, "http://a").count(), 2);
        assert!(find_extension(&extensions, "http://c").is_none());
    }
}
