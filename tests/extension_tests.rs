mod common;

use common::*;
use octofhir_fhircodec::model::*;
use octofhir_fhircodec::*;
use rust_decimal::Decimal;
use serde_json::json;

const SEVERITY_SOURCE: &str = "http://example.org/fhir/StructureDefinition/severity-source";
const RECORDED_BY: &str = "http://example.org/fhir/StructureDefinition/recorded-by";
const CONFIDENCE: &str = "http://example.org/fhir/StructureDefinition/confidence";

fn condition_with_code_extensions() -> serde_json::Value {
    json!({
        "resourceType": "Condition",
        "id": "c-ext",
        "code": {
            "extension": [
                { "url": SEVERITY_SOURCE, "valueCode": "clinician" },
                { "url": RECORDED_BY, "valueReference": { "reference": "Practitioner/dr1" } },
                { "url": CONFIDENCE, "valueDecimal": 0.85 }
            ],
            "text": "Asthma"
        },
        "subject": { "reference": "Patient/p1" }
    })
}

#[test]
fn test_nested_field_extensions_survive_round_trip() {
    let payload = condition_with_code_extensions();
    let first = decode_json(&payload).unwrap();

    let bytes = encode_resource(&first).unwrap();
    let second = Condition::try_from(decode_resource(&bytes).unwrap()).unwrap();

    let code = second.code.as_ref().unwrap();
    let urls: Vec<&str> = code.extension.iter().map(|ext| ext.url.as_str()).collect();
    assert_eq!(urls, vec![SEVERITY_SOURCE, RECORDED_BY, CONFIDENCE]);
    assert_eq!(Resource::from(second), first);
    assert_eq!(round_trip(&payload), payload);
}

#[test]
fn test_extension_values_are_typed() {
    let condition = Condition::try_from(decode_json(&condition_with_code_extensions()).unwrap())
        .unwrap();
    let extensions = &condition.code.as_ref().unwrap().extension;

    assert!(matches!(
        find_extension(extensions, SEVERITY_SOURCE).and_then(|ext| ext.value.as_ref()),
        Some(ExtensionValue::Code(code)) if code == "clinician"
    ));
    assert!(matches!(
        find_extension(extensions, CONFIDENCE).and_then(|ext| ext.value.as_ref()),
        Some(ExtensionValue::Decimal(value)) if *value == Decimal::new(85, 2)
    ));
    assert!(find_extension(extensions, "http://example.org/other").is_none());
}

#[test]
fn test_complex_extensions_nest() {
    let patient = Patient::try_from(decode_json(&patient_payload()).unwrap()).unwrap();
    assert_eq!(patient.extension.len(), 3);

    let race = &patient.extension[0];
    assert!(race.value.is_none());
    assert_eq!(race.extension.len(), 2);
    assert!(matches!(
        race.nested("text").and_then(|ext| ext.value.as_ref()),
        Some(ExtensionValue::String(text)) if text == "White"
    ));
    assert!(matches!(
        race.nested("ombCategory").and_then(|ext| ext.value.as_ref()),
        Some(ExtensionValue::Coding(coding)) if coding.code.as_deref() == Some("2106-3")
    ));
}

#[test]
fn test_built_extensions_encode_in_order() {
    let mut basic = Basic {
        code: CodeableConcept::from_text("note"),
        ..Default::default()
    };
    basic.extension.push(Extension::new(
        "http://example.org/a",
        ExtensionValue::Boolean(true),
    ));
    basic.extension.push(Extension::complex(
        "http://example.org/b",
        vec![Extension::new("part", ExtensionValue::Integer(3))],
    ));
    basic.extension.push(Extension::new(
        "http://example.org/c",
        ExtensionValue::Uri("urn:example:c".to_string()),
    ));

    let value = ResourceEncoder::new()
        .encode_to_value(&basic.clone().into())
        .unwrap();
    assert_eq!(
        value["extension"],
        json!([
            {"url": "http://example.org/a", "valueBoolean": true},
            {"url": "http://example.org/b", "extension": [{"url": "part", "valueInteger": 3}]},
            {"url": "http://example.org/c", "valueUri": "urn:example:c"}
        ])
    );

    let decoded: Basic = decode_resource_as(&serde_json::to_vec(&value).unwrap()).unwrap();
    assert_eq!(decoded, basic);
}

#[test]
fn test_modifier_extensions_kept_apart() {
    let payload = json!({
        "resourceType": "Basic",
        "modifierExtension": [{ "url": "http://example.org/negated", "valueBoolean": true }],
        "extension": [{ "url": "http://example.org/plain", "valueString": "x" }],
        "code": { "text": "x" }
    });
    let basic = Basic::try_from(decode_json(&payload).unwrap()).unwrap();
    assert_eq!(basic.extension.len(), 1);
    assert_eq!(basic.modifier_extension.len(), 1);
    assert_eq!(basic.modifier_extension[0].url, "http://example.org/negated");
    assert_eq!(round_trip(&payload), payload);
}

#[test]
fn test_extension_requires_url() {
    let err = decode_json(&json!({
        "resourceType": "Basic",
        "code": { "text": "x" },
        "extension": [{ "valueString": "orphan" }]
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        FhirCodecError::MissingRequiredField { ref path } if path == "Basic.extension[0].url"
    ));
}

#[test]
fn test_primitive_extensions_preserved() {
    let payload = json!({
        "resourceType": "Patient",
        "birthDate": "1970-03-30",
        "_birthDate": {
            "extension": [{
                "url": "http://hl7.org/fhir/StructureDefinition/patient-birthTime",
                "valueDateTime": "1970-03-30T14:35:45-05:00"
            }]
        }
    });
    let patient = Patient::try_from(decode_json(&payload).unwrap()).unwrap();
    assert!(patient.extra.contains_key("_birthDate"));
    assert_eq!(round_trip(&payload), payload);
}
