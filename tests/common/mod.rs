use octofhir_fhircodec::*;
use serde_json::{Value, json};

/// Routes codec events to the test output; `RUST_LOG=octofhir_fhircodec=debug` shows them.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

#[allow(dead_code)]
pub fn decode_json(value: &Value) -> Result<Resource> {
    ResourceDecoder::new().decode(&to_bytes(value))
}

#[allow(dead_code)]
pub fn decode_json_with(config: CodecConfig, value: &Value) -> Result<Decoded> {
    ResourceDecoder::with_config(config).decode_with_report(&to_bytes(value))
}

/// Decodes, re-encodes, and parses the output back into a JSON tree.
#[allow(dead_code)]
pub fn round_trip(value: &Value) -> Value {
    let resource = decode_json(value).unwrap();
    let bytes = ResourceEncoder::new().encode(&resource).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn basic_payload() -> Value {
    json!({
        "resourceType": "Basic",
        "id": "b1",
        "code": { "text": "x" }
    })
}

#[allow(dead_code)]
pub fn condition_payload() -> Value {
    json!({
        "resourceType": "Condition",
        "id": "c1",
        "clinicalStatus": {
            "coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/condition-clinical",
                "code": "active"
            }]
        },
        "code": {
            "coding": [{ "system": "http://snomed.info/sct", "code": "44054006", "display": "Diabetes" }]
        },
        "subject": { "reference": "Patient/p1" },
        "onsetDateTime": "2021-03-04T10:00:00Z",
        "abatementAge": {
            "value": 52,
            "unit": "a",
            "system": "http://unitsofmeasure.org",
            "code": "a"
        }
    })
}

#[allow(dead_code)]
pub fn observation_payload() -> Value {
    json!({
        "resourceType": "Observation",
        "id": "bp",
        "status": "final",
        "code": {
            "coding": [{ "system": "http://loinc.org", "code": "85354-9" }]
        },
        "subject": { "reference": "Patient/p1" },
        "effectivePeriod": { "start": "2024-01-01T08:00:00+01:00", "end": "2024-01-01T08:05:00+01:00" },
        "component": [
            {
                "code": { "coding": [{ "system": "http://loinc.org", "code": "8480-6" }] },
                "valueQuantity": { "value": 120.0, "unit": "mmHg", "system": "http://unitsofmeasure.org", "code": "mm[Hg]" }
            },
            {
                "code": { "coding": [{ "system": "http://loinc.org", "code": "8462-4" }] },
                "valueQuantity": { "value": 80, "unit": "mmHg", "system": "http://unitsofmeasure.org", "code": "mm[Hg]" }
            }
        ]
    })
}

#[allow(dead_code)]
pub fn patient_payload() -> Value {
    json!({
        "resourceType": "Patient",
        "id": "p1",
        "extension": [
            {
                "url": "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race",
                "extension": [
                    { "url": "ombCategory", "valueCoding": { "system": "urn:oid:2.16.840.1.113883.6.238", "code": "2106-3" } },
                    { "url": "text", "valueString": "White" }
                ]
            },
            { "url": "http://example.org/fhir/birth-weight", "valueDecimal": 3.250 },
            { "url": "http://example.org/fhir/consent-on-file", "valueBoolean": true }
        ],
        "name": [{ "family": "Rahman", "given": ["Amina", "K"] }],
        "gender": "female",
        "birthDate": "1987-06",
        "deceasedBoolean": false,
        "multipleBirthInteger": 2
    })
}
