mod common;

use common::*;
use octofhir_fhircodec::model::*;
use octofhir_fhircodec::*;
use serde_json::json;

fn searchset_payload() -> serde_json::Value {
    json!({
        "resourceType": "Bundle",
        "id": "search-1",
        "type": "searchset",
        "total": 3,
        "link": [
            { "relation": "self", "url": "http://example.org/fhir/Observation?subject=p1" },
            { "relation": "next", "url": "http://example.org/fhir/Observation?subject=p1&page=2" }
        ],
        "entry": [
            {
                "fullUrl": "http://example.org/fhir/Patient/p1",
                "resource": patient_payload(),
                "search": { "mode": "include" }
            },
            {
                "fullUrl": "http://example.org/fhir/Observation/bp",
                "resource": observation_payload(),
                "search": { "mode": "match", "score": 1.0 }
            },
            {
                "fullUrl": "http://example.org/fhir/Condition/c1",
                "resource": condition_payload(),
                "search": { "mode": "match" }
            }
        ]
    })
}

#[test]
fn test_bundle_entries_dispatch_per_resource() {
    let bundle = Bundle::try_from(decode_json(&searchset_payload()).unwrap()).unwrap();

    assert_eq!(bundle.type_, "searchset");
    assert_eq!(bundle.total, Some(3));
    assert_eq!(bundle.entry.len(), 3);
    assert!(matches!(bundle.entry[0].resource, Some(Resource::Patient(_))));
    assert!(matches!(bundle.entry[1].resource, Some(Resource::Observation(_))));
    assert!(matches!(bundle.entry[2].resource, Some(Resource::Condition(_))));

    assert_eq!(bundle.resource_types(), vec!["Condition", "Observation", "Patient"]);
    assert_eq!(bundle.count_by_type("Observation"), 1);
    assert_eq!(
        bundle.link("next"),
        Some("http://example.org/fhir/Observation?subject=p1&page=2")
    );
}

#[test]
fn test_bundle_round_trip() {
    let payload = searchset_payload();
    assert_eq!(round_trip(&payload), payload);
}

#[test]
fn test_resolve_reference_inside_bundle() {
    let bundle = Bundle::try_from(decode_json(&searchset_payload()).unwrap()).unwrap();
    let observation = bundle
        .resources_of_type("Observation")
        .next()
        .and_then(|resource| match resource {
            Resource::Observation(observation) => Some(observation),
            _ => None,
        })
        .unwrap();

    let subject = observation.subject.as_ref().unwrap().reference.as_deref().unwrap();
    let patient = bundle.resolve_reference(subject).unwrap();
    assert_eq!(patient.resource_type(), "Patient");
    assert_eq!(patient.id(), Some("p1"));

    assert!(bundle.resolve_reference("http://example.org/fhir/Condition/c1").is_some());
    assert!(bundle.resolve_reference("Encounter/e1").is_none());
}

#[test]
fn test_find_resource_outlives_lookup_keys() {
    let bundle = Bundle::try_from(decode_json(&searchset_payload()).unwrap()).unwrap();

    // Lookup keys built on the fly; the result borrows only from the bundle
    let found = {
        let resource_type = String::from("Condition");
        let id = format!("c{}", 1);
        bundle.find_resource(&resource_type, &id)
    };
    assert_eq!(found.and_then(Resource::id), Some("c1"));

    let observations: Vec<&Resource> = {
        let resource_type = "Observation".to_string();
        bundle.resources_of_type(&resource_type).collect()
    };
    assert_eq!(observations.len(), 1);
    assert!(bundle.find_resource("Patient", "missing").is_none());
}

#[test]
fn test_entry_error_paths_include_index() {
    let mut payload = searchset_payload();
    payload["entry"][2]["resource"]["onsetAge"] = json!({"value": 40});

    let err = decode_json(&payload).unwrap_err();
    match err {
        FhirCodecError::AmbiguousChoice { path, suffixes, .. } => {
            assert_eq!(path, "Bundle.entry[2].resource");
            assert_eq!(suffixes, vec!["Age", "DateTime"]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let mut payload = searchset_payload();
    payload["entry"][1]["resource"]["resourceType"] = json!("Specimen");
    let err = decode_json(&payload).unwrap_err();
    assert!(matches!(
        err,
        FhirCodecError::UnknownVariant { ref path, .. }
            if path == "Bundle.entry[1].resource.resourceType"
    ));
}

#[test]
fn test_build_transaction() {
    let mut bundle = Bundle::transaction();
    let patient = Patient {
        name: vec![HumanName {
            family: Some("Begum".to_string()),
            given: vec!["Nasima".to_string()],
            ..Default::default()
        }],
        ..Default::default()
    };
    bundle.add_entry(patient, None);
    bundle.entry[0].request = Some(BundleEntryRequest {
        method: "POST".to_string(),
        url: "Patient".to_string(),
        ..Default::default()
    });

    let patient_url = bundle.entry[0].full_url.clone().unwrap();
    bundle.add_entry(
        Condition {
            subject: Reference::new(patient_url.clone()),
            code: Some(CodeableConcept::from_text("Hypertension")),
            ..Default::default()
        },
        None,
    );
    assert_eq!(bundle.total, Some(2));

    let bytes = encode_resource(&bundle.clone().into()).unwrap();
    let decoded: Bundle = decode_resource_as(&bytes).unwrap();
    assert_eq!(decoded, bundle);
    assert_eq!(
        decoded.resolve_reference(&patient_url).map(Resource::resource_type),
        Some("Patient")
    );
}

#[test]
fn test_response_outcome_is_a_resource() {
    let payload = json!({
        "resourceType": "Bundle",
        "type": "transaction-response",
        "entry": [{
            "response": {
                "status": "400 Bad Request",
                "outcome": {
                    "resourceType": "OperationOutcome",
                    "issue": [{ "severity": "error", "code": "required", "diagnostics": "Patient.name missing" }]
                }
            }
        }]
    });
    let bundle = Bundle::try_from(decode_json(&payload).unwrap()).unwrap();
    let outcome = bundle.entry[0]
        .response
        .as_ref()
        .and_then(|response| response.outcome.as_ref())
        .unwrap();
    match outcome {
        Resource::OperationOutcome(outcome) => assert!(outcome.has_errors()),
        other => panic!("unexpected outcome: {}", other.resource_type()),
    }
    assert_eq!(round_trip(&payload), payload);
}

#[test]
fn test_parameters_carry_values_and_resources() {
    let payload = json!({
        "resourceType": "Parameters",
        "parameter": [
            { "name": "count", "valueInteger": 10 },
            { "name": "patient", "resource": { "resourceType": "Patient", "id": "p9" } },
            { "name": "range", "part": [
                { "name": "start", "valueDate": "2024-01-01" },
                { "name": "end", "valueDate": "2024-12-31" }
            ]}
        ]
    });
    let parameters = Parameters::try_from(decode_json(&payload).unwrap()).unwrap();

    assert!(matches!(
        parameters.get("count").and_then(|p| p.value.as_ref()),
        Some(ExtensionValue::Integer(10))
    ));
    assert_eq!(
        parameters.get("patient").and_then(|p| p.resource.as_ref()).and_then(Resource::id),
        Some("p9")
    );
    assert_eq!(parameters.get("range").unwrap().part.len(), 2);
    assert_eq!(round_trip(&payload), payload);
}

#[test]
fn test_outcome_from_decode_failure() {
    let err = decode_json(&json!({"resourceType": "Basic"})).unwrap_err();
    let outcome = OperationOutcome::from_error(&err);

    assert_eq!(outcome.issue[0].code, "required");
    assert_eq!(outcome.issue[0].expression, vec!["Basic.code"]);

    // The outcome itself is an encodable resource
    let value = ResourceEncoder::new()
        .encode_to_value(&outcome.into())
        .unwrap();
    assert_eq!(value["resourceType"], json!("OperationOutcome"));
    assert_eq!(value["issue"][0]["severity"], json!("error"));
}
