mod common;

use common::*;
use octofhir_fhircodec::model::{Age, Condition, OnsetChoice, Range, Reference};
use octofhir_fhircodec::primitives::{Date, DateTime, Precision};
use octofhir_fhircodec::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

fn onset_strategy() -> impl Strategy<Value = OnsetChoice> {
    prop_oneof![
        (1900u32..2100, 1u32..13, 1u32..29).prop_map(|(year, month, day)| {
            OnsetChoice::DateTime(
                DateTime::parse(&format!("{year:04}-{month:02}-{day:02}")).unwrap(),
            )
        }),
        (0i64..150, 0u32..3).prop_map(|(value, scale)| {
            OnsetChoice::Age(Age {
                value: Some(Decimal::new(value * 10i64.pow(scale), scale)),
                unit: Some("a".to_string()),
                ..Default::default()
            })
        }),
        (0i64..50, 50i64..100).prop_map(|(low, high)| {
            OnsetChoice::Range(Range {
                low: Some(octofhir_fhircodec::model::Quantity {
                    value: Some(Decimal::from(low)),
                    ..Default::default()
                }),
                high: Some(octofhir_fhircodec::model::Quantity {
                    value: Some(Decimal::from(high)),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }),
        "[a-zA-Z ]{1,24}".prop_map(OnsetChoice::String),
    ]
}

proptest! {
    #[test]
    fn prop_choice_suffix_fidelity(onset in onset_strategy()) {
        let suffix = onset.suffix();
        let condition = Condition {
            subject: Reference::to("Patient", "p1"),
            onset: Some(onset),
            ..Default::default()
        };

        let bytes = encode_resource(&condition.clone().into()).unwrap();
        let wire: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let object = wire.as_object().unwrap();

        let onset_keys: Vec<&String> = object.keys().filter(|key| key.starts_with("onset")).collect();
        prop_assert_eq!(onset_keys.len(), 1);
        prop_assert_eq!(onset_keys[0].as_str(), format!("onset{suffix}"));

        let decoded: Condition = decode_resource_as(&bytes).unwrap();
        prop_assert_eq!(decoded, condition);
    }

    #[test]
    fn prop_valid_dates_parse_with_precision(
        year in 1000u32..9999,
        month in 1u32..13,
        day in 1u32..29
    ) {
        let year_only = Date::parse(&format!("{year}")).unwrap();
        prop_assert_eq!(year_only.precision(), Precision::Year);

        let month_only = Date::parse(&format!("{year}-{month:02}")).unwrap();
        prop_assert_eq!(month_only.precision(), Precision::Month);

        let full = format!("{year}-{month:02}-{day:02}");
        let date = Date::parse(&full).unwrap();
        prop_assert_eq!(date.precision(), Precision::Day);
        prop_assert_eq!(date.as_str(), full.as_str());
        prop_assert!(date.to_naive_date().is_some());
    }

    #[test]
    fn prop_out_of_range_months_rejected(year in 1000u32..9999, month in 13u32..100) {
        let text = format!("{year}-{month}");
        let rejected = Date::parse(&text).is_err();
        prop_assert!(rejected);
    }

    #[test]
    fn prop_unknown_suffixes_rejected(suffix in "[A-Z][a-z]{2,12}") {
        prop_assume!(!OnsetChoice::permits(&suffix));
        let key = format!("onset{suffix}");
        let payload = json!({
            "resourceType": "Condition",
            "subject": {"reference": "Patient/p1"},
            key: "2020"
        });
        let err = decode_json(&payload).unwrap_err();
        let is_unknown_alternative = matches!(err, FhirCodecError::UnknownChoiceAlternative { .. });
        prop_assert!(is_unknown_alternative);
    }
}
