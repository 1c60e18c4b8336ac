use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use octofhir_fhircodec::*;
use serde_json::{Value, json};
use std::hint::black_box;

fn observation(index: usize) -> Value {
    json!({
        "resourceType": "Observation",
        "id": format!("obs-{index}"),
        "status": "final",
        "code": { "coding": [{ "system": "http://loinc.org", "code": "8867-4", "display": "Heart rate" }] },
        "subject": { "reference": format!("Patient/p{}", index % 50) },
        "effectiveDateTime": "2024-03-01T09:30:00Z",
        "valueQuantity": { "value": 60 + (index % 40), "unit": "beats/minute", "system": "http://unitsofmeasure.org", "code": "/min" },
        "extension": [{ "url": "http://example.org/device-position", "valueString": "wrist" }]
    })
}

fn create_large_bundle(entries: usize) -> Vec<u8> {
    let entry: Vec<Value> = (0..entries)
        .map(|index| {
            json!({
                "fullUrl": format!("http://example.org/fhir/Observation/obs-{index}"),
                "resource": observation(index)
            })
        })
        .collect();

    // Discriminator placed last so the peek has to scan the whole payload
    let bundle = json!({
        "type": "searchset",
        "total": entries,
        "entry": entry,
        "resourceType": "Bundle"
    });
    serde_json::to_vec(&bundle).unwrap()
}

fn bench_peek(c: &mut Criterion) {
    let mut group = c.benchmark_group("peek_resource_type");
    for entries in [10, 1_000] {
        let bytes = create_large_bundle(entries);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entries), &bytes, |b, bytes| {
            b.iter(|| black_box(peek_resource_type(bytes)).unwrap())
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let decoder = ResourceDecoder::new();
    let single = serde_json::to_vec(&observation(1)).unwrap();
    let bundle = create_large_bundle(1_000);

    c.bench_function("decode_observation", |b| {
        b.iter(|| black_box(decoder.decode(&single)).unwrap())
    });

    let mut group = c.benchmark_group("decode_bundle");
    group.throughput(Throughput::Bytes(bundle.len() as u64));
    group.sample_size(20);
    group.bench_function("1000_entries", |b| {
        b.iter(|| black_box(decoder.decode(&bundle)).unwrap())
    });
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let encoder = ResourceEncoder::new();
    let resource = decode_resource(&create_large_bundle(1_000)).unwrap();

    let mut group = c.benchmark_group("encode_bundle");
    group.sample_size(20);
    group.bench_function("1000_entries", |b| {
        b.iter(|| black_box(encoder.encode(&resource)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_peek, bench_decode, bench_encode);
criterion_main!(benches);
