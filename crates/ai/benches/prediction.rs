use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use noshow_ai::{Artifact, ArtifactBundle, FixedBundle, PredictionService};
use noshow_core::RawAppointment;
use noshow_features::{FeatureCodec, NeighbourhoodVocabulary};

fn record(appointment: &str) -> RawAppointment {
    serde_json::from_value(json!({
        "gender": "M",
        "age": 52,
        "neighbourhood": "JARDIM CAMBURI",
        "scholarship": 0,
        "hipertension": 1,
        "diabetes": 1,
        "alcoholism": 0,
        "handcap": 0,
        "sms_received": 1,
        "scheduledday": "2016-04-29T18:38:08Z",
        "appointmentday": appointment,
    }))
    .unwrap()
}

fn bench_prediction(c: &mut Criterion) {
    let vocabulary = NeighbourhoodVocabulary::fit(["CENTRO", "JARDIM CAMBURI", "MARUÍPE"]);
    let service = PredictionService::new(FixedBundle::new(ArtifactBundle::DualHorizon {
        same_day: Some(Artifact::constant("same_day", 0.05)),
        future: Some(Artifact::constant("future", 0.3)),
        vocabulary: vocabulary.clone(),
    }));
    let codec = FeatureCodec::new(vocabulary);
    let future = record("2016-05-10T00:00:00Z");

    c.bench_function("encode", |b| b.iter(|| codec.encode(black_box(&future)).unwrap()));
    c.bench_function("predict_future", |b| {
        b.iter(|| service.predict(black_box(&future)).unwrap())
    });
}

criterion_group!(benches, bench_prediction);
criterion_main!(benches);
