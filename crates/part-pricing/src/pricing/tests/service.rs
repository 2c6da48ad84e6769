use super::common::*;
use crate::pricing::classification::ClassificationError;
use crate::pricing::increment::{IncrementDecision, IncrementRule};
use crate::pricing::model::ModelError;
use crate::pricing::service::{QuoteError, QuoteOutcome};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn quote_prices_a_known_part() {
    let sink = Arc::new(MemorySink::default());
    let (service, predictor) = service_with(
        MemorySource::with_part(KNOWN_PART, flow_pack_record()),
        0.5,
        sink.clone(),
    );

    let outcome = service.quote(KNOWN_PART).await.expect("quote succeeds");
    let quote = match outcome {
        QuoteOutcome::Quoted(quote) => quote,
        QuoteOutcome::NoData => panic!("expected a quote, got no data"),
    };

    assert_eq!(quote.parte.as_deref(), Some(KNOWN_PART));
    assert_eq!(quote.incremento, IncrementDecision::Percentage(58));
    assert_eq!(quote.increment_rule, IncrementRule::FlowPackBag);
    assert_eq!(quote.classified_record["GrupoFormato"], json!("Grupo 2"));
    assert_eq!(quote.classified_record["Impreso"], json!("SI"));
    assert_eq!(quote.classified_record["Calibre"], json!("<=100"));
    assert_eq!(quote.classified_record["GradoTroquel"], json!("GRADO ALTO"));
    assert_eq!(quote.classified_record["RowMod"], json!(""));

    let rows = predictor.seen();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values(), &[0.0, 1.0, 1.0, 1.0, 0.0, 1.0]);

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].incremento, "58%");
    assert_eq!(entries[0].prediction_display(), "0.50");
    assert_eq!(entries[0].inputs.len(), 10);
}

#[tokio::test]
async fn unknown_part_yields_no_data() {
    let (service, _) = service_with(MemorySource::default(), 0.5, Arc::new(MemorySink::default()));
    let outcome = service.quote("missing").await.expect("no error");
    assert_eq!(outcome, QuoteOutcome::NoData);
}

#[tokio::test]
async fn source_failure_yields_no_data() {
    let sink = Arc::new(MemorySink::default());
    let (service, predictor) = service_with(UnavailableSource, 0.5, sink.clone());

    let outcome = service.quote(KNOWN_PART).await.expect("no error");
    assert_eq!(outcome, QuoteOutcome::NoData);
    assert!(predictor.seen().is_empty());
    assert!(sink.entries().is_empty());
}

#[test]
fn evaluate_surfaces_missing_fields() {
    let (service, predictor) =
        service_with(MemorySource::default(), 0.5, Arc::new(MemorySink::default()));
    let mut record = flow_pack_record();
    record.remove("Part_Number02");

    match service.evaluate(None, &record) {
        Err(QuoteError::Classification(ClassificationError::MissingField { field })) => {
            assert_eq!(field, "Largo");
        }
        other => panic!("expected missing field, got {other:?}"),
    }
    assert!(predictor.seen().is_empty());
}

#[test]
fn evaluate_surfaces_conversion_errors() {
    let (service, _) = service_with(MemorySource::default(), 0.5, Arc::new(MemorySink::default()));
    let mut record = flow_pack_record();
    record.insert("Part_Number03".to_string(), json!("n/a"));

    let error = service.evaluate(None, &record).expect_err("conversion fails");
    assert!(matches!(
        error,
        QuoteError::Classification(ClassificationError::Conversion { field: "Calibre2", .. })
    ));
}

#[test]
fn evaluate_takes_the_part_code_from_the_record() {
    let (service, _) = service_with(MemorySource::default(), 1.2, Arc::new(MemorySink::default()));
    let quote = service
        .evaluate(None, &flow_pack_record())
        .expect("evaluates");
    assert_eq!(quote.parte.as_deref(), Some(KNOWN_PART));
    assert_eq!(quote.incremento, IncrementDecision::NotRequired);
}

#[test]
fn sink_failures_do_not_fail_the_quote() {
    let (service, _) = service_with(MemorySource::default(), 0.5, Arc::new(BrokenSink));
    let quote = service
        .evaluate(Some("X".to_string()), &flow_pack_record())
        .expect("quote still returned");
    assert_eq!(quote.incremento.to_string(), "58%");
}

#[test]
fn roll_records_are_marked_not_applicable() {
    let (service, _) = service_with(MemorySource::default(), 1.0, Arc::new(MemorySink::default()));
    let mut record = flow_pack_record();
    record.insert("Part_ShortChar02".to_string(), json!("ROLLO"));

    let classified = service.classify(&record).expect("classifies");
    let map = classified.to_map();
    assert_eq!(map["TipoBolsa"], json!("NO APLICA"));
    assert_eq!(map["GradoTroquel"], json!("NO APLICA"));
    assert_eq!(map["GrupoFormato"], json!("Grupo 1"));
}

#[test]
fn non_finite_predictions_are_model_errors() {
    let sink = Arc::new(MemorySink::default());
    let (service, _) = service_with(MemorySource::default(), f64::NAN, sink.clone());

    match service.evaluate(None, &flow_pack_record()) {
        Err(QuoteError::Model(ModelError::NonFinite)) => {}
        other => panic!("expected non-finite model error, got {other:?}"),
    }
    assert!(sink.entries().is_empty());
}

#[test]
fn predictions_beyond_the_markup_range_are_rejected() {
    let (service, _) = service_with(MemorySource::default(), -1e300, Arc::new(MemorySink::default()));

    let error = service
        .evaluate(None, &flow_pack_record())
        .expect_err("prediction out of range");
    assert!(matches!(error, QuoteError::Model(ModelError::OutOfRange(_))));
}
