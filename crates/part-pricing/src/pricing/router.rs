use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::RawAttributes;
use super::model::Predictor;
use super::service::{PartQuote, PartQuoteService, QuoteOutcome};
use super::sink::PredictionSink;
use super::source::PartSource;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteRequest {
    parte: String,
}

/// Router exposing part quoting, evaluation and classification.
pub fn pricing_router<S, P, L>(service: Arc<PartQuoteService<S, P, L>>) -> Router
where
    S: PartSource + 'static,
    P: Predictor + 'static,
    L: PredictionSink + 'static,
{
    Router::new()
        .route("/api/v1/parts/quote", post(quote_body_handler::<S, P, L>))
        .route("/api/v1/parts/:parte/quote", get(quote_path_handler::<S, P, L>))
        .route("/api/v1/parts/evaluate", post(evaluate_handler::<S, P, L>))
        .route("/api/v1/parts/classify", post(classify_handler::<S, P, L>))
        .with_state(service)
}

pub(crate) async fn quote_path_handler<S, P, L>(
    State(service): State<Arc<PartQuoteService<S, P, L>>>,
    Path(parte): Path<String>,
) -> Result<Response, AppError>
where
    S: PartSource + 'static,
    P: Predictor + 'static,
    L: PredictionSink + 'static,
{
    Ok(quote_response(service.quote(&parte).await?))
}

pub(crate) async fn quote_body_handler<S, P, L>(
    State(service): State<Arc<PartQuoteService<S, P, L>>>,
    Json(request): Json<QuoteRequest>,
) -> Result<Response, AppError>
where
    S: PartSource + 'static,
    P: Predictor + 'static,
    L: PredictionSink + 'static,
{
    let parte = request.parte.trim();
    if parte.is_empty() {
        let payload = json!({ "error": "parte must not be empty" });
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response());
    }
    Ok(quote_response(service.quote(parte).await?))
}

pub(crate) async fn evaluate_handler<S, P, L>(
    State(service): State<Arc<PartQuoteService<S, P, L>>>,
    Json(raw): Json<RawAttributes>,
) -> Result<Json<PartQuote>, AppError>
where
    S: PartSource + 'static,
    P: Predictor + 'static,
    L: PredictionSink + 'static,
{
    Ok(Json(service.evaluate(None, &raw)?))
}

pub(crate) async fn classify_handler<S, P, L>(
    State(service): State<Arc<PartQuoteService<S, P, L>>>,
    Json(raw): Json<RawAttributes>,
) -> Result<Json<Value>, AppError>
where
    S: PartSource + 'static,
    P: Predictor + 'static,
    L: PredictionSink + 'static,
{
    let record = service.classify(&raw)?;
    Ok(Json(json!({ "classified_record": record.to_map() })))
}

fn quote_response(outcome: QuoteOutcome) -> Response {
    match outcome {
        QuoteOutcome::Quoted(quote) => (StatusCode::OK, Json(quote)).into_response(),
        QuoteOutcome::NoData => {
            (StatusCode::NOT_FOUND, Json(json!({ "status": "no data" }))).into_response()
        }
    }
}
