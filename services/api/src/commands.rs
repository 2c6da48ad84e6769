use crate::infra::{classification_engine, quote_service, OfflineSource};
use clap::Args;
use part_pricing::config::AppConfig;
use part_pricing::error::AppError;
use part_pricing::pricing::{
    encode_training_frame, map_attributes, EncodeOptions, ErpPartClient, QuoteError,
    QuoteOutcome, RawAttributes,
};
use part_pricing::telemetry;
use serde::Serialize;
use serde_json::json;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Part code to look up
    #[arg(long)]
    pub(crate) parte: String,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// JSON file holding one raw part record
    #[arg(long)]
    pub(crate) input: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON file holding one raw part record
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Part code to report; defaults to the code inside the record
    #[arg(long)]
    pub(crate) parte: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct EncodeArgs {
    /// Raw training export (CSV)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination for the encoded frame (CSV)
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Keep the first level of every categorical column
    #[arg(long)]
    pub(crate) keep_first: bool,
}

fn prepare() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_record(path: &Path) -> Result<RawAttributes, AppError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub(crate) async fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let config = prepare()?;
    let client = ErpPartClient::new(&config.source)?;
    let service = quote_service(&config, client)?;

    match service.quote(&args.parte).await? {
        QuoteOutcome::Quoted(quote) => print_json(&quote),
        QuoteOutcome::NoData => print_json(&json!({ "status": "no data" })),
    }
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let config = prepare()?;
    let engine = classification_engine(&config)?;
    let raw = read_record(&args.input)?;

    let record = engine
        .classify(map_attributes(&raw))
        .map_err(QuoteError::from)?;
    print_json(&json!({
        "rules": config.rules.variant.label(),
        "classified_record": record.to_map(),
    }))
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = prepare()?;
    let service = quote_service(&config, OfflineSource)?;
    let raw = read_record(&args.input)?;

    let quote = service.evaluate(args.parte, &raw)?;
    print_json(&quote)
}

pub(crate) fn run_encode(args: EncodeArgs) -> Result<(), AppError> {
    prepare()?;
    let options = EncodeOptions {
        drop_first: !args.keep_first,
        ..EncodeOptions::default()
    };

    let reader = BufReader::new(File::open(&args.input)?);
    let writer = BufWriter::new(File::create(&args.output)?);
    let summary = encode_training_frame(reader, writer, &options)?;

    print_json(&json!({
        "rows": summary.rows,
        "output": args.output.display().to_string(),
        "feature_columns": summary.feature_columns,
    }))
}
