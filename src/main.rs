use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use trigger_guard::adapters::{
    InMemorySourceRegistry, InMemoryTriggerCache, MockSynthesizer, SystemClock, YamlPatternLoader,
};
use trigger_guard::application::{
    GenerateTriggersCommand, GenerateTriggersHandler, RouteSignalsCommand, RouteSignalsHandler, TriggerPipeline,
};
use trigger_guard::config::{AppConfig, TelemetryConfig};
use trigger_guard::domain::foundation::DomainError;
use trigger_guard::domain::routing::{ProfileRouter, SignalFilter};
use trigger_guard::domain::signal::{ConfidenceLevel, ProfileType, RawSignal, SignalCategory};
use trigger_guard::domain::trigger::parse_candidates;
use trigger_guard::domain::validation::{
    BuyerProductFitValidator, JourneyStageClassifier, OutputValidator, ValueProposition,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(
    name = "trigger-guard",
    about = "Route buyer signals and guard synthesized buying triggers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Route a JSON array of raw signals for a profile and print the top-N
    Route {
        #[arg(long)]
        profile: ProfileType,

        /// JSON file holding an array of raw signals
        #[arg(long)]
        signals: PathBuf,

        /// Defaults to `routing.top_n`
        #[arg(long)]
        top_n: Option<usize>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Check a recorded synthesizer response against the output guardrails
    Validate {
        /// Raw synthesizer response
        #[arg(long)]
        response: PathBuf,

        /// Number of samples the response was produced from
        #[arg(long)]
        samples: usize,
    },

    /// Run the full pipeline, replaying a recorded synthesizer response
    Generate {
        #[arg(long)]
        profile_id: String,

        #[arg(long)]
        profile: ProfileType,

        #[arg(long)]
        segment: Option<String>,

        #[arg(long)]
        signals: PathBuf,

        /// JSON value proposition of the brand the triggers are for
        #[arg(long)]
        uvp: PathBuf,

        /// Raw synthesizer response to replay
        #[arg(long)]
        response: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long, value_parser = parse_confidence)]
    min_confidence: Option<ConfidenceLevel>,

    /// Repeatable
    #[arg(long = "category", value_parser = parse_category)]
    categories: Vec<SignalCategory>,

    /// Repeatable; overrides the profile's regions
    #[arg(long = "region")]
    regions: Vec<String>,
}

impl FilterArgs {
    fn into_filter(self) -> SignalFilter {
        let mut filter = SignalFilter::default()
            .with_categories(self.categories)
            .with_regions(self.regions);
        if let Some(level) = self.min_confidence {
            filter = filter.with_min_confidence(level);
        }
        filter
    }
}

fn parse_confidence(raw: &str) -> Result<ConfidenceLevel, String> {
    match raw.trim().to_lowercase().as_str() {
        "low" => Ok(ConfidenceLevel::Low),
        "medium" => Ok(ConfidenceLevel::Medium),
        "high" => Ok(ConfidenceLevel::High),
        other => Err(format!("unknown confidence level '{}'", other)),
    }
}

fn parse_category(raw: &str) -> Result<SignalCategory, String> {
    SignalCategory::parse(raw).ok_or_else(|| format!("unknown category '{}'", raw))
}

#[tokio::main]
async fn main() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load_validated()?;
    init_tracing(&config.telemetry);

    let loaded = YamlPatternLoader::from_optional(config.routing.patterns_path.as_deref())
        .load()
        .await?;
    let journey = JourneyStageClassifier::new(loaded.patterns.journey.clone());
    let router = Arc::new(ProfileRouter::new(Arc::new(loaded.catalog), loaded.patterns));

    match cli.command {
        Command::Route {
            profile,
            signals,
            top_n,
            filter,
        } => {
            let signals: Vec<RawSignal> = read_json(&signals).await?;
            let handler = RouteSignalsHandler::new(router, Arc::new(SystemClock)).with_top_n(config.routing.top_n);
            let result = handler.handle(RouteSignalsCommand {
                profile_type: profile,
                signals,
                filter: filter.into_filter(),
                top_n,
            });
            print_json(&result)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Validate { response, samples } => {
            let raw = tokio::fs::read_to_string(&response).await?;
            let validator = OutputValidator::new();
            let output = validator.validate(&raw);
            let triggers: Vec<_> = parse_candidates(&raw)
                .unwrap_or_default()
                .iter()
                .map(|value| validator.validate_trigger(value, samples))
                .collect();
            let valid = output.is_valid && triggers.iter().all(|t| t.is_valid);
            print_json(&json!({ "valid": valid, "output": output, "triggers": triggers }))?;
            Ok(if valid { ExitCode::SUCCESS } else { ExitCode::from(2) })
        }

        Command::Generate {
            profile_id,
            profile,
            segment,
            signals,
            uvp,
            response,
            filter,
        } => {
            let signals: Vec<RawSignal> = read_json(&signals).await?;
            let uvp: ValueProposition = read_json(&uvp).await?;
            let raw = tokio::fs::read_to_string(&response).await?;

            let pipeline = TriggerPipeline::new(
                router,
                Arc::new(InMemorySourceRegistry::new()),
                Arc::new(MockSynthesizer::new().with_response(raw)),
                journey,
                Arc::new(SystemClock),
            )
            .with_fit_validator(BuyerProductFitValidator::new(config.validation.fit_threshold))
            .with_max_batch_size(config.routing.max_batch_size);
            let handler = GenerateTriggersHandler::new(
                Arc::new(pipeline),
                InMemoryTriggerCache::new(config.cache.settings()),
            );

            let outcome = handler
                .handle(GenerateTriggersCommand {
                    profile_id,
                    profile_type: profile,
                    segment,
                    filter: filter.into_filter(),
                    signals,
                    uvp,
                })
                .await
                .map_err(|e| {
                    error!(code = %e.code(), error = %e, "Trigger generation failed");
                    e
                })?;
            for rejection in &outcome.rejections {
                warn!(error = %DomainError::from(rejection), "Trigger rejected");
            }
            info!(
                accepted = outcome.triggers.len(),
                rejected = outcome.rejections.len(),
                "Generation finished"
            );
            print_json(&outcome)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(telemetry: &TelemetryConfig) {
    use tracing_subscriber::fmt;

    let registry = tracing_subscriber::registry().with(telemetry.env_filter());
    let _ = if telemetry.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()
    };
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&raw).map_err(|e| format!("failed to parse {}: {}", path.display(), e))?)
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
