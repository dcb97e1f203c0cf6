//! Predecir CLI - tabular regression inference server
//!
//! # Commands
//!
//! - `serve` - Start the prediction server (form + JSON API)
//! - `predict` - Run a single prediction from the command line
//! - `pack` - Write a `.prd` artifact from a JSON parameter file
//! - `inspect` - Show header and checksum status of an artifact
//! - `info` - Show version info

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use predecir::{
    api::{create_router, AppState},
    artifact,
    error::{PredecirError, Result},
    features::FeatureInput,
    resolve::{
        ArtifactBundle, ArtifactPaths, ArtifactSource, DEFAULT_MODEL_FALLBACK,
        DEFAULT_MODEL_PATH, DEFAULT_SCALER_FALLBACK, DEFAULT_SCALER_PATH,
    },
};

/// Predecir - serve predictions from a pre-fitted scaler/model pair
#[derive(Parser)]
#[command(name = "predecir")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Artifact locations, shared by `serve` and `predict`
#[derive(clap::Args)]
struct ArtifactArgs {
    /// Primary path to the scaler artifact
    #[arg(long, default_value = DEFAULT_SCALER_PATH)]
    scaler: PathBuf,

    /// Fallback path tried when the primary scaler is missing or empty
    #[arg(long, default_value = DEFAULT_SCALER_FALLBACK)]
    scaler_fallback: PathBuf,

    /// Primary path to the regression model artifact
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Fallback path tried when the primary model is missing or empty
    #[arg(long, default_value = DEFAULT_MODEL_FALLBACK)]
    model_fallback: PathBuf,
}

impl ArtifactArgs {
    fn into_paths(self) -> ArtifactPaths {
        ArtifactPaths {
            scaler: ArtifactSource::new(
                predecir::error::ArtifactRole::Scaler,
                self.scaler,
                self.scaler_fallback,
            ),
            model: ArtifactSource::new(
                predecir::error::ArtifactRole::Model,
                self.model,
                self.model_fallback,
            ),
        }
    }
}

/// The nine feature flags for one-shot predictions. Defaults match the
/// values the web form shows.
#[derive(clap::Args)]
struct FeatureArgs {
    /// Item weight
    #[arg(long, default_value_t = 10.0)]
    item_weight: f64,

    /// Item fat content (encoded as float)
    #[arg(long, default_value_t = 0.0)]
    item_fat_content: f64,

    /// Item visibility
    #[arg(long, default_value_t = 0.05)]
    item_visibility: f64,

    /// Item type (encoded as float)
    #[arg(long, default_value_t = 1.0)]
    item_type: f64,

    /// Item MRP (maximum retail price)
    #[arg(long, default_value_t = 100.0)]
    item_mrp: f64,

    /// Outlet establishment year (1900-2100)
    #[arg(long, default_value_t = 1999.0)]
    outlet_establishment_year: f64,

    /// Outlet size (encoded as float)
    #[arg(long, default_value_t = 1.0)]
    outlet_size: f64,

    /// Outlet location type (encoded as float)
    #[arg(long, default_value_t = 1.0)]
    outlet_location_type: f64,

    /// Outlet type (encoded as float)
    #[arg(long, default_value_t = 1.0)]
    outlet_type: f64,
}

impl FeatureArgs {
    fn into_input(self) -> FeatureInput {
        FeatureInput {
            item_weight: self.item_weight,
            item_fat_content: self.item_fat_content,
            item_visibility: self.item_visibility,
            item_type: self.item_type,
            item_mrp: self.item_mrp,
            outlet_establishment_year: self.outlet_establishment_year,
            outlet_size: self.outlet_size,
            outlet_location_type: self.outlet_location_type,
            outlet_type: self.outlet_type,
        }
    }
}

/// Artifact kind for the `pack` command
#[derive(Clone, Copy, ValueEnum)]
enum PackKind {
    /// Standard scaler (mean/scale)
    Scaler,
    /// Linear regressor (coefficients/intercept)
    Regressor,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the prediction server
    ///
    /// Examples:
    ///   predecir serve
    ///   predecir serve --port 9000 --scaler ./models/scaler.prd
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,

        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
    /// Run a single prediction and print the result
    ///
    /// Examples:
    ///   predecir predict
    ///   predecir predict --item-mrp 250.0 --outlet-type 2
    ///   predecir predict --json
    Predict {
        #[command(flatten)]
        artifacts: ArtifactArgs,

        #[command(flatten)]
        features: FeatureArgs,

        /// Print the result as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write a .prd artifact from a JSON parameter file
    ///
    /// The parameter file holds {"mean": [...], "scale": [...]} for a
    /// scaler or {"coefficients": [...], "intercept": ...} for a regressor.
    Pack {
        /// Kind of artifact to write
        #[arg(value_enum)]
        kind: PackKind,

        /// JSON parameter file
        #[arg(value_name = "PARAMS")]
        params: PathBuf,

        /// Output artifact path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show header and checksum status of an artifact
    Inspect {
        /// Artifact path
        #[arg(value_name = "ARTIFACT")]
        path: PathBuf,
    },
    /// Show version and configuration info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            artifacts,
        } => {
            serve(&host, port, artifacts.into_paths()).await?;
        },
        Commands::Predict {
            artifacts,
            features,
            json,
        } => {
            run_predict(artifacts.into_paths(), features.into_input(), json)?;
        },
        Commands::Pack {
            kind,
            params,
            output,
        } => {
            run_pack(kind, &params, &output)?;
        },
        Commands::Inspect { path } => {
            run_inspect(&path)?;
        },
        Commands::Info => {
            println!("Predecir v{}", predecir::VERSION);
            println!("Tabular regression inference server");
            println!();
            println!("Features:");
            println!("  - Primary/fallback artifact resolution (.prd format)");
            println!("  - Standard scaler + linear regression pipeline");
            println!("  - HTML form and JSON API for single-shot predictions");
            println!("  - Prometheus metrics at /metrics");
        },
    }

    Ok(())
}

/// Load both artifacts, then serve. Missing or corrupt artifacts halt the
/// process before the predict surface becomes reachable.
async fn serve(host: &str, port: u16, paths: ArtifactPaths) -> Result<()> {
    println!("Loading artifacts...");
    println!("  scaler: {} (fallback {})", paths.scaler.primary.display(), paths.scaler.fallback.display());
    println!("  model:  {} (fallback {})", paths.model.primary.display(), paths.model.fallback.display());

    let predictor = match ArtifactBundle::load(&paths) {
        Ok(p) => p,
        Err(errors) => {
            eprintln!("Artifact loading failed:");
            for e in &errors {
                eprintln!("  - {e}");
            }
            std::process::exit(1);
        },
    };
    println!("Artifacts loaded.");
    println!();

    let state = AppState::new(predictor);
    let app = create_router(state);

    let addr: SocketAddr =
        format!("{host}:{port}")
            .parse()
            .map_err(|e| PredecirError::InvalidConfiguration {
                reason: format!("invalid address: {e}"),
            })?;

    println!("Server listening on http://{addr}");
    println!();
    println!("Endpoints:");
    println!("  GET  /           - Prediction form");
    println!("  POST /v1/predict - JSON prediction API");
    println!("  GET  /health     - Health check");
    println!("  GET  /metrics    - Prometheus metrics");
    println!();
    println!("Example:");
    println!("  curl http://{addr}/health");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        PredecirError::InvalidConfiguration {
            reason: format!("failed to bind {addr}: {e}"),
        }
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| PredecirError::InvalidConfiguration {
            reason: format!("server error: {e}"),
        })?;

    Ok(())
}

/// One-shot prediction from the command line.
fn run_predict(paths: ArtifactPaths, input: FeatureInput, json: bool) -> Result<()> {
    let predictor = match ArtifactBundle::load(&paths) {
        Ok(p) => p,
        Err(errors) => {
            eprintln!("Artifact loading failed:");
            for e in &errors {
                eprintln!("  - {e}");
            }
            std::process::exit(1);
        },
    };

    let prediction = predictor.predict(&input)?;

    if json {
        let body = serde_json::json!({
            "prediction": prediction.value,
            "formatted": prediction.formatted(),
            "raw": prediction.raw,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );
    } else {
        println!("Predicted sales: {}", prediction.formatted());
        println!("Raw model output: {:?}", prediction.raw);
    }

    Ok(())
}

/// Write a `.prd` artifact from a JSON parameter file.
fn run_pack(kind: PackKind, params_path: &Path, output: &Path) -> Result<()> {
    let json = std::fs::read_to_string(params_path)
        .map_err(|e| PredecirError::IoError(format!("failed to read {}: {e}", params_path.display())))?;

    let bytes = match kind {
        PackKind::Scaler => {
            let params: artifact::ScalerParams =
                serde_json::from_str(&json).map_err(|e| PredecirError::InvalidConfiguration {
                    reason: format!("invalid scaler params: {e}"),
                })?;
            artifact::encode_scaler(&params)?
        },
        PackKind::Regressor => {
            let params: artifact::RegressorParams =
                serde_json::from_str(&json).map_err(|e| PredecirError::InvalidConfiguration {
                    reason: format!("invalid regressor params: {e}"),
                })?;
            artifact::encode_regressor(&params)?
        },
    };

    std::fs::write(output, &bytes)
        .map_err(|e| PredecirError::IoError(format!("failed to write {}: {e}", output.display())))?;

    println!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

/// Print header and checksum status of an artifact file.
fn run_inspect(path: &Path) -> Result<()> {
    let data = std::fs::read(path)
        .map_err(|e| PredecirError::IoError(format!("failed to read {}: {e}", path.display())))?;

    println!("Artifact: {}", path.display());
    println!("  Size: {} bytes", data.len());

    match artifact::verify(&data) {
        Ok((header, payload)) => {
            println!("  Format: PRD v{}.{}", header.version.0, header.version.1);
            println!("  Kind: {}", header.kind);
            println!("  Payload: {} bytes", payload.len());
            println!("  Checksum: ok");
        },
        Err(reason) => {
            eprintln!("  Invalid artifact: {reason}");
            std::process::exit(1);
        },
    }

    Ok(())
}
