// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All business logic is delegated to Layer 2 (application);
// `serve` hands the built state to the web layer.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ModelInfoArgs, PredictArgs, ServeArgs};

use crate::application::predict_use_case::PredictUseCase;
use crate::application::serve_use_case::ServeUseCase;
use crate::web::page::format_price;

#[derive(Parser, Debug)]
#[command(
    name = "house-price-app",
    version,
    about = "House price prediction with a linear regression model and a cinematic background slideshow."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Routes only, never computes.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve(args)     => run_serve(args).await,
            Commands::Predict(args)   => run_predict(args),
            Commands::ModelInfo(args) => run_model_info(args),
        }
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let use_case = ServeUseCase::new(args.into());
    let state = use_case.build_state()?;
    crate::web::serve(use_case.config().addr, state).await
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let use_case = PredictUseCase::load(&args.model_path)?;
    let (features, price) = use_case.estimate(&args.widgets())?;

    tracing::info!("Predicting for {:?}", features);
    println!("Estimated Price: {}", format_price(price));
    Ok(())
}

fn run_model_info(args: ModelInfoArgs) -> Result<()> {
    let use_case = PredictUseCase::load(&args.model_path)?;
    let model = use_case.model();

    println!("Model: {}", args.model_path.display());
    for (field, coef) in model.terms() {
        println!("  {:<12} {:>14.4}", field.name(), coef);
    }
    println!("  {:<12} {:>14.4}", "intercept", model.intercept());

    match model.metrics() {
        Some(m) => println!(
            "R²: {:.4}  RMSE: {:.4}  MSE: {:.4}{}",
            m.r2,
            m.rmse,
            m.mse,
            if m.scaled { "  (scaled target)" } else { "" }
        ),
        None => println!("No evaluation metrics recorded."),
    }
    Ok(())
}
