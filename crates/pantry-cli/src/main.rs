//! `pantry`: run the recipe pipelines from the command line.
//!
//! Requests are JSON, read from `--request <file>` or stdin, and responses are
//! printed to stdout as JSON. Logs go to stderr (`RUST_LOG`, default `info`).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use pantry_core::{FindRecipesRequest, MissingIngredientsRequest, SendListRequest};
use pantry_runtime::{Credentials, Orchestrator, RuntimeConfig};

#[derive(Parser)]
#[command(name = "pantry")]
#[command(about = "Recipe suggestions, missing ingredients and shopping lists", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./pantry.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest recipes for a list of ingredients
    FindRecipes {
        /// Request JSON file, or "-" for stdin
        #[arg(long, conflicts_with = "ingredients")]
        request: Option<PathBuf>,

        /// Comma-separated ingredients, instead of a request file
        #[arg(long)]
        ingredients: Option<String>,

        /// Food type preference (e.g. vegan)
        #[arg(long, requires = "ingredients")]
        food_type: Option<String>,

        /// Cuisine preference (e.g. italian)
        #[arg(long, requires = "ingredients")]
        cuisine: Option<String>,
    },

    /// List the ingredients still needed for a recipe
    MissingIngredients {
        /// Request JSON file, or "-" for stdin
        #[arg(long)]
        request: Option<PathBuf>,
    },

    /// Send a shopping list via Telegram or email
    SendList {
        /// Request JSON file, or "-" for stdin
        #[arg(long)]
        request: Option<PathBuf>,
    },

    /// Show which credentials are configured (values are never printed)
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = RuntimeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let credentials = Credentials::load(&config.credentials);

    if let Commands::CheckConfig = cli.command {
        check_config(&credentials);
        return Ok(ExitCode::SUCCESS);
    }

    let orchestrator = Orchestrator::from_config(&config, credentials);

    match cli.command {
        Commands::FindRecipes {
            request,
            ingredients,
            food_type,
            cuisine,
        } => {
            let parsed = match ingredients {
                Some(ingredients) => FindRecipesRequest::from_value(json!({
                    "ingredients": ingredients,
                    "foodType": food_type,
                    "cuisine": cuisine,
                })),
                None => FindRecipesRequest::from_json(&read_request(request.as_deref())?),
            };
            let request = match parsed {
                Ok(request) => request,
                Err(e) => return emit(&json!({ "error": e.to_string() }), false),
            };

            match orchestrator.find_recipes(&request).await {
                Ok(response) => emit(&response, response.error.is_none()),
                Err(e) => {
                    tracing::error!(error = %e, "find-recipes pipeline failed");
                    emit(&json!({ "error": "Internal server error processing recipes." }), false)
                }
            }
        }
        Commands::MissingIngredients { request } => {
            let request = match MissingIngredientsRequest::from_json(&read_request(request.as_deref())?) {
                Ok(request) => request,
                Err(e) => {
                    return emit(&json!({ "error": e.to_string(), "isEstimate": false }), false)
                }
            };

            match orchestrator.missing_ingredients(&request).await {
                Ok(response) => emit(&response, response.has_usable_list()),
                Err(e) => {
                    tracing::error!(error = %e, "missing-ingredients pipeline failed");
                    emit(
                        &json!({ "error": "Internal server error processing missing ingredients." }),
                        false,
                    )
                }
            }
        }
        Commands::SendList { request } => {
            let request = match SendListRequest::from_json(&read_request(request.as_deref())?) {
                Ok(request) => request,
                Err(e) => {
                    return emit(&json!({ "success": false, "message": e.to_string() }), false)
                }
            };

            match orchestrator.send_list(&request).await {
                Ok(response) => emit(&response, response.success),
                Err(e) => {
                    tracing::error!(error = %e, "send-list pipeline failed");
                    emit(
                        &json!({ "success": false, "message": "Internal server error sending shopping list." }),
                        false,
                    )
                }
            }
        }
        Commands::CheckConfig => Ok(ExitCode::SUCCESS),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read a request body from a file, or stdin for `None` and `-`.
fn read_request(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display())),
        _ => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request from stdin")?;
            Ok(body)
        }
    }
}

fn emit<T: Serialize>(value: &T, ok: bool) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn check_config(credentials: &Credentials) {
    for (name, source) in credentials.summary() {
        match source {
            Some(source) => println!("{:<24} configured ({})", name, source),
            None => println!("{:<24} missing", name),
        }
    }
}
