//! appcenter-distribute CLI
//!
//! Uploads a release binary to the distribution service and attaches it to a
//! distribution group.

use anyhow::Result;
use appcenter_distribute::{
    DistributeConfig, DistributeError, ReleasePipeline, SecureTokenManager,
};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Distribute app releases to testers
#[derive(Parser)]
#[command(name = "appcenter-distribute")]
#[command(version)]
#[command(about = "Upload, commit and distribute app releases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a release and distribute it to a group
    Distribute {
        /// API token (falls back to APPCENTER_API_TOKEN / MOBILE_CENTER_API_TOKEN)
        #[arg(long)]
        api_token: Option<String>,

        /// Owner (user or organization) of the app
        #[arg(long)]
        owner_name: String,

        /// App name as registered with the distribution service
        #[arg(long)]
        app_name: String,

        /// Path to the release binary (.apk or .ipa)
        #[arg(long)]
        file: PathBuf,

        /// Path to a zipped debug-symbol archive (iOS only, best-effort)
        #[arg(long)]
        dsym: Option<PathBuf>,

        /// Distribution group that receives the release
        #[arg(long)]
        group: String,

        /// Release notes shown to testers
        #[arg(long)]
        release_notes: Option<String>,

        /// Changelog to fall back to when no release notes are given
        #[arg(long)]
        changelog: Option<String>,

        /// Dump API response bodies at debug level
        #[arg(long)]
        verbose: bool,
    },

    /// Validate inputs without making any network call
    Check {
        /// Path to the release binary (.apk or .ipa)
        #[arg(long)]
        file: PathBuf,

        /// Path to a zipped debug-symbol archive
        #[arg(long)]
        dsym: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\nError: {}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Distribute {
            api_token,
            owner_name,
            app_name,
            file,
            dsym,
            group,
            release_notes,
            changelog,
            verbose,
        } => {
            init_tracing(verbose);

            let token_manager = SecureTokenManager::new();
            let api_token = match api_token {
                Some(token) => SecretString::new(token.into()),
                None => match token_manager.token_from_env() {
                    Some(token) => token,
                    None => {
                        eprintln!(
                            "No API token given, pass using --api-token or set one of: {}",
                            token_manager.env_var_names().join(", ")
                        );
                        return Ok(1);
                    }
                },
            };

            let config = DistributeConfig {
                api_token,
                owner_name,
                app_name,
                file,
                dsym,
                group,
                release_notes,
                changelog,
                verbose,
            };

            distribute_command(config, &token_manager).await
        }
        Commands::Check { file, dsym } => {
            init_tracing(false);
            check_command(file, dsym)
        }
    }
}

async fn distribute_command(
    config: DistributeConfig,
    token_manager: &SecureTokenManager,
) -> Result<i32> {
    let mut pipeline = ReleasePipeline::new();

    match pipeline.run(&config).await {
        Ok(report) => {
            println!(
                "\nRelease {} distributed to group '{}'",
                report.release.short_version, config.group
            );
            match &report.download_url {
                Some(url) => println!("Download link: {}", url),
                None => println!("No download link exposed for this release"),
            }
            for warning in &report.warnings {
                println!("Warning: {}", warning);
            }
            println!("Completed in {} ms", report.duration);
            Ok(0)
        }
        Err(error) => {
            let message = match &error {
                // Error bodies can echo request details; never print the token.
                DistributeError::Remote { .. } | DistributeError::TransferFailed { .. } => {
                    token_manager.mask_token_in_string(&error.to_string(), &config.api_token)
                }
                _ => error.to_string(),
            };
            eprintln!("\nDistribution failed [{}]: {}", error.code(), message);
            for action in error.suggested_actions() {
                eprintln!("  - {}", action);
            }
            Ok(1)
        }
    }
}

fn check_command(file: PathBuf, dsym: Option<PathBuf>) -> Result<i32> {
    // Placeholder values for the remote-only fields; check only looks at
    // what can be validated without the network.
    let config = DistributeConfig {
        api_token: SecretString::new("local-check".into()),
        owner_name: "owner".to_string(),
        app_name: "app".to_string(),
        file,
        dsym,
        group: "group".to_string(),
        release_notes: None,
        changelog: None,
        verbose: false,
    };

    match config.validate() {
        Ok(()) => {
            let kind = config
                .binary_kind()
                .map(|k| format!("{k:?}"))
                .unwrap_or_default();
            println!("Artifact looks ready to distribute ({})", kind.to_lowercase());
            Ok(0)
        }
        Err(error) => {
            eprintln!("Check failed: {}", error);
            Ok(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "appcenter_distribute=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
