//! # aks-exec-auth
//!
//! Command-line front end for converting kubelogin exec-plugin kubeconfigs.
//!
//! ## Usage
//!
//! ```bash
//! # Show the options the conversion would use (secrets redacted)
//! aks-exec-auth options --credentials azure-credentials.json
//!
//! # Convert and query the API server version
//! aks-exec-auth version --credentials azure-credentials.json --context my-aks
//! ```

use aks_exec_auth::observability::init_tracing;
use aks_exec_auth::token::LoginFlow;
use aks_exec_auth::{merged_options, wrap_rest_config, RestConfig, RuntimeConfig};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Convert kubelogin exec-plugin kubeconfigs to service principal authentication
#[derive(Debug, Parser)]
#[command(name = "aks-exec-auth")]
#[command(about = "Use Azure AD service principal credentials instead of the kubelogin exec plugin", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the merged authentication options and the selected login flow
    Options(Source),
    /// Convert the kubeconfig and fetch the API server version
    Version(Source),
}

#[derive(Debug, Args)]
struct Source {
    /// JSON file with clientId, clientSecret, tenantId and optional certificate fields
    #[arg(long)]
    credentials: PathBuf,

    /// Kubeconfig path (defaults to KUBECONFIG, then ~/.kube/config)
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Kubernetes context to use
    #[arg(short, long)]
    context: Option<String>,
}

impl Source {
    async fn load(&self) -> Result<(RestConfig, Vec<u8>)> {
        let config = RestConfig::from_kubeconfig(self.kubeconfig.as_deref(), self.context.as_deref())
            .await
            .context("Failed to load kubeconfig")?;
        let credentials = std::fs::read(&self.credentials).with_context(|| {
            format!(
                "Failed to read credentials file {}",
                self.credentials.display()
            )
        })?;
        Ok((config, credentials))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before anything builds a rustls config
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Options(source) => options_command(&source).await,
        Commands::Version(source) => version_command(&source).await,
    }
}

async fn options_command(source: &Source) -> Result<()> {
    let (config, credentials) = source.load().await?;

    let options = merged_options(&config, &credentials).context("Failed to merge options")?;
    println!("{options:#?}");

    match LoginFlow::from_options(&options) {
        Ok(flow) => println!("login flow: {flow:#?}"),
        Err(e) => println!("login flow: unavailable ({e})"),
    }
    Ok(())
}

async fn version_command(source: &Source) -> Result<()> {
    let (mut config, credentials) = source.load().await?;

    wrap_rest_config(&mut config, &credentials).context("Failed to convert kubeconfig")?;

    let client = config
        .http_client(&RuntimeConfig::from_env())
        .context("Failed to build HTTP client")?;
    info!(cluster_url = %client.base_url(), "Requesting API server version");

    let response = client
        .get("/version")
        .await
        .context("Failed to query API server")?;
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read API server response")?;

    if !status.is_success() {
        anyhow::bail!("API server returned {status}: {body}");
    }
    println!("{body}");
    Ok(())
}
