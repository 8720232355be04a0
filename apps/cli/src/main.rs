//! kvmount — fetches Azure Key Vault objects and writes them as files.
//!
//! Invoked once per volume mount by the node agent. The run is
//! single-threaded and stateless: validate configuration, resolve the
//! cloud environment, acquire a management-scoped token, locate the vault,
//! acquire a vault-scoped token, then fetch and write each requested
//! object in order. Any failure exits non-zero; nothing is retried except
//! the identity-broker call inside the auth crate.

mod config;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use kvmount_auth::{CloudEnvironment, TokenAcquirer};
use kvmount_vault::{VaultClient, VaultLocator, parse_descriptors, pipeline};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Flags};

const PROGRAM: &str = "kvmount";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let flags = Flags::parse();
    if let Err(err) = run(flags).await {
        error!("{err:#}");
        eprintln!("[error] {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(flags: Flags) -> anyhow::Result<()> {
    let config = Config::from_flags(flags)?;

    if config.show_version {
        println!("{PROGRAM} {VERSION}");
    }
    info!(program = PROGRAM, version = VERSION, "starting");

    // Everything below the descriptor parse talks to the network; all
    // configuration problems must surface before that.
    let metadata = std::fs::metadata(&config.target_dir)
        .with_context(|| format!("failed to get directory {}", config.target_dir.display()))?;
    anyhow::ensure!(
        metadata.is_dir(),
        "{} is not a directory",
        config.target_dir.display()
    );

    let descriptors = parse_descriptors(
        &config.object_names,
        &config.object_types,
        &config.object_versions,
        &config.object_aliases,
    )?;

    let environment = CloudEnvironment::from_name(&config.cloud_name)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let http = reqwest::Client::new();
    let acquirer = TokenAcquirer::new(http.clone());

    let management = acquirer
        .management_token(&config.credentials, environment, &cancel)
        .await
        .context("failed to get management token")?;

    let vault_url = VaultLocator::new(http.clone(), environment.resource_manager_endpoint)
        .resolve(
            &config.subscription_id,
            &config.resource_group,
            &config.vault_name,
            &management,
        )
        .await
        .context("failed to get vault")?;

    let vault_token = acquirer
        .vault_token(&config.credentials, environment, &cancel)
        .await
        .context("failed to get key vault token")?;

    let client = VaultClient::new(http, vault_url, vault_token);
    pipeline::materialize(&client, &descriptors, &config.target_dir).await?;

    info!(
        objects = descriptors.len(),
        dir = %config.target_dir.display(),
        "all objects written"
    );
    Ok(())
}
