//! CartesiScan Metadata - token metadata resolver CLI
//!
//! Resolves the metadata document of an ERC721/ERC1155 token the way the
//! explorer does and prints the published result as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Read the URI on chain
//! CARTESISCAN_RPC_URL=http://127.0.0.1:8545 cartesiscan-metadata --contract 0x... --token-id 7
//!
//! # Resolve a known template
//! cartesiscan-metadata --uri 'ipfs://{id}' --token-id 5
//! ```

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use cartesiscan::metadata::{MetadataResult, ResolutionState};
use cartesiscan::{
    JsonRpcUriReader, ReqwestMetadataHttp, ResolverConfig, TokenMetadataLookup,
    TokenMetadataResolver,
};
use clap::Parser;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    run(config).await
}

async fn run(config: Config) -> Result<()> {
    let token_id = config.parse_token_id()?;
    let http = Arc::new(
        ReqwestMetadataHttp::new().context("Failed to build the metadata HTTP client")?,
    );
    let resolver = TokenMetadataResolver::new(
        http,
        ResolverConfig {
            lenient_json: config.lenient_json,
        },
    );

    let result = if let Some(template) = config.uri.as_deref() {
        tracing::info!("Resolving URI template {} for token {}", template, token_id);
        resolver.resolve(Some(template), Some(token_id)).await
    } else {
        let contract = config
            .parse_contract()?
            .context("--contract is required without --uri")?;
        let rpc_url = config.parse_rpc_url()?;
        tracing::info!("RPC URL: {}", rpc_url);
        tracing::info!(
            "Reading {} URI of token {} on {:#x}",
            cartesiscan::TokenStandard::from(config.standard),
            token_id,
            contract
        );

        let lookup = TokenMetadataLookup::new(JsonRpcUriReader::new(rpc_url), resolver);
        lookup
            .lookup(contract, token_id, config.standard.into())
            .await?
    };

    report(&result, &config.ipfs_gateway);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Log the feedback the explorer would show for this result.
fn report(result: &MetadataResult, ipfs_gateway: &str) {
    let url = result.url.as_deref().unwrap_or("-");

    match result.state {
        ResolutionState::Success => {
            if let Some(doc) = result.document() {
                tracing::info!(
                    name = ?doc.name,
                    description = ?doc.description,
                    image = ?doc.image,
                    "Resolved metadata from {}",
                    url
                );
            }
        }
        ResolutionState::NotHttp => {
            tracing::warn!("{} ({})", result.state.feedback_message().unwrap_or_default(), url);
            if let Some(gateway_url) = result.ipfs_gateway_url(ipfs_gateway) {
                tracing::info!("Try the IPFS gateway: {}", gateway_url);
            }
            if result.inline_document().is_some() {
                tracing::info!("The URI embeds its metadata document inline");
            }
        }
        state if state.is_error() => {
            tracing::warn!(
                error = ?result.error.as_ref().map(ToString::to_string),
                "{} ({})",
                result.state.feedback_message().unwrap_or_default(),
                url
            );
        }
        ResolutionState::Idle => {
            tracing::warn!("Nothing to resolve: the contract returned no URI");
        }
        // Fetching never reaches a report
        _ => {}
    }
}
