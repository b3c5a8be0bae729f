//! Configuration for the metadata resolver CLI

use anyhow::{Context, Result};
use cartesiscan::{TokenStandard, U256, H160};
use clap::{Parser, ValueEnum};

/// Which URI getter to call on the contract.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum Standard {
    /// `tokenURI(uint256)`
    Erc721,
    /// `uri(uint256)`, with `{id}` substitution
    #[default]
    Erc1155,
}

impl From<Standard> for TokenStandard {
    fn from(standard: Standard) -> Self {
        match standard {
            Standard::Erc721 => TokenStandard::Erc721,
            Standard::Erc1155 => TokenStandard::Erc1155,
        }
    }
}

/// Token metadata resolver for CartesiScan
///
/// Reads a token's metadata URI from its contract (or takes a URI template
/// directly), resolves it and prints the result as JSON.
///
/// # Examples
///
/// ```bash
/// # Read `uri(7)` on chain and fetch the document
/// cartesiscan-metadata --contract 0x... --token-id 7
///
/// # Skip the chain read
/// cartesiscan-metadata --uri 'https://api.example.com/meta/{id}.json' --token-id 42
/// ```
#[derive(Parser, Debug)]
#[command(name = "cartesiscan-metadata")]
#[command(about = "Resolve ERC721/ERC1155 token metadata", long_about = None)]
pub struct Config {
    /// Ethereum JSON-RPC URL used to read the token URI
    #[arg(long, env = "CARTESISCAN_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Token contract address (required unless --uri is given)
    #[arg(long, required_unless_present = "uri")]
    pub contract: Option<String>,

    /// Token id, decimal or 0x-prefixed hex
    #[arg(long)]
    pub token_id: String,

    /// Token standard of the contract
    #[arg(long, value_enum, default_value = "erc1155")]
    pub standard: Standard,

    /// Metadata URI template to resolve instead of reading it on chain
    #[arg(long, conflicts_with = "contract")]
    pub uri: Option<String>,

    /// IPFS gateway suggested for `ipfs://` URIs
    #[arg(
        long,
        env = "CARTESISCAN_IPFS_GATEWAY",
        default_value = cartesiscan::metadata::DEFAULT_IPFS_GATEWAY
    )]
    pub ipfs_gateway: String,

    /// Retry JSON parsing on a sanitized body for broken metadata
    #[arg(long)]
    pub lenient_json: bool,
}

impl Config {
    pub fn parse_token_id(&self) -> Result<U256> {
        cartesiscan::parse_token_id(&self.token_id)
    }

    pub fn parse_contract(&self) -> Result<Option<H160>> {
        self.contract
            .as_deref()
            .map(cartesiscan_common::token_uri::parse_address)
            .transpose()
    }

    pub fn parse_rpc_url(&self) -> Result<url::Url> {
        url::Url::parse(&self.rpc_url).with_context(|| format!("Invalid RPC URL {}", self.rpc_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uri_mode() {
        let config = Config::parse_from([
            "cartesiscan-metadata",
            "--uri",
            "https://x/{id}",
            "--token-id",
            "0x2a",
        ]);
        assert_eq!(config.parse_token_id().unwrap(), U256::from(42u64));
        assert_eq!(config.parse_contract().unwrap(), None);
        assert_eq!(config.standard, Standard::Erc1155);
        assert!(!config.lenient_json);
    }

    #[test]
    fn test_parse_contract_mode() {
        let config = Config::parse_from([
            "cartesiscan-metadata",
            "--contract",
            "0x00000000000000000000000000000000000000aa",
            "--token-id",
            "7",
            "--standard",
            "erc721",
        ]);
        assert!(config.parse_contract().unwrap().is_some());
        assert_eq!(TokenStandard::from(config.standard), TokenStandard::Erc721);
    }

    #[test]
    fn test_contract_or_uri_required() {
        assert!(Config::try_parse_from(["cartesiscan-metadata", "--token-id", "1"]).is_err());
        assert!(Config::try_parse_from([
            "cartesiscan-metadata",
            "--contract",
            "0x00000000000000000000000000000000000000aa",
            "--uri",
            "https://x/{id}",
            "--token-id",
            "1",
        ])
        .is_err());
    }
}
