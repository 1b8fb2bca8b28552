use async_trait::async_trait;
use mpl_token_metadata::accounts::Metadata;
use mpl_token_metadata::types::Key;
use reqwest::Client;
use serde::Deserialize;
use shared::{Error, Result, TokenMetadata};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves descriptive metadata for a mint.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// `Ok(None)` when the registry has no entry for `mint`.
    async fn resolve(&self, mint: &str) -> Result<Option<TokenMetadata>>;
}

/// Name, symbol and off-chain reference decoded from the on-chain record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainMetadata {
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

#[derive(Debug, Deserialize)]
struct OffChainMetadata {
    image: Option<String>,
}

/// Derive the metadata account address for a mint
pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    Metadata::find_pda(mint).0
}

/// Decode a Metaplex metadata account, trimming the NUL padding of its strings.
pub fn decode_metadata(data: &[u8]) -> Option<OnChainMetadata> {
    let metadata = match Metadata::from_bytes(data) {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!("Metadata account does not decode: {}", e);
            return None;
        }
    };
    if metadata.key != Key::MetadataV1 {
        return None;
    }

    Some(OnChainMetadata {
        mint: metadata.mint,
        name: trim_padding(&metadata.name),
        symbol: trim_padding(&metadata.symbol),
        uri: trim_padding(&metadata.uri),
    })
}

fn trim_padding(value: &str) -> String {
    value.trim_end_matches('\0').trim().to_string()
}

/// Metadata resolver backed by the Metaplex registry and the referenced JSON document
pub struct MetaplexResolver {
    rpc: Arc<RpcClient>,
    http: Client,
}

impl MetaplexResolver {
    pub fn new(rpc: Arc<RpcClient>, http: Client) -> Self {
        Self { rpc, http }
    }

    /// Turn a decoded record into display metadata. A missing image never drops the record.
    pub async fn assemble(&self, record: OnChainMetadata) -> TokenMetadata {
        let image_url = if record.uri.is_empty() {
            None
        } else {
            self.fetch_image_url(&record.uri).await
        };

        TokenMetadata {
            name: record.name,
            symbol: record.symbol,
            source_uri: record.uri,
            image_url,
        }
    }

    /// Fetch the JSON document at `uri` and return its `image` field.
    ///
    /// Any failure yields `None`; the image is cosmetic.
    pub async fn fetch_image_url(&self, uri: &str) -> Option<String> {
        let response = match self.http.get(uri).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Failed to fetch metadata document {}: {}", uri, e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Metadata document {} returned status {}", uri, response.status());
            return None;
        }

        match response.json::<OffChainMetadata>().await {
            Ok(document) => document.image.filter(|image| !image.is_empty()),
            Err(e) => {
                debug!("Metadata document {} is not usable JSON: {}", uri, e);
                None
            }
        }
    }
}

#[async_trait]
impl MetadataResolver for MetaplexResolver {
    async fn resolve(&self, mint: &str) -> Result<Option<TokenMetadata>> {
        let mint_key = Pubkey::from_str(mint)
            .map_err(|e| Error::Validation(format!("Invalid mint {}: {}", mint, e)))?;
        let address = metadata_address(&mint_key);

        let account = self
            .rpc
            .get_account_with_commitment(&address, CommitmentConfig::confirmed())
            .await
            .map_err(|e| Error::SolanaRpc(format!("Failed to fetch metadata account: {}", e)))?
            .value;

        let Some(account) = account else {
            debug!("No metadata account for mint {}", mint);
            return Ok(None);
        };

        if account.owner != mpl_token_metadata::ID {
            warn!("Metadata account {} has unexpected owner {}", address, account.owner);
            return Ok(None);
        }

        let Some(record) = decode_metadata(&account.data) else {
            warn!("Undecodable metadata account {} for mint {}", address, mint);
            return Ok(None);
        };

        Ok(Some(self.assemble(record).await))
    }
}
