use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::models::WalletAddress;
use crate::services::chain::ChainReader;
use crate::services::nft_catalog::TokenCatalog;

pub mod health;
pub mod wallet;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<dyn ChainReader>,
    pub catalog: Arc<dyn TokenCatalog>,
    pub config: Config,
}

/// Parse a path parameter into a wallet address. Runs before any upstream
/// call so malformed input never reaches the RPC node.
pub fn parse_wallet_address(raw: &str) -> Result<WalletAddress> {
    raw.parse()
}
