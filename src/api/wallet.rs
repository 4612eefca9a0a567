use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::{parse_wallet_address, AppState};
use crate::config::FailurePolicy;
use crate::error::Result;
use crate::models::{ApiResponse, ItemFailure, NftAsset, TokenTransferEvent};
use crate::services::{activity, nfts};

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub address: String,
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct WalletNftsResponse {
    pub assets: Vec<NftAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped: Option<Vec<ItemFailure>>,
}

#[derive(Debug, Serialize)]
pub struct WalletActivityResponse {
    pub events: Vec<TokenTransferEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped: Option<Vec<ItemFailure>>,
}

// Under the drop policy per-item failures stay in the logs only; under
// collect they ride along in the response body.
fn dropped_for_policy(policy: FailurePolicy, dropped: Vec<ItemFailure>) -> Option<Vec<ItemFailure>> {
    match policy {
        FailurePolicy::Drop => None,
        FailurePolicy::Collect => Some(dropped),
    }
}

/// GET /api/v1/wallet/{address}/validate
pub async fn validate_address(
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<ValidateResponse>>> {
    let wallet = parse_wallet_address(&address)?;
    Ok(Json(ApiResponse::success(ValidateResponse {
        address: wallet.to_string(),
        valid: true,
    })))
}

/// GET /api/v1/wallet/{address}/nfts
pub async fn get_wallet_nfts(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<WalletNftsResponse>>> {
    let wallet = parse_wallet_address(&address)?;

    let outcome = nfts::enumerate_wallet_nfts(
        state.chain.as_ref(),
        state.catalog.as_ref(),
        &wallet,
        state.config.max_inflight_fetches,
    )
    .await?;

    tracing::info!(
        "wallet_nfts address={} assets={} dropped={}",
        wallet,
        outcome.items.len(),
        outcome.dropped.len()
    );

    Ok(Json(ApiResponse::success(WalletNftsResponse {
        assets: outcome.items,
        dropped: dropped_for_policy(state.config.item_failure_policy, outcome.dropped),
    })))
}

/// GET /api/v1/wallet/{address}/activity
pub async fn get_wallet_activity(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<WalletActivityResponse>>> {
    let wallet = parse_wallet_address(&address)?;

    let outcome = activity::recent_wallet_activity(
        state.chain.as_ref(),
        &wallet,
        state.config.signature_fetch_limit,
        state.config.max_inflight_fetches,
    )
    .await?;

    tracing::info!(
        "wallet_activity address={} events={} dropped={}",
        wallet,
        outcome.items.len(),
        outcome.dropped.len()
    );

    Ok(Json(ApiResponse::success(WalletActivityResponse {
        events: outcome.items,
        dropped: dropped_for_policy(state.config.item_failure_policy, outcome.dropped),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use solana_sdk::pubkey::Pubkey;

    use crate::config::Config;
    use crate::error::AppError;
    use crate::services::chain::{ChainReader, TokenAccountBalance, TransactionRecord};
    use crate::services::nft_catalog::{NftMetadata, TokenCatalog};

    #[derive(Default)]
    struct RecordingChain {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChainReader for RecordingChain {
        async fn token_accounts(
            &self,
            _owner: &Pubkey,
        ) -> crate::error::Result<Vec<TokenAccountBalance>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn recent_signatures(
            &self,
            _address: &Pubkey,
            _limit: usize,
        ) -> crate::error::Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn parsed_transaction(
            &self,
            _signature: &str,
        ) -> crate::error::Result<TransactionRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TransactionRecord::default())
        }

        async fn health(&self) -> crate::error::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingCatalog {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenCatalog for RecordingCatalog {
        async fn metadata(&self, _mint: &str) -> crate::error::Result<Option<NftMetadata>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "test".to_string(),
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            metadata_api_url: "https://catalog.test".to_string(),
            metadata_api_key: None,
            signature_fetch_limit: 20,
            max_inflight_fetches: 8,
            item_failure_policy: FailurePolicy::Drop,
            request_timeout_secs: 10,
            cors_allowed_origins: "*".to_string(),
        }
    }

    fn recording_state() -> (Arc<RecordingChain>, Arc<RecordingCatalog>, AppState) {
        let chain = Arc::new(RecordingChain::default());
        let catalog = Arc::new(RecordingCatalog::default());
        let state = AppState {
            chain: chain.clone(),
            catalog: catalog.clone(),
            config: test_config(),
        };
        (chain, catalog, state)
    }

    fn failure(item: &str) -> ItemFailure {
        ItemFailure {
            item: item.to_string(),
            reason: "gone".to_string(),
        }
    }

    #[test]
    fn drop_policy_omits_failures_from_response() {
        assert!(dropped_for_policy(FailurePolicy::Drop, vec![failure("a")]).is_none());
    }

    #[test]
    fn collect_policy_includes_failures() {
        let dropped = dropped_for_policy(FailurePolicy::Collect, vec![failure("a")]).unwrap();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].item, "a");
    }

    #[tokio::test]
    async fn validate_rejects_malformed_addresses() {
        assert!(validate_address(Path("not-a-pubkey".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn nfts_rejects_malformed_address_before_any_upstream_call() {
        let (chain, catalog, state) = recording_state();

        let result = get_wallet_nfts(State(state), Path("not-a-pubkey".to_string())).await;
        assert!(matches!(result, Err(AppError::InvalidAddress)));
        assert_eq!(chain.calls.load(Ordering::SeqCst), 0);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn activity_rejects_malformed_address_before_any_upstream_call() {
        let (chain, catalog, state) = recording_state();

        let result = get_wallet_activity(State(state), Path("not-a-pubkey".to_string())).await;
        assert!(matches!(result, Err(AppError::InvalidAddress)));
        assert_eq!(chain.calls.load(Ordering::SeqCst), 0);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn validate_accepts_well_formed_addresses() {
        let mint = "So11111111111111111111111111111111111111112";
        let response = validate_address(Path(mint.to_string())).await.unwrap();
        assert!(response.0.success);
        assert_eq!(response.0.data.address, mint);
        assert!(response.0.data.valid);
    }
}
