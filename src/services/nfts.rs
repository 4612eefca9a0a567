use futures_util::stream::{self, StreamExt};

use crate::constants::{NFT_DECIMALS, NFT_RAW_AMOUNT};
use crate::error::Result;
use crate::models::{BatchOutcome, ItemFailure, NftAsset, WalletAddress};
use crate::services::chain::{ChainReader, TokenAccountBalance};
use crate::services::nft_catalog::TokenCatalog;

/// Balance-quantity-1 / decimals-0 heuristic separating collectible mints
/// from fungible balances. This is the sole detection rule; there is no
/// token-standard check behind it.
pub fn is_non_fungible(account: &TokenAccountBalance) -> bool {
    account.amount == NFT_RAW_AMOUNT && account.decimals == NFT_DECIMALS
}

/// Enumerate the wallet's NFT holdings.
///
/// Lists token accounts, keeps the non-fungible ones, then resolves display
/// metadata per mint as a concurrency-limited ordered batch. A failed or
/// missing metadata lookup drops that item and the batch continues; only
/// failure of the account listing itself aborts the operation.
pub async fn enumerate_wallet_nfts(
    chain: &dyn ChainReader,
    catalog: &dyn TokenCatalog,
    owner: &WalletAddress,
    max_inflight: usize,
) -> Result<BatchOutcome<NftAsset>> {
    let accounts = chain.token_accounts(owner.pubkey()).await?;
    let non_fungible: Vec<TokenAccountBalance> = accounts
        .into_iter()
        .filter(|account| is_non_fungible(account))
        .collect();

    let mut outcome = BatchOutcome::new();
    let mut lookups = stream::iter(non_fungible)
        .map(|account| async move {
            let result = catalog.metadata(&account.mint).await;
            (account, result)
        })
        .buffered(max_inflight.max(1));

    while let Some((account, result)) = lookups.next().await {
        match result {
            Ok(Some(metadata)) => outcome.items.push(NftAsset {
                name: metadata.name.unwrap_or_else(|| account.mint.clone()),
                image_url: metadata.image.unwrap_or_default(),
                collection_name: metadata
                    .collection
                    .and_then(|collection| collection.name)
                    .unwrap_or_default(),
                mint: account.mint,
            }),
            Ok(None) => {
                tracing::warn!("nft_metadata_lookup missing mint={}", account.mint);
                outcome.dropped.push(ItemFailure {
                    item: account.mint,
                    reason: "metadata not found".to_string(),
                });
            }
            Err(err) => {
                tracing::warn!(
                    "nft_metadata_lookup failed mint={} err={}",
                    account.mint,
                    err
                );
                outcome.dropped.push(ItemFailure {
                    item: account.mint,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}
