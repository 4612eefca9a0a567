use std::collections::{HashMap, HashSet};

use chrono::{TimeZone, Utc};
use futures_util::stream::{self, StreamExt};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{BatchOutcome, ItemFailure, TokenTransferEvent, TransferDirection, WalletAddress};
use crate::services::chain::{ChainReader, TransactionRecord};

/// Recent token-transfer activity for a wallet.
///
/// Fetches the newest `signature_limit` signatures, then resolves each
/// transaction as a concurrency-limited batch. A transaction that fails to
/// fetch or parse drops out of the result; only failure of the signature
/// listing itself aborts the operation.
pub async fn recent_wallet_activity(
    chain: &dyn ChainReader,
    owner: &WalletAddress,
    signature_limit: usize,
    max_inflight: usize,
) -> Result<BatchOutcome<TokenTransferEvent>> {
    let signatures = chain.recent_signatures(owner.pubkey(), signature_limit).await?;

    let mut outcome = BatchOutcome::new();
    let mut lookups = stream::iter(signatures)
        .map(|signature| async move {
            let result = chain.parsed_transaction(&signature).await;
            (signature, result)
        })
        .buffered(max_inflight.max(1));

    while let Some((signature, result)) = lookups.next().await {
        match result {
            Ok(record) => outcome.items.extend(events_from_record(&record)),
            Err(err) => {
                tracing::warn!("activity_tx_lookup failed signature={} err={}", signature, err);
                outcome.dropped.push(ItemFailure {
                    item: signature,
                    reason: err.to_string(),
                });
            }
        }
    }

    // Stable sort keeps per-transaction event order for equal timestamps.
    outcome.items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(outcome)
}

/// Derive transfer events from one transaction by diffing its pre/post
/// token balances. Mints present only on one side are skipped: without
/// both snapshots the delta for the wallet is not known. Several token
/// accounts can carry the same mint in one transaction, so both sides are
/// summed per mint before diffing and each mint yields at most one event.
pub fn events_from_record(record: &TransactionRecord) -> Vec<TokenTransferEvent> {
    if !record.has_meta {
        tracing::debug!("activity_tx_skip no meta signature={}", record.signature);
        return Vec::new();
    }
    let Some(block_time) = record.block_time else {
        tracing::debug!("activity_tx_skip no block time signature={}", record.signature);
        return Vec::new();
    };
    let Some(timestamp) = Utc.timestamp_opt(block_time, 0).single() else {
        return Vec::new();
    };

    let mut pre_totals: HashMap<&str, f64> = HashMap::new();
    for position in &record.pre_token_balances {
        *pre_totals.entry(position.mint.as_str()).or_insert(0.0) +=
            position.ui_amount.unwrap_or(0.0);
    }
    let mut post_totals: HashMap<&str, f64> = HashMap::new();
    for position in &record.post_token_balances {
        *post_totals.entry(position.mint.as_str()).or_insert(0.0) +=
            position.ui_amount.unwrap_or(0.0);
    }

    let mut seen = HashSet::new();
    let mut events = Vec::new();
    for position in &record.post_token_balances {
        let mint = position.mint.as_str();
        if !seen.insert(mint) {
            continue;
        }
        let Some(before) = pre_totals.get(mint) else {
            continue;
        };
        let delta = post_totals[mint] - before;
        if delta == 0.0 {
            continue;
        }
        let direction = if delta > 0.0 {
            TransferDirection::Acquired
        } else {
            TransferDirection::Disposed
        };
        events.push(TokenTransferEvent {
            token_label: position.mint.clone(),
            amount: Decimal::from_f64(delta.abs()).unwrap_or_default(),
            direction,
            timestamp,
            transaction_id: record.signature.clone(),
        });
    }
    events
}
