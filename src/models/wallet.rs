use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::AppError;

// ==================== WALLET ADDRESS ====================

/// A wallet address that passed strict public-key decoding.
///
/// Invalid input cannot construct a value, so everything downstream of the
/// parse may assume a well-formed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletAddress(Pubkey);

impl WalletAddress {
    pub fn pubkey(&self) -> &Pubkey {
        &self.0
    }
}

impl FromStr for WalletAddress {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<Pubkey>()
            .map(WalletAddress)
            .map_err(|_| AppError::InvalidAddress)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ==================== NFT ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftAsset {
    pub name: String,
    pub image_url: String,
    pub collection_name: String,
    pub mint: String,
}

// ==================== TOKEN ACTIVITY ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Acquired,
    Disposed,
}

/// One changed token position derived from a transaction's pre/post
/// balance snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTransferEvent {
    pub token_label: String,
    pub amount: Decimal,
    pub direction: TransferDirection,
    pub timestamp: DateTime<Utc>,
    pub transaction_id: String,
}

// ==================== BATCH RESULTS ====================

/// A per-item upstream failure recovered by omission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub item: String,
    pub reason: String,
}

/// Result of a fan-out batch: the surviving items plus whatever was
/// dropped along the way. Callers decide whether to surface `dropped`.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub items: Vec<T>,
    pub dropped: Vec<ItemFailure>,
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            dropped: Vec::new(),
        }
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== API ENVELOPE ====================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
