use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use solana_account_decoder::parse_token::UiTokenAccount;
use solana_account_decoder::UiAccountData;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::{
    UiTransactionEncoding, UiTransactionStatusMeta, UiTransactionTokenBalance,
};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Token-account balance as reported by `getTokenAccountsByOwner`.
///
/// `amount` stays a string: the RPC serves raw u64 amounts as strings and
/// the non-fungible filter compares them verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAccountBalance {
    pub mint: String,
    pub amount: String,
    pub decimals: u8,
}

/// One side of a token position inside a transaction's settlement metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPosition {
    pub mint: String,
    pub ui_amount: Option<f64>,
}

/// A parsed transaction reduced to what the activity pipeline needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRecord {
    pub signature: String,
    pub block_time: Option<i64>,
    pub has_meta: bool,
    pub pre_token_balances: Vec<TokenPosition>,
    pub post_token_balances: Vec<TokenPosition>,
}

/// Read-only view of the chain. The wallet pipelines depend on this trait
/// rather than the RPC client directly so tests can substitute stubs.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// All SPL token-account balances owned by `owner`.
    async fn token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenAccountBalance>>;

    /// The most recent `limit` transaction signatures for `address`,
    /// newest first per upstream ordering.
    async fn recent_signatures(&self, address: &Pubkey, limit: usize) -> Result<Vec<String>>;

    /// The parsed transaction for one signature.
    async fn parsed_transaction(&self, signature: &str) -> Result<TransactionRecord>;

    async fn health(&self) -> Result<()>;
}

/// `ChainReader` backed by the nonblocking Solana RPC client.
pub struct SolanaReader {
    client: RpcClient,
}

impl SolanaReader {
    pub fn new(config: &Config) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            config.solana_rpc_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            CommitmentConfig::confirmed(),
        );
        Self { client }
    }
}

#[async_trait]
impl ChainReader for SolanaReader {
    async fn token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenAccountBalance>> {
        let accounts = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::id()))
            .await
            .map_err(|e| AppError::BlockchainRpc(e.to_string()))?;

        let mut balances = Vec::new();
        for keyed_account in accounts {
            if let UiAccountData::Json(parsed_account) = keyed_account.account.data {
                if let Some(balance) = token_balance_from_parsed(&parsed_account.parsed) {
                    balances.push(balance);
                }
            }
        }

        tracing::debug!("token_accounts owner={} count={}", owner, balances.len());
        Ok(balances)
    }

    async fn recent_signatures(&self, address: &Pubkey, limit: usize) -> Result<Vec<String>> {
        let config = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: None,
            limit: Some(limit),
            commitment: Some(CommitmentConfig::confirmed()),
        };
        let signatures = self
            .client
            .get_signatures_for_address_with_config(address, config)
            .await
            .map_err(|e| AppError::BlockchainRpc(e.to_string()))?;

        Ok(signatures.into_iter().map(|s| s.signature).collect())
    }

    async fn parsed_transaction(&self, signature: &str) -> Result<TransactionRecord> {
        let parsed_signature = Signature::from_str(signature)
            .map_err(|e| AppError::BadRequest(format!("Invalid transaction signature: {}", e)))?;
        let transaction = self
            .client
            .get_transaction_with_config(
                &parsed_signature,
                RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::JsonParsed),
                    commitment: Some(CommitmentConfig::confirmed()),
                    max_supported_transaction_version: Some(0),
                },
            )
            .await
            .map_err(|e| AppError::BlockchainRpc(e.to_string()))?;

        Ok(record_from_transaction(
            signature,
            transaction.block_time,
            transaction.transaction.meta.as_ref(),
        ))
    }

    async fn health(&self) -> Result<()> {
        self.client
            .get_health()
            .await
            .map_err(|e| AppError::BlockchainRpc(e.to_string()))
    }
}

// Internal helper that extracts a balance from one jsonParsed token account.
fn token_balance_from_parsed(parsed: &serde_json::Value) -> Option<TokenAccountBalance> {
    let info = parsed.get("info")?;
    let account = serde_json::from_value::<UiTokenAccount>(info.clone()).ok()?;
    Some(TokenAccountBalance {
        mint: account.mint,
        amount: account.token_amount.amount,
        decimals: account.token_amount.decimals,
    })
}

fn record_from_transaction(
    signature: &str,
    block_time: Option<i64>,
    meta: Option<&UiTransactionStatusMeta>,
) -> TransactionRecord {
    let Some(meta) = meta else {
        return TransactionRecord {
            signature: signature.to_string(),
            block_time,
            ..Default::default()
        };
    };

    TransactionRecord {
        signature: signature.to_string(),
        block_time,
        has_meta: true,
        pre_token_balances: positions_from_balances(meta.pre_token_balances.clone().into()),
        post_token_balances: positions_from_balances(meta.post_token_balances.clone().into()),
    }
}

fn positions_from_balances(balances: Option<Vec<UiTransactionTokenBalance>>) -> Vec<TokenPosition> {
    balances
        .unwrap_or_default()
        .into_iter()
        .map(|balance| TokenPosition {
            mint: balance.mint,
            ui_amount: balance.ui_token_amount.ui_amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solana_account_decoder::parse_token::UiTokenAmount;
    use solana_transaction_status::option_serializer::OptionSerializer;

    fn ui_balance(mint: &str, ui_amount: Option<f64>) -> UiTransactionTokenBalance {
        UiTransactionTokenBalance {
            account_index: 0,
            mint: mint.to_string(),
            ui_token_amount: UiTokenAmount {
                ui_amount,
                decimals: 6,
                amount: "0".to_string(),
                ui_amount_string: "0".to_string(),
            },
            owner: OptionSerializer::Skip,
            program_id: OptionSerializer::Skip,
        }
    }

    #[test]
    fn token_balance_from_parsed_reads_amount_and_decimals() {
        let parsed = json!({
            "type": "account",
            "info": {
                "isNative": false,
                "mint": "MintA",
                "owner": "OwnerA",
                "state": "initialized",
                "tokenAmount": {
                    "amount": "1",
                    "decimals": 0,
                    "uiAmount": 1.0,
                    "uiAmountString": "1"
                }
            }
        });
        let balance = token_balance_from_parsed(&parsed).unwrap();
        assert_eq!(balance.mint, "MintA");
        assert_eq!(balance.amount, "1");
        assert_eq!(balance.decimals, 0);
    }

    #[test]
    fn token_balance_from_parsed_ignores_non_token_payloads() {
        assert!(token_balance_from_parsed(&json!({"type": "mint"})).is_none());
        assert!(token_balance_from_parsed(&json!({"info": {"unexpected": true}})).is_none());
    }

    #[test]
    fn positions_keep_mint_and_ui_amount() {
        let positions =
            positions_from_balances(Some(vec![ui_balance("MintA", Some(5.0)), ui_balance("MintB", None)]));
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].mint, "MintA");
        assert_eq!(positions[0].ui_amount, Some(5.0));
        assert_eq!(positions[1].ui_amount, None);
    }

    #[test]
    fn record_without_meta_is_flagged() {
        let record = record_from_transaction("sig", Some(1_700_000_000), None);
        assert!(!record.has_meta);
        assert_eq!(record.block_time, Some(1_700_000_000));
        assert!(record.pre_token_balances.is_empty());
    }
}
