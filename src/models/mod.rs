// src/models/mod.rs
pub mod wallet;

// Re-export commonly used types so other modules can use `crate::models::X`
pub use wallet::{
    ApiResponse,
    BatchOutcome,
    ItemFailure,
    NftAsset,
    TokenTransferEvent,
    TransferDirection,
    WalletAddress,
};
