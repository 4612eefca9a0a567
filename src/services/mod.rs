// src/services/mod.rs

pub mod activity;
pub mod chain;
pub mod nft_catalog;
pub mod nfts;
