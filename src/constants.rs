/// Application constants

// API version
pub const API_VERSION: &str = "v1";

// Activity lookback: number of recent signatures fetched per lookup
pub const SIGNATURE_FETCH_LIMIT: usize = 20;

// Upstream fan-out bound for per-item fetches (metadata, transactions)
pub const MAX_INFLIGHT_FETCHES: usize = 8;

// Per-request timeout against the RPC node and the metadata catalog
pub const UPSTREAM_TIMEOUT_SECS: u64 = 10;

// Non-fungible heuristic: raw balance of exactly one indivisible unit
pub const NFT_RAW_AMOUNT: &str = "1";
pub const NFT_DECIMALS: u8 = 0;
