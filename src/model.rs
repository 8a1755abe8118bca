//! Wire and domain types shared by the query client, vetting pipeline, and server.

use serde::{Deserialize, Serialize};

/// A vetted, servable relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Producer {
    pub addr: String,
    pub port: u16,
    pub valency: u32,
}

/// A relay as declared in a pool's on-chain parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct Relay {
    #[serde(default)]
    pub ipv4: Option<String>,
    #[serde(default)]
    pub ipv6: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolMetadataRef {
    pub url: String,
    pub hash: String,
}

/// Per-pool record as returned by `poolParameters` queries. Only `id`,
/// `relays`, and `metadata` drive vetting; the remaining fields are carried
/// through for parity with the on-chain record but otherwise unread.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolParameters {
    pub id: String,
    #[serde(default)]
    pub vrf: String,
    #[serde(default)]
    pub pledge: u64,
    #[serde(default)]
    pub cost: u64,
    #[serde(default)]
    pub margin: String,
    #[serde(default, rename = "rewardAccount")]
    pub reward_account: String,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub relays: Vec<Relay>,
    pub metadata: Option<PoolMetadataRef>,
}

/// Decoded, not-yet-validated `/htopology/v1/fetch/` query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchQuery {
    pub magic: Option<String>,
    pub max: Option<String>,
    pub ipv: Option<String>,
}

/// Validated fetch request, ready to drive a buffer drain.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest {
    pub magic: i64,
    pub max: usize,
    pub ip_version: i64,
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub resultcode: &'static str,
    pub datetime: String,
    #[serde(rename = "clientIp")]
    pub client_ip: String,
    pub iptype: i64,
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PullResponse {
    pub resultcode: &'static str,
    pub datetime: String,
    #[serde(rename = "clientIp")]
    pub client_ip: String,
    pub iptype: i64,
    pub msg: &'static str,
    #[serde(rename = "Producers")]
    pub producers: Vec<Producer>,
}
