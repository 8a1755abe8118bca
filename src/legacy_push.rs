//! One-shot `push` subcommand: reads the current block height from the
//! configured blockchain query endpoint, then forwards a push notification
//! to a legacy directory service.

use crate::ws_client::BlockchainQueryClient;
use std::time::Duration;

const RESPONSE_CAP_BYTES: usize = 16 * 1024;
const DIAL_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn push(
    query_endpoint: &str,
    endpoint_url: &str,
    magic: u64,
    port: u16,
) -> anyhow::Result<String> {
    let query = BlockchainQueryClient::new(query_endpoint);
    let block_no = query.get_block_height().await?;

    let client = reqwest::Client::builder().timeout(DIAL_TIMEOUT).build()?;
    let url = format!("{endpoint_url}/htopology/v1/");

    let response = client
        .get(url)
        .query(&[
            ("magic", magic.to_string()),
            ("port", port.to_string()),
            ("blockNo", block_no.to_string()),
        ])
        .send()
        .await?;

    let capped = crate::http_util::read_bounded(response, RESPONSE_CAP_BYTES).await?;
    let value: serde_json::Value = serde_json::from_slice(&capped)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
