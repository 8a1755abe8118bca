//! One-shot `fetch` subcommand: forwards a single request to a legacy
//! directory service, for operators migrating off it.

use std::time::Duration;

const RESPONSE_CAP_BYTES: usize = 16 * 1024;
const DIAL_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn fetch(endpoint_url: &str, magic: u64, max: u32, ipv: u32) -> anyhow::Result<String> {
    let client = reqwest::Client::builder().timeout(DIAL_TIMEOUT).build()?;
    let url = format!("{endpoint_url}/htopology/v1/fetch/");

    let response = client
        .get(url)
        .query(&[("magic", magic.to_string()), ("max", max.to_string()), ("ipv", ipv.to_string())])
        .send()
        .await?;

    let capped = crate::http_util::read_bounded(response, RESPONSE_CAP_BYTES).await?;
    let value: serde_json::Value = serde_json::from_slice(&capped)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
