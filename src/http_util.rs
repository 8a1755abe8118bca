//! Shared bounded-read helper used by every component that caps a response
//! body: stops pulling bytes off the socket once `limit` is reached, rather
//! than buffering the full body and truncating afterward. Mirrors the
//! upstream's `io.LimitReader(resp.Body, N)` pattern.

use futures_util::StreamExt;

pub async fn read_bounded(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut buf = Vec::with_capacity(limit.min(64 * 1024));

    while buf.len() < limit {
        match stream.next().await {
            Some(chunk) => {
                let chunk = chunk?;
                let remaining = limit - buf.len();
                if chunk.len() > remaining {
                    buf.extend_from_slice(&chunk[..remaining]);
                    break;
                }
                buf.extend_from_slice(&chunk);
            }
            None => break,
        }
    }

    Ok(buf)
}
