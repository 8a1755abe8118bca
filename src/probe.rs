//! `TCPReachabilityProbe`: a bare TCP connect/close within a deadline. Does
//! not speak the node wire protocol; a successful connect is the entire
//! signal.

use std::time::Duration;
use tokio::net::TcpStream;

pub async fn is_reachable(host_port: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(host_port)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(_)) | Err(_) => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn unreachable_port_fails_fast() {
        // Port 0 is never connectable.
        let ok = is_reachable("127.0.0.1:0", Duration::from_millis(200)).await;
        assert!(!ok);
    }
}
