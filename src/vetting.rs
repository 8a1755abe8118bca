//! `VettingPipeline`: periodically discovers registered pools, vets their
//! metadata and relay reachability through a fixed worker pool, and feeds
//! the results into the shared [`ProducerBuffer`].

use crate::buffer::ProducerBuffer;
use crate::metadata::MetadataVerifier;
use crate::model::{PoolParameters, Producer, Relay};
use crate::probe;
use crate::ws_client::BlockchainQueryClient;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Fixed worker-pool size matching the upstream's own constant.
const MAX_WORKERS: usize = 16;

pub struct VettingPipeline {
    query: Arc<Mutex<BlockchainQueryClient>>,
    buffer: Arc<ProducerBuffer>,
    probe_timeout: Duration,
}

impl VettingPipeline {
    pub fn new(endpoint: String, buffer: Arc<ProducerBuffer>, probe_timeout: Duration) -> Self {
        Self {
            query: Arc::new(Mutex::new(BlockchainQueryClient::new(endpoint))),
            buffer,
            probe_timeout,
        }
    }

    /// Runs the refill loop forever, sleeping `period` between cycles.
    pub async fn run(self, period: Duration) {
        loop {
            if let Err(err) = self.run_once().await {
                tracing::warn!(%err, "vetting cycle failed, will retry next period");
            }
            tokio::time::sleep(period).await;
        }
    }

    async fn run_once(&self) -> anyhow::Result<()> {
        let mut pool_ids = {
            let client = self.query.lock().await;
            client.list_pool_ids().await?
        };

        let mut rng = rand::rngs::StdRng::from_entropy();
        pool_ids.shuffle(&mut rng);

        let verifier = Arc::new(MetadataVerifier::new());
        let mut handles = Vec::with_capacity(pool_ids.len());
        let semaphore = Arc::new(tokio::sync::Semaphore::new(MAX_WORKERS));

        for pool_id in pool_ids {
            let query = self.query.clone();
            let buffer = self.buffer.clone();
            let verifier = verifier.clone();
            let semaphore = semaphore.clone();
            let probe_timeout = self.probe_timeout;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                vet_one_pool(&pool_id, query, buffer, verifier, probe_timeout).await;
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }

        Ok(())
    }
}

async fn vet_one_pool(
    pool_id: &str,
    query: Arc<Mutex<BlockchainQueryClient>>,
    buffer: Arc<ProducerBuffer>,
    verifier: Arc<MetadataVerifier>,
    probe_timeout: Duration,
) {
    let params = {
        let client = query.lock().await;
        match client.get_pool_parameters(pool_id).await {
            Ok(p) => p,
            Err(err) => {
                tracing::debug!(%pool_id, %err, "failed to fetch pool parameters");
                return;
            }
        }
    };

    if params.relays.is_empty() {
        return;
    }

    if !verify_metadata(&params, &verifier).await {
        return;
    }

    for relay in &params.relays {
        if let Some(producer) = probe_and_resolve(relay, probe_timeout).await {
            buffer.try_push(producer);
        }
    }
}

async fn verify_metadata(params: &PoolParameters, verifier: &MetadataVerifier) -> bool {
    let Some(metadata) = &params.metadata else { return false };
    match verifier.verify(&metadata.url, &metadata.hash).await {
        Ok(()) => true,
        Err(err) => {
            tracing::info!(pool_id = %params.id, %err, "pool metadata rejected");
            false
        }
    }
}

async fn probe_and_resolve(relay: &Relay, probe_timeout: Duration) -> Option<Producer> {
    if let Some(ip) = &relay.ipv4 {
        return probe_literal(ip, relay.port, probe_timeout).await;
    }
    if let Some(ip) = &relay.ipv6 {
        return probe_literal(ip, relay.port, probe_timeout).await;
    }
    if let Some(host) = &relay.hostname {
        return probe_hostname(host, relay.port, probe_timeout).await;
    }
    None
}

async fn probe_literal(addr: &str, port: u16, timeout: Duration) -> Option<Producer> {
    let host_port = format!("{addr}:{port}");
    if probe::is_reachable(&host_port, timeout).await {
        Some(Producer { addr: addr.to_string(), port, valency: 1 })
    } else {
        None
    }
}

async fn probe_hostname(host: &str, port: u16, timeout: Duration) -> Option<Producer> {
    let host_port = format!("{host}:{port}");
    if !probe::is_reachable(&host_port, timeout).await {
        return None;
    }
    let valency = match tokio::net::lookup_host((host, port)).await {
        Ok(addrs) => addrs.count() as u32,
        Err(_) => return None,
    };
    Some(Producer { addr: host.to_string(), port, valency })
}
