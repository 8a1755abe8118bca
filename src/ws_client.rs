//! `BlockchainQueryClient`: one-shot JSON-over-WebSocket request/response
//! exchanges against the blockchain query backend. Every call opens a fresh
//! connection and closes it on return; the channel is not safe for
//! concurrent writers, so callers serialize access externally (see
//! [`crate::vetting`]).

use crate::errors::QueryError;
use crate::model::PoolParameters;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tokio_tungstenite::tungstenite::Message;

const METHOD_NAME: &str = "Query";
const SERVICE_NAME: &str = "p2p";
const QUERY_TYPE: &str = "jsonwsp/request";
const VERSION: &str = "1.0";

#[derive(Serialize)]
struct QueryEnvelope<Q> {
    methodname: &'static str,
    servicename: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    version: &'static str,
    args: QueryArgs<Q>,
}

#[derive(Serialize)]
struct QueryArgs<Q> {
    query: Q,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Query {
    Bare(&'static str),
    PoolParameters { #[serde(rename = "poolParameters")] pool_parameters: Vec<String> },
}

#[derive(Deserialize)]
struct Response<T> {
    result: T,
}

pub struct BlockchainQueryClient {
    endpoint: String,
}

impl BlockchainQueryClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    async fn exchange<Q: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        query: Q,
    ) -> Result<T, QueryError> {
        let (mut stream, _) = tokio_tungstenite::connect_async(&self.endpoint)
            .await
            .map_err(|e| QueryError::Unavailable(Box::new(e)))?;

        let envelope = QueryEnvelope {
            methodname: METHOD_NAME,
            servicename: SERVICE_NAME,
            kind: QUERY_TYPE,
            version: VERSION,
            args: QueryArgs { query },
        };
        let body = serde_json::to_string(&envelope)
            .map_err(|e| QueryError::Protocol(e.to_string()))?;

        stream
            .send(Message::Text(body.into()))
            .await
            .map_err(|e| QueryError::Unavailable(Box::new(e)))?;

        let msg = stream
            .next()
            .await
            .ok_or(QueryError::Timeout)?
            .map_err(|e| QueryError::Unavailable(Box::new(e)))?;

        let text = match msg {
            Message::Text(t) => t,
            other => return Err(QueryError::Protocol(format!("unexpected frame: {other:?}"))),
        };
        let _ = stream.close(None).await;

        let parsed: Response<T> =
            serde_json::from_str(&text).map_err(|e| QueryError::Protocol(e.to_string()))?;
        Ok(parsed.result)
    }

    pub async fn list_pool_ids(&self) -> Result<Vec<String>, QueryError> {
        self.exchange(Query::Bare("poolIds")).await
    }

    pub async fn get_block_height(&self) -> Result<i64, QueryError> {
        self.exchange(Query::Bare("blockHeight")).await
    }

    pub async fn get_pool_parameters(&self, pool_id: &str) -> Result<PoolParameters, QueryError> {
        let mut map: HashMap<String, Value> = self
            .exchange(Query::PoolParameters { pool_parameters: vec![pool_id.to_string()] })
            .await?;
        let value = map
            .remove(pool_id)
            .ok_or_else(|| QueryError::NotFound(pool_id.to_string()))?;
        serde_json::from_value(value).map_err(|e| QueryError::Protocol(e.to_string()))
    }
}
