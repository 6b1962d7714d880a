use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time;
use tracing::{info, warn};

use crate::models::store::{self, Cluster};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// JSON-RPC client for the store backend. One endpoint, one request shape:
/// `{method, params, id: 1}` in, `{result: [...]}` out.
pub struct RpcClient {
    pub endpoint: String,
    http: Client,
    state: Mutex<ClientState>,
}

struct ClientState {
    healthy: bool,
    last_checked: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RpcRequest {
    pub method: &'static str,
    pub params: Vec<Value>,
    pub id: u32,
}

impl RpcRequest {
    pub fn new(method: &'static str, params: Vec<Value>) -> Self {
        Self {
            method,
            params,
            id: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<Value>,
}

/// Backend verdict on a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    LimitExceeded,
}

impl RpcClient {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            endpoint,
            http,
            state: Mutex::new(ClientState {
                healthy: true,
                last_checked: None,
            }),
        }
    }

    async fn call(&self, method: &'static str, params: Vec<Value>) -> Result<Vec<Value>, BoxError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&RpcRequest::new(method, params))
            .send()
            .await?;

        if resp.status().as_u16() >= 400 {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("{} returned {}: {}", method, status, body).into());
        }

        let parsed: RpcResponse = resp.json().await?;
        if let Some(err) = parsed.error {
            return Err(format!("{} failed: {}", method, err).into());
        }
        parsed
            .result
            .ok_or_else(|| format!("{} response carried no result", method).into())
    }

    /// Fetches and decodes the full cluster list, preserving backend order.
    pub async fn list(&self) -> Result<Vec<Cluster>, BoxError> {
        let result = self.call("list", vec![]).await?;
        let mut clusters = Vec::with_capacity(result.len());
        for raw in &result {
            let tuple = raw
                .as_array()
                .ok_or_else(|| format!("list element is not a tuple: {}", raw))?;
            clusters.push(store::decode_cluster(tuple)?);
        }
        Ok(clusters)
    }

    pub async fn detail(&self, id: &str) -> Result<Cluster, BoxError> {
        let result = self.call("detail", vec![Value::from(id)]).await?;
        let raw = result
            .first()
            .ok_or_else(|| format!("detail returned no tuple for id {:?}", id))?;
        let tuple = raw
            .as_array()
            .ok_or_else(|| format!("detail element is not a tuple: {}", raw))?;
        Ok(store::decode_cluster(tuple)?)
    }

    pub async fn create(&self, name: &str) -> Result<CreateOutcome, BoxError> {
        let result = self.call("create", vec![Value::from(name)]).await?;

        // result[0][0] truthy means the user hit their cluster quota. An
        // undocumented response shape; see store::is_truthy.
        let flag = result
            .first()
            .map(|row| row[0].clone())
            .unwrap_or(Value::Null);
        if store::is_truthy(&flag) {
            Ok(CreateOutcome::LimitExceeded)
        } else {
            Ok(CreateOutcome::Created)
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), BoxError> {
        self.call("delete", vec![Value::from(id)]).await?;
        Ok(())
    }

    /// Kills the compute unit hosting a node. The backend names this "drop".
    pub async fn drop_node(&self, image_id: &str) -> Result<(), BoxError> {
        self.call("drop", vec![Value::from(image_id)]).await?;
        Ok(())
    }

    /// Cheap reachability probe; the list call doubles as the health check
    /// since the backend speaks nothing but RPC on this endpoint.
    pub async fn ping(&self) -> Result<(), BoxError> {
        let res = self.call("list", vec![]).await;
        let mut state = self.state.lock().unwrap();
        state.last_checked = Some(Utc::now());
        match res {
            Ok(_) => {
                state.healthy = true;
                Ok(())
            }
            Err(e) => {
                state.healthy = false;
                Err(e)
            }
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.state.lock().unwrap().healthy
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.state.lock().unwrap().last_checked
    }

    pub async fn run_health_checker(
        self: std::sync::Arc<Self>,
        mut shutdown: tokio::sync::watch::Receiver<()>,
    ) {
        if let Err(e) = self.ping().await {
            warn!("backend health check failed: {}", e);
        }

        let mut interval = time::interval(Duration::from_secs(15));
        interval.tick().await; // skip first immediate tick

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.ping().await {
                        warn!("backend health check failed: {}", e);
                    }
                }
                _ = shutdown.changed() => {
                    info!("health checker shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_to_the_wire_shape() {
        let req = RpcRequest::new("create", vec![json!("mycluster")]);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"method": "create", "params": ["mycluster"], "id": 1})
        );

        let req = RpcRequest::new("list", vec![]);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"method": "list", "params": [], "id": 1})
        );
    }

    #[test]
    fn limit_flag_reads_result_zero_zero() {
        let limited: RpcResponse = serde_json::from_value(json!({"result": [[1]]})).unwrap();
        let row = limited.result.unwrap();
        assert!(store::is_truthy(&row[0][0]));

        let ok: RpcResponse = serde_json::from_value(json!({"result": [[null]]})).unwrap();
        let row = ok.result.unwrap();
        assert!(!store::is_truthy(&row[0][0]));
    }
}
