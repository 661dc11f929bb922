//! Shared REST cache client.
//!
//! Speaks the Upstash-style HTTP protocol: `GET {base}/get/{key}` and
//! `POST {base}/set/{key}?EX={ttl}` with a bearer token, responses wrapped in
//! a `{"result": ...}` envelope where `result` holds the stored string. Every
//! failure mode degrades to a cache miss; the resolver falls through to the
//! next tier instead of erroring.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::types::GameRecord;

pub struct SharedCache {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    ttl_secs: u64,
}

impl SharedCache {
    pub fn new(
        base_url: String,
        token: Option<String>,
        timeout_ms: u64,
        ttl_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url,
            token,
            ttl_secs,
        })
    }

    /// Fetch a cached slate. `None` covers miss, expiry, transport failure,
    /// and unreadable payloads alike.
    pub async fn get_games(&self, key: &str) -> Option<Vec<GameRecord>> {
        let url = format!("{}/get/{key}", self.base_url);
        let mut req = self.client.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(key, error = %e, "Shared cache unreachable");
                return None;
            }
        };
        if !resp.status().is_success() {
            debug!(key, status = %resp.status(), "Shared cache returned non-success");
            return None;
        }
        let envelope: serde_json::Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "Shared cache sent an unreadable body");
                return None;
            }
        };
        decode_envelope(key, &envelope)
    }

    /// Store a slate with the configured TTL. Best effort; a failed write
    /// only costs the next reader a tier walk.
    pub async fn put_games(&self, key: &str, games: &[GameRecord]) {
        let payload = match serde_json::to_string(games) {
            Ok(p) => p,
            Err(e) => {
                warn!(key, error = %e, "Could not encode slate for the shared cache");
                return;
            }
        };
        let url = format!("{}/set/{key}?EX={}", self.base_url, self.ttl_secs);
        let mut req = self.client.post(&url).body(payload);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        match req.send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(key, games = games.len(), "Wrote slate to the shared cache");
            }
            Ok(resp) => {
                warn!(key, status = %resp.status(), "Shared cache rejected the write");
            }
            Err(e) => {
                warn!(key, error = %e, "Shared cache write failed");
            }
        }
    }
}

/// Unwrap the `{"result": "<json>"}` envelope into records. `None` covers a
/// missing key, a non-string result, and a payload that no longer parses.
fn decode_envelope(key: &str, envelope: &serde_json::Value) -> Option<Vec<GameRecord>> {
    let payload = envelope.get("result")?.as_str()?;
    match serde_json::from_str(payload) {
        Ok(games) => Some(games),
        Err(e) => {
            warn!(key, error = %e, "Discarding undecodable cached slate");
            None
        }
    }
}
