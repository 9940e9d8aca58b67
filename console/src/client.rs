use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use oven_common::{ClientConfig, CommandOutcome, CookSpec, DeviceSnapshot, PollResult};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the oven's four endpoints. Holds no session state; every
/// operation is independently retryable and every request carries the
/// configured timeout so a hung device cannot stack overlapping polls.
#[derive(Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: String,
}

impl DeviceClient {
    /// Fails rather than falling back to a client without the bounded
    /// timeout; an unbounded poll can stack behind a hung device.
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build device http client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetches one status snapshot. Transport errors, non-success statuses,
    /// and undecodable bodies all collapse into `Unreachable`.
    pub async fn poll_status(&self) -> PollResult {
        let url = format!("{}/status", self.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<DeviceSnapshot>().await {
                    Ok(snapshot) => PollResult::Snapshot(snapshot),
                    Err(err) => {
                        warn!("status payload decode failed: {err}");
                        PollResult::Unreachable
                    }
                }
            }
            Ok(response) => {
                warn!("status poll returned {}", response.status());
                PollResult::Unreachable
            }
            Err(err) => {
                warn!("status poll failed: {err}");
                PollResult::Unreachable
            }
        }
    }

    /// Fetches the current temperature as plain numeric text. Independent of
    /// the status poll; failure yields `None` and nothing else.
    pub async fn poll_temperature(&self) -> Option<f64> {
        let url = format!("{}/temperature", self.base_url);

        let response = self.http.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }

        let body = response.text().await.ok()?;
        body.trim().parse::<f64>().ok().filter(|t| t.is_finite())
    }

    /// Asks the device to start a timed cook cycle. The context, when
    /// present, rides along for the device's own display.
    pub async fn start_cooking(&self, seconds: u32, context: Option<&CookSpec>) -> CommandOutcome {
        let url = format!("{}/start-cooking", self.base_url);

        let mut form = vec![("seconds".to_string(), seconds.to_string())];
        if let Some(spec) = context {
            form.push(("foodType".to_string(), spec.food.as_str().to_string()));
            if let Some(grams) = spec.weight_grams {
                form.push(("weight".to_string(), grams.to_string()));
            }
        }

        match self.http.post(&url).form(&form).send().await {
            Ok(response) if response.status().is_success() => CommandOutcome::Accepted,
            Ok(response) => CommandOutcome::Rejected(rejection_reason(response).await),
            Err(err) => CommandOutcome::Rejected(format!("start request failed: {err}")),
        }
    }

    pub async fn stop_cooking(&self) -> CommandOutcome {
        let url = format!("{}/stop-cooking", self.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => CommandOutcome::Accepted,
            Ok(response) => CommandOutcome::Rejected(rejection_reason(response).await),
            Err(err) => CommandOutcome::Rejected(format!("stop request failed: {err}")),
        }
    }
}

/// Pulls the remote's reason out of an error response, verbatim where the
/// device sent one.
async fn rejection_reason(response: reqwest::Response) -> String {
    let status = response.status();

    match response.text().await {
        Ok(body) if !body.trim().is_empty() => serde_json::from_str::<ErrorBody>(&body)
            .map(|parsed| parsed.error)
            .unwrap_or(body),
        _ => format!("device returned {status}"),
    }
}
