use serde::{Deserialize, Serialize};

use crate::types::FoodKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub status_poll_interval_ms: u64,
    pub temperature_poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub http_port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.4.1".to_string(),
            status_poll_interval_ms: 1_000,
            temperature_poll_interval_ms: 3_000,
            request_timeout_ms: 5_000,
            http_port: 8080,
        }
    }
}

impl ClientConfig {
    pub fn sanitize(&mut self) {
        self.status_poll_interval_ms = self.status_poll_interval_ms.clamp(500, 10_000);
        self.temperature_poll_interval_ms = self.temperature_poll_interval_ms.clamp(1_000, 60_000);
        // Bounded so a hung device cannot stack overlapping polls.
        self.request_timeout_ms = self.request_timeout_ms.clamp(1_000, 30_000);

        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
    }
}

/// Per-food minutes-per-gram calibration. Domain constants, not derived;
/// kept as configuration so recalibrating does not touch the estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub bread: f64,
    pub chicken: f64,
    pub potatoes: f64,
    pub pizza: f64,
    pub rice: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            bread: 0.04,
            chicken: 0.12,
            potatoes: 0.08,
            pizza: 0.05,
            rice: 0.06,
        }
    }
}

impl RateTable {
    pub fn minutes_per_gram(&self, food: FoodKind) -> Option<f64> {
        match food {
            FoodKind::Bread => Some(self.bread),
            FoodKind::Chicken => Some(self.chicken),
            FoodKind::Potatoes => Some(self.potatoes),
            FoodKind::Pizza => Some(self.pizza),
            FoodKind::Rice => Some(self.rice),
            FoodKind::Other => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub rates: RateTable,
}

impl RuntimeConfig {
    pub fn sanitize(&mut self) {
        self.client.sanitize();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_config_file_is_all_defaults() {
        let parsed: RuntimeConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(parsed.client.base_url, ClientConfig::default().base_url);
        assert_eq!(parsed.rates.chicken, RateTable::default().chicken);
    }

    #[test]
    fn config_file_may_override_one_section_only() {
        let parsed: RuntimeConfig = serde_json::from_str(
            r#"{"rates":{"bread":0.05,"chicken":0.12,"potatoes":0.08,"pizza":0.05,"rice":0.07}}"#,
        )
        .unwrap();

        assert_eq!(parsed.client.status_poll_interval_ms, 1_000);
        assert_eq!(parsed.rates.bread, 0.05);
        assert_eq!(parsed.rates.rice, 0.07);
    }

    #[test]
    fn sanitize_bounds_intervals_and_timeout() {
        let mut runtime = RuntimeConfig::default();
        runtime.client.request_timeout_ms = 600_000;
        runtime.client.status_poll_interval_ms = 1;
        runtime.client.base_url = "http://oven.local/".to_string();

        runtime.sanitize();

        assert_eq!(runtime.client.request_timeout_ms, 30_000);
        assert_eq!(runtime.client.status_poll_interval_ms, 500);
        assert_eq!(runtime.client.base_url, "http://oven.local");
    }
}
