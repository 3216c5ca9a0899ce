use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use common::Fixtures;
use common::gateway::{Latency, SimulatedGateway, SimulationRates};

use crate::state::AppState;

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub verify_success_rate: f64,
    pub payment_success_rate: f64,
    pub fixtures_yaml: Option<String>,
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value `{}`", name, raw)),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = parse_var(&lookup, "PORT", 8080)?;

        let delay_min_ms = parse_var(&lookup, "SIMULATED_DELAY_MIN_MS", 250)?;
        let delay_max_ms = parse_var(&lookup, "SIMULATED_DELAY_MAX_MS", 2000)?;

        let verify_success_rate = parse_var(&lookup, "VERIFY_SUCCESS_RATE", 0.85)?;
        let payment_success_rate = parse_var(&lookup, "PAYMENT_SUCCESS_RATE", 0.90)?;

        let fixtures_yaml = lookup("FIXTURES_YAML").filter(|p| !p.trim().is_empty());

        Ok(Self {
            host,
            port,
            delay_min_ms,
            delay_max_ms,
            verify_success_rate,
            payment_success_rate,
            fixtures_yaml,
        })
    }

    pub fn latency(&self) -> anyhow::Result<Latency> {
        Latency::from_millis(self.delay_min_ms, self.delay_max_ms)
            .context("SIMULATED_DELAY_MIN_MS must not exceed SIMULATED_DELAY_MAX_MS")
    }

    pub fn rates(&self) -> anyhow::Result<SimulationRates> {
        SimulationRates::new(self.verify_success_rate, self.payment_success_rate)
            .context("Invalid simulated success rates")
    }

    pub async fn create_app_state(&self) -> anyhow::Result<AppState> {
        let latency = self.latency()?;
        let rates = self.rates()?;

        let fixtures = match &self.fixtures_yaml {
            Some(path) => Fixtures::from_yaml_file(path).await?,
            None => Fixtures::embedded()?,
        };

        let gateway = SimulatedGateway::new(fixtures.session_user.vpa.clone(), rates, latency);
        Ok(AppState::new(fixtures, Arc::new(gateway), latency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!((config.delay_min_ms, config.delay_max_ms), (250, 2000));
        assert_eq!(config.verify_success_rate, 0.85);
        assert_eq!(config.payment_success_rate, 0.90);
        assert!(config.fixtures_yaml.is_none());
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = config(&[("PORT", "eighty")]).err().unwrap();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn out_of_range_settings_fail_later_checks() {
        let config = config(&[
            ("SIMULATED_DELAY_MIN_MS", "500"),
            ("SIMULATED_DELAY_MAX_MS", "100"),
            ("PAYMENT_SUCCESS_RATE", "1.5"),
        ])
        .unwrap();
        assert!(config.latency().is_err());
        assert!(config.rates().is_err());
    }

    #[tokio::test]
    async fn state_builds_from_embedded_fixtures() {
        let state = config(&[("SIMULATED_DELAY_MAX_MS", "0"), ("SIMULATED_DELAY_MIN_MS", "0")])
            .unwrap()
            .create_app_state()
            .await
            .unwrap();
        assert_eq!(state.session.vpa(), "teacher@paytm");
    }
}
