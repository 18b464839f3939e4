use crate::application::simulator::SimulationConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub simulation: SimulationSettings,
    pub seed: SeedSettings,
    pub project: ProjectConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationSettings {
    pub update_interval_ms: u64,
    pub alert_probability: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            update_interval_ms: 3000,
            alert_probability: 0.1,
        }
    }
}

impl SimulationSettings {
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn to_simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            alert_probability: self.alert_probability,
        }
    }
}

/// Where the initial telemetry comes from. A URL takes precedence over a path.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeedSettings {
    pub path: String,
    pub url: Option<String>,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            path: "data/monitoring-data.json".to_string(),
            url: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub location: String,
    pub start_date: String,
    pub planned_completion: String,
    /// Square metres the project is expected to cover.
    pub planned_area: f64,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Grass-grid laying project".to_string(),
            location: "South-eastern edge of the Tengger Desert".to_string(),
            start_date: "2024-01-15".to_string(),
            planned_completion: "2024-06-30".to_string(),
            planned_area: 5000.0,
        }
    }
}

/// Defaults, then `config/app.*` if present, then `SANDCTL__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(env_source())
        .build()?;

    parse_app_config(settings)
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix("SANDCTL")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn parse_app_config(settings: config::Config) -> anyhow::Result<AppConfig> {
    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

impl AppConfig {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.simulation.update_interval_ms > 0,
            "simulation.update_interval_ms must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.simulation.alert_probability),
            "simulation.alert_probability must be within [0, 1], got {}",
            self.simulation.alert_probability
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> anyhow::Result<AppConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        parse_app_config(settings)
    }

    #[test]
    fn test_defaults_apply_to_empty_file() {
        let app_config = from_toml("").unwrap();
        assert_eq!(app_config.server.bind, "0.0.0.0:8080");
        assert_eq!(app_config.simulation.update_interval(), Duration::from_secs(3));
        assert_eq!(app_config.simulation.alert_probability, 0.1);
        assert_eq!(app_config.seed.path, "data/monitoring-data.json");
        assert!(app_config.seed.url.is_none());
    }

    #[test]
    fn test_partial_override() {
        let app_config = from_toml(
            r#"
            [simulation]
            update_interval_ms = 500

            [seed]
            url = "http://localhost:9000/monitoring-data.json"
            "#,
        )
        .unwrap();
        assert_eq!(app_config.simulation.update_interval_ms, 500);
        assert_eq!(app_config.simulation.alert_probability, 0.1);
        assert_eq!(
            app_config.seed.url.as_deref(),
            Some("http://localhost:9000/monitoring-data.json")
        );
    }

    #[test]
    fn test_environment_overrides_file() {
        let vars = [
            ("SANDCTL__SIMULATION__UPDATE_INTERVAL_MS", "750"),
            ("SANDCTL__SERVER__BIND", "127.0.0.1:9090"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[simulation]\nupdate_interval_ms = 500",
                config::FileFormat::Toml,
            ))
            .add_source(env_source().source(Some(vars)))
            .build()
            .unwrap();
        let app_config = parse_app_config(settings).unwrap();

        assert_eq!(app_config.simulation.update_interval_ms, 750);
        assert_eq!(app_config.server.bind, "127.0.0.1:9090");
        assert_eq!(app_config.simulation.alert_probability, 0.1);
    }

    #[test]
    fn test_rejects_invalid_simulation_settings() {
        assert!(from_toml("[simulation]\nupdate_interval_ms = 0").is_err());
        assert!(from_toml("[simulation]\nalert_probability = 1.5").is_err());
    }
}
