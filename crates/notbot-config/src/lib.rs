//! notbot configuration.
//!
//! TOML-based configuration with validation. Every section has defaults so
//! partial configs work out of the box. Mapping strings are turned into a
//! typed [`Topology`] before any watcher starts.

pub mod mapping;
pub mod schema;
pub mod toml_loader;
pub mod validation;

use std::path::Path;

pub use mapping::{JitsiMapping, SpaceApiMapping, SpaceApiTarget};
pub use schema::NotbotConfig;
pub use toml_loader::ConfigSource;

use notbot_common::ConfigError;

/// Load config from `path`, or from the platform default location when
/// `path` is `None`. An explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<(NotbotConfig, ConfigSource), ConfigError> {
    match path {
        Some(path) => {
            let config = toml_loader::load_from_path(path)?;
            Ok((config, ConfigSource::File(path.to_path_buf())))
        }
        None => toml_loader::load_default(),
    }
}

/// Every watcher instance the config asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub jitsi: Vec<JitsiMapping>,
    pub spaceapi: Vec<SpaceApiTarget>,
}

impl Topology {
    pub fn watcher_count(&self) -> usize {
        self.jitsi.len() + self.spaceapi.len()
    }
}

/// Validate `config` and parse its mappings. Any error here is fatal.
pub fn resolve(config: &NotbotConfig) -> Result<Topology, ConfigError> {
    validation::validate(config)?;
    Ok(Topology {
        jitsi: mapping::parse_jitsi_mappings(&config.jitsi.mappings)?,
        spaceapi: mapping::parse_spaceapi_targets(&config.spaceapi.mappings)?,
    })
}

/// Serialize a config to a pretty-printed JSON string. Secrets are omitted.
pub fn config_to_json(config: &NotbotConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let config = NotbotConfig::default();
        let json = config_to_json(&config);
        for section in ["irc", "checkin", "jitsi", "spaceapi", "http", "logging"] {
            assert!(json.contains(&format!("\"{section}\"")), "missing {section}");
        }
    }

    #[test]
    fn config_to_json_omits_password() {
        let mut config = NotbotConfig::default();
        config.irc.password = Some("hunter2".into());
        let json = config_to_json(&config);
        assert!(!json.contains("hunter2"));
        assert!(!format!("{:?}", config.irc).contains("hunter2"));
    }

    #[test]
    fn resolve_builds_topology() {
        let mut config = NotbotConfig::default();
        config.jitsi.mappings = vec!["#a,meet.example.org,room".into()];
        config.spaceapi.mappings = vec![
            "#a,https://x.example/spaceapi".into(),
            "#b,https://x.example/spaceapi".into(),
        ];
        let topology = resolve(&config).unwrap();
        assert_eq!(topology.jitsi.len(), 1);
        assert_eq!(topology.spaceapi.len(), 1);
        assert_eq!(topology.spaceapi[0].channels, vec!["#a", "#b"]);
        assert_eq!(topology.watcher_count(), 2);
    }

    #[test]
    fn resolve_rejects_malformed_mapping() {
        let mut config = NotbotConfig::default();
        config.jitsi.mappings = vec!["#a,meet.example.org".into()];
        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Mapping { .. }));
    }

    #[test]
    fn resolve_rejects_invalid_ranges_before_mappings() {
        let mut config = NotbotConfig::default();
        config.http.timeout_secs = 0;
        config.jitsi.mappings = vec!["broken".into()];
        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn explicit_path_is_reported_as_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notbot.toml");
        std::fs::write(&path, "[irc]\nnick = \"watcher\"\n").unwrap();

        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(config.irc.nick, "watcher");
        assert_eq!(source, ConfigSource::File(path.clone()));
        assert_eq!(source.to_string(), path.display().to_string());
    }

    #[test]
    fn defaults_source_names_the_missing_file() {
        let source = ConfigSource::Defaults("/etc/notbot/config.toml".into());
        assert_eq!(
            source.to_string(),
            "built-in defaults (no file at /etc/notbot/config.toml)"
        );
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config(Some(Path::new("/tmp/definitely_not_here_notbot.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
