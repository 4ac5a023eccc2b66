//! CLI argument definitions for the student advisor.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use advisor_core::config::AdvisorConfig;

/// Config file used when neither `--config` nor `ADVISOR_CONFIG` is given.
const DEFAULT_CONFIG_FILE: &str = "advisor.toml";

/// Conversational study and career advisor for students.
#[derive(Parser, Debug)]
#[command(name = "student-advisor", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ADVISOR_CONFIG env var > ./advisor.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        pick_config_path(self.config.clone(), std::env::var("ADVISOR_CONFIG").ok())
    }

    /// Resolve the HTTP server port.
    ///
    /// Priority: --port flag > ADVISOR_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        pick_port(self.port, std::env::var("ADVISOR_PORT").ok(), config_port)
    }

    /// Apply command-line and environment overrides to a loaded config.
    pub fn apply_overrides(&self, config: &mut AdvisorConfig) {
        if let Some(ref host) = self.host {
            config.general.host = host.clone();
        }
        config.general.port = self.resolve_port(config.general.port);
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

fn pick_config_path(flag: Option<PathBuf>, env: Option<String>) -> PathBuf {
    flag.or_else(|| env.filter(|p| !p.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn pick_port(flag: Option<u16>, env: Option<String>, config_port: u16) -> u16 {
    if let Some(p) = flag {
        return p;
    }
    if let Some(p) = env.and_then(|v| v.trim().parse::<u16>().ok()) {
        return p;
    }
    config_port
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::parse_from([
            "student-advisor",
            "--config",
            "/tmp/a.toml",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/a.toml")));
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_no_flags() {
        let args = CliArgs::parse_from(["student-advisor"]);
        assert!(args.config.is_none());
        assert!(args.port.is_none());
    }

    #[test]
    fn test_config_path_priority() {
        assert_eq!(
            pick_config_path(Some(PathBuf::from("flag.toml")), Some("env.toml".to_string())),
            PathBuf::from("flag.toml")
        );
        assert_eq!(
            pick_config_path(None, Some("env.toml".to_string())),
            PathBuf::from("env.toml")
        );
        assert_eq!(pick_config_path(None, None), PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(
            pick_config_path(None, Some("  ".to_string())),
            PathBuf::from(DEFAULT_CONFIG_FILE)
        );
    }

    #[test]
    fn test_port_priority() {
        assert_eq!(pick_port(Some(1), Some("2".to_string()), 3), 1);
        assert_eq!(pick_port(None, Some("2".to_string()), 3), 2);
        assert_eq!(pick_port(None, Some("not-a-port".to_string()), 3), 3);
        assert_eq!(pick_port(None, None, 3), 3);
    }

    #[test]
    fn test_apply_overrides() {
        let args = CliArgs::parse_from(["student-advisor", "--host", "0.0.0.0", "-p", "8123", "-l", "warn"]);
        let mut config = AdvisorConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.general.host, "0.0.0.0");
        assert_eq!(config.general.port, 8123);
        assert_eq!(config.general.log_level, "warn");
    }
}
