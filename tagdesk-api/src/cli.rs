//! Command-line arguments
//!
//! Every option can also be supplied through its `TAGDESK_*` environment
//! variable; both take priority over the TOML file.

use clap::Parser;
use std::path::PathBuf;
use tagdesk_common::config::{default_config_path, Overrides};

/// Command-line arguments for tagdesk-api
#[derive(Parser, Debug)]
#[command(name = "tagdesk-api")]
#[command(about = "Customer complaint intake service with automatic tagging")]
#[command(version)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "TAGDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "TAGDESK_DATABASE")]
    pub database: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "TAGDESK_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TAGDESK_PORT")]
    pub port: Option<u16>,

    /// Log level or tracing filter directive
    #[arg(long, env = "TAGDESK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Base URL of the inference API (offline lexicon tagging when unset)
    #[arg(long, env = "TAGDESK_INFERENCE_ENDPOINT")]
    pub inference_endpoint: Option<String>,

    /// Bearer token for the inference API
    #[arg(long, env = "TAGDESK_INFERENCE_TOKEN", hide_env_values = true)]
    pub inference_token: Option<String>,
}

impl Args {
    /// Config file to read: `--config` or the platform default
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            database_path: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
            inference_endpoint: self.inference_endpoint.clone(),
            inference_token: self.inference_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        for var in [
            "TAGDESK_CONFIG",
            "TAGDESK_DATABASE",
            "TAGDESK_HOST",
            "TAGDESK_PORT",
            "TAGDESK_LOG_LEVEL",
            "TAGDESK_INFERENCE_ENDPOINT",
            "TAGDESK_INFERENCE_TOKEN",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_no_arguments() {
        clear_env();
        let args = Args::try_parse_from(["tagdesk-api"]).unwrap();
        let overrides = args.overrides();
        assert!(overrides.port.is_none());
        assert!(overrides.database_path.is_none());
        assert_eq!(args.config_path(), default_config_path());
    }

    #[test]
    #[serial]
    fn test_cli_arguments() {
        clear_env();
        let args = Args::try_parse_from([
            "tagdesk-api",
            "--port",
            "6001",
            "--database",
            "/tmp/complaints.db",
            "--inference-endpoint",
            "http://localhost:8080",
        ])
        .unwrap();
        let overrides = args.overrides();
        assert_eq!(overrides.port, Some(6001));
        assert_eq!(overrides.database_path, Some(PathBuf::from("/tmp/complaints.db")));
        assert_eq!(overrides.inference_endpoint.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    #[serial]
    fn test_environment_variables() {
        clear_env();
        env::set_var("TAGDESK_PORT", "6002");
        env::set_var("TAGDESK_INFERENCE_TOKEN", "hf_env");

        let args = Args::try_parse_from(["tagdesk-api"]).unwrap();
        assert_eq!(args.port, Some(6002));
        assert_eq!(args.inference_token.as_deref(), Some("hf_env"));

        // Command line beats environment
        let args = Args::try_parse_from(["tagdesk-api", "--port", "6003"]).unwrap();
        assert_eq!(args.port, Some(6003));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_rejected() {
        clear_env();
        assert!(Args::try_parse_from(["tagdesk-api", "--port", "99999"]).is_err());
    }
}
