//! CLI definition

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConfigLayer;

/// sa-login - periodically log in to a Kubernetes auth endpoint with the
/// pod's service account token
#[derive(Parser, Debug)]
#[command(name = "sa-login")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file location (defaults to ~/.config/sa-login/config.yaml if present)
    #[arg(long, env = "SA_LOGIN_CONFIG", hide_env = true)]
    pub config: Option<PathBuf>,

    /// Auth endpoint host [default: 192.168.8.110]
    #[arg(long, env = "SA_LOGIN_HOST", hide_env = true)]
    pub host: Option<String>,

    /// Auth endpoint port [default: 8222]
    #[arg(long, env = "SA_LOGIN_PORT", hide_env = true)]
    pub port: Option<u16>,

    /// Login path [default: /v1/auth/kubernetes/login]
    #[arg(long, env = "SA_LOGIN_PATH", hide_env = true)]
    pub path: Option<String>,

    /// URL scheme, http or https [default: https]
    #[arg(long, env = "SA_LOGIN_SCHEME", hide_env = true)]
    pub scheme: Option<String>,

    /// Role sent with every login [default: testapp]
    #[arg(long, env = "SA_LOGIN_ROLE", hide_env = true)]
    pub role: Option<String>,

    /// Service account token file
    /// [default: /var/run/secrets/kubernetes.io/serviceaccount/token]
    #[arg(long, env = "SA_LOGIN_TOKEN_PATH", hide_env = true)]
    pub token_path: Option<PathBuf>,

    /// Seconds between logins [default: 15]
    #[arg(long = "interval", value_name = "SECS", env = "SA_LOGIN_INTERVAL", hide_env = true)]
    pub interval_secs: Option<u64>,

    /// Request timeout in seconds [default: 10]
    #[arg(long = "timeout", value_name = "SECS", env = "SA_LOGIN_TIMEOUT", hide_env = true)]
    pub timeout_secs: Option<u64>,

    /// Trust any server certificate (insecure)
    #[arg(long, env = "SA_LOGIN_INSECURE", hide_env = true)]
    pub insecure_skip_tls_verify: bool,

    /// Log in once immediately and exit with the result
    #[arg(long)]
    pub once: bool,

    /// Enable debug logging
    #[arg(long, env = "SA_LOGIN_DEBUG", hide_env = true)]
    pub debug: bool,
}

impl Cli {
    /// Settings given on the command line or through the environment.
    ///
    /// An unset `--insecure-skip-tls-verify` leaves the config file free to
    /// enable it.
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
            scheme: self.scheme.clone(),
            role: self.role.clone(),
            token_path: self.token_path.clone(),
            interval_secs: self.interval_secs,
            timeout_secs: self.timeout_secs,
            insecure_skip_tls_verify: self.insecure_skip_tls_verify.then_some(true),
        }
    }
}
