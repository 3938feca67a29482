//! Process configuration
//!
//! Every option can come from the command line or the environment (after
//! `.env` has been loaded). The secret key is read exactly once here and then
//! handed to the auth service; nothing re-reads it per request.

use std::net::SocketAddr;
use std::time::Duration;

use authgate_core::SecretKey;
use clap::Parser;

/// Command-line arguments for the authgate server
///
/// Deliberately not `Debug`: it holds the signing secret.
#[derive(Parser, Clone)]
#[command(name = "authgate-api")]
#[command(about = "Credential issuance service: register, login, bearer-protected routes")]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// HMAC secret used to sign and verify access tokens
    #[arg(long = "jwt-secret", env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// SQLite connection string for the credential store
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:authgate.db?mode=rwc")]
    pub database_url: String,

    /// Upper bound on a single credential store call, in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value = "5000")]
    pub store_timeout_ms: u64,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "5")]
    pub max_connections: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The configured secret, `None` when unset or empty
    pub fn secret_key(&self) -> Option<SecretKey> {
        self.jwt_secret.clone().and_then(SecretKey::new)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Filter directives used when `RUST_LOG` is not set
    pub fn log_directives(&self) -> &'static str {
        if self.verbose {
            "authgate_api=debug,authgate_core=debug,tower_http=debug"
        } else {
            "authgate_api=info,authgate_core=info,tower_http=debug"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("authgate-api").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_explicit_flags() {
        let args = parse(&[
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--jwt-secret",
            "abc",
            "--store-timeout-ms",
            "250",
        ]);

        assert_eq!(args.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(args.store_timeout(), Duration::from_millis(250));
        assert!(args.secret_key().is_some());
    }

    #[test]
    fn test_empty_secret_is_absent() {
        let args = parse(&["--jwt-secret", ""]);
        assert!(args.secret_key().is_none());
    }

    #[test]
    fn test_log_directives() {
        assert_eq!(
            parse(&[]).log_directives(),
            "authgate_api=info,authgate_core=info,tower_http=debug"
        );
        assert_eq!(
            parse(&["--verbose"]).log_directives(),
            "authgate_api=debug,authgate_core=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_invalid_host_rejected() {
        let args = parse(&["--host", "not a host"]);
        assert!(args.bind_addr().is_err());
    }
}
