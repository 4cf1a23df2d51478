use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

pub const TOKEN_SECRET_ENV: &str = "PAWPALS_TOKEN_SECRET";
pub const IMAGE_API_KEY_ENV: &str = "PAWPALS_IMAGE_API_KEY";
pub const PAYMENT_SECRET_ENV: &str = "PAWPALS_PAYMENT_SECRET";

#[derive(Parser, Debug)]
#[command(name = "pawpals", about = "Paw pals rescue server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub images: ImageStoreConfig,
    pub payments: PaymentConfig,
    pub pagination: PaginationConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Generated at startup when left empty.
    pub token_secret: String,
    pub token_hours: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ImageStoreConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Largest multipart body accepted on image upload routes.
    pub max_upload_bytes: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PaymentConfig {
    pub endpoint: String,
    pub secret_key: String,
    pub currency: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_hours: 6,
        }
    }
}

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.imgbb.com/1/upload".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.stripe.com/v1/payment_intents".to_string(),
            secret_key: String::new(),
            currency: "usd".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        Self::load_with_env(cli, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an injectable environment lookup.
    pub fn load_with_env(
        cli: &Cli,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli)?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // Secrets from the environment beat the file
        if let Some(secret) = env(TOKEN_SECRET_ENV) {
            config.auth.token_secret = secret;
        }
        if let Some(key) = env(IMAGE_API_KEY_ENV) {
            config.images.api_key = key;
        }
        if let Some(secret) = env(PAYMENT_SECRET_ENV) {
            config.payments.secret_key = secret;
        }

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }

        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("pawpals.db"));
        }

        if config.pagination.max_limit == 0 {
            anyhow::bail!("pagination.max_limit must be greater than zero");
        }
        if config.images.max_upload_bytes == 0 {
            anyhow::bail!("images.max_upload_bytes must be greater than zero");
        }
        if config.auth.token_hours == 0 {
            anyhow::bail!("auth.token_hours must be greater than zero");
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &cli.data_dir {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".pawpals"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("pawpals.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn cli_for(dir: &std::path::Path) -> Cli {
        Cli {
            config: None,
            host: None,
            port: None,
            data_dir: Some(dir.to_path_buf()),
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_hours, 6);
        assert!(config.auth.token_secret.is_empty());
        assert_eq!(config.payments.currency, "usd");
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.images.max_upload_bytes, 16 * 1024 * 1024);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli_for(std::path::Path::new("/tmp/test-pawpals"));
        assert_eq!(
            Config::data_dir(&cli).unwrap(),
            PathBuf::from("/tmp/test-pawpals")
        );
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_with_env(&cli_for(tmp.path()), no_env).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.db_path(), tmp.path().join("pawpals.db"));
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            r#"
[server]
port = 9000

[auth]
token_secret = "from-file"
token_hours = 2

[payments]
currency = "eur"

[images]
max_upload_bytes = 1048576

[pagination]
default_limit = 12
"#,
        )
        .unwrap();

        let config = Config::load_with_env(&cli_for(tmp.path()), no_env).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.token_secret, "from-file");
        assert_eq!(config.auth.token_hours, 2);
        assert_eq!(config.payments.currency, "eur");
        assert_eq!(config.pagination.default_limit, 12);
        assert_eq!(config.pagination.max_limit, 100);
        assert_eq!(config.images.max_upload_bytes, 1024 * 1024);
    }

    #[test]
    fn env_secrets_beat_file_values() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[auth]\ntoken_secret = \"from-file\"\n",
        )
        .unwrap();

        let config = Config::load_with_env(&cli_for(tmp.path()), |key| match key {
            TOKEN_SECRET_ENV => Some("from-env".to_string()),
            PAYMENT_SECRET_ENV => Some("sk_test".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.auth.token_secret, "from-env");
        assert_eq!(config.payments.secret_key, "sk_test");
        assert!(config.images.api_key.is_empty());
    }

    #[test]
    fn cli_overrides_beat_toml_values() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[server]\nhost = \"192.168.1.1\"\nport = 9000\n",
        )
        .unwrap();

        let cli = Cli {
            host: Some("10.0.0.1".to_string()),
            port: Some(4000),
            ..cli_for(tmp.path())
        };
        let config = Config::load_with_env(&cli, no_env).unwrap();
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn zero_max_limit_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[pagination]\nmax_limit = 0\n",
        )
        .unwrap();

        assert!(Config::load_with_env(&cli_for(tmp.path()), no_env).is_err());
    }

    #[test]
    fn zero_upload_limit_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[images]\nmax_upload_bytes = 0\n",
        )
        .unwrap();

        assert!(Config::load_with_env(&cli_for(tmp.path()), no_env).is_err());
    }
}
