use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::home_dir::resolve_home_dir;

/// Client configuration: where the remote API lives, where the session is
/// kept between runs and how logging is routed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Remote API connection settings.
    pub api: ApiConfig,
    /// Durable session storage settings.
    pub session: SessionConfig,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Origin of the remote API, e.g. `http://localhost:8080`. The fixed `/api`
    /// base path is appended by the client.
    pub base_url: String,
    /// Transport timeout in seconds; 0 leaves requests unbounded.
    #[serde(default)]
    pub timeout_sec: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub home_dir: String, // will be normalized to absolute path
    /// Session file name, relative to `home_dir` unless absolute.
    #[serde(default = "default_session_file")]
    pub file: String,
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    pub file: String,          // "logs/clinic.log"
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>, // How many files to keep
    #[serde(default)]
    pub max_size_mb: Option<u64>, // Max size of the file in MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_sec: 0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // Empty => platform default: $HOME/.consultorio or %APPDATA%/.consultorio
            home_dir: String::new(),
            file: default_session_file(),
        }
    }
}

fn default_session_file() -> String {
    "session.json".to_string()
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "warn".to_string(),
            file: "logs/clinic.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(10),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    /// Also normalizes `session.home_dir` into an absolute path and creates the directory.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let path = config_path.as_ref();
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }

        // Logging stays None unless YAML/ENV provide it.
        let base = AppConfig {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            logging: None,
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            // Example: APP__API__BASE_URL=https://clinic.example maps to api.base_url
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())?;

        config.finish()?;
        Ok(config)
    }

    /// Load configuration from file or create with default values.
    /// Also normalizes `session.home_dir` into an absolute path and creates the directory.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                c.finish().context("Failed to prepare default configuration")?;
                Ok(c)
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        validate_base_url(&self.api.base_url)?;
        normalize_home_dir_inplace(&mut self.session)
            .context("Failed to resolve session.home_dir")?;
        Ok(())
    }

    /// Absolute path of the session file.
    pub fn session_file(&self) -> PathBuf {
        let p = Path::new(&self.session.file);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            Path::new(&self.session.home_dir).join(p)
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<()> {
        if let Some(url) = &args.api_url {
            validate_base_url(url)?;
            self.api.base_url = url.clone();
        }

        // Set logging level based on verbose flags for "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            default_section.console_level = match args.verbose {
                0 => default_section.console_level.clone(), // keep
                1 => "info".to_string(),
                2 => "debug".to_string(),
                _ => "trace".to_string(),
            };
        }
        Ok(())
    }
}

/// Command line arguments relevant to configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub api_url: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

const fn default_subdir() -> &'static str {
    ".consultorio"
}

fn validate_base_url(raw: &str) -> Result<()> {
    let url = url::Url::parse(raw.trim())
        .with_context(|| format!("Invalid api.base_url '{}'", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("Unsupported api.base_url scheme '{}'", other),
    }
}

/// Normalize `session.home_dir` and store the absolute path back.
fn normalize_home_dir_inplace(session: &mut SessionConfig) -> Result<()> {
    // Treat empty string as "not provided" => None.
    let opt = if session.home_dir.trim().is_empty() {
        None
    } else {
        Some(session.home_dir.clone())
    };

    let resolved: PathBuf = resolve_home_dir(opt, default_subdir(), /*create*/ true)
        .context("home_dir normalization failed")?;

    session.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}
