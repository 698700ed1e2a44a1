use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::resolve_home_dir;

/// Top-level process configuration. `server` and `logging` are typed; module
/// sections stay raw until a module asks for them via `module_config`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// `None` falls back to `default_logging_config()` at startup.
    pub logging: Option<LoggingConfig>,
    /// Extra `<module>.yaml` files merged into `modules`.
    #[serde(default)]
    pub modules_dir: Option<String>,
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub home_dir: String, // normalized to an absolute path on load
    pub host: String,
    pub port: u16,
    /// Per-request handler timeout; 0 disables it.
    #[serde(default)]
    pub timeout_sec: u64,
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

/// Logging configuration - maps subsystem names (tracing target prefixes) to
/// their settings. Key "default" is the catch-all section.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// trace | debug | info | warn | error | off
    pub console_level: String,
    #[serde(default)]
    pub file: String, // "logs/registrations.log"; empty disables file output
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

fn default_cors_enabled() -> bool {
    true
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

const DEFAULT_SUBDIR: &str = ".registrations";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty => $HOME/.registrations
            home_dir: String::new(),
            host: "127.0.0.1".to_owned(),
            port: 8087,
            timeout_sec: 30,
            cors_enabled: default_cors_enabled(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

/// Console at info, debug-level JSON file under the home directory.
pub fn default_logging_config() -> LoggingConfig {
    HashMap::from([(
        "default".to_owned(),
        Section {
            console_level: "info".to_owned(),
            file: "logs/registrations.log".to_owned(),
            file_level: "debug".to_owned(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    )])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Built-in defaults, then the YAML file, then `APP__*` environment
    /// variables. The file must exist. `server.home_dir` comes back absolute
    /// and already created.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let config_path = config_path.as_ref();
        if !config_path.is_file() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        }

        // Optional sections stay None unless YAML/ENV provide them.
        let base = AppConfig {
            server: ServerConfig::default(),
            logging: None,
            modules_dir: None,
            modules: HashMap::new(),
        };

        // APP__SERVER__PORT=8087 lands in server.port
        let mut config: AppConfig = Figment::from(Serialized::defaults(base))
            .merge(Yaml::file(config_path))
            .merge(Env::prefixed("APP__").split("__"))
            .extract()
            .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

        resolve_server_home(&mut config.server)?;
        if let Some(dir) = config.modules_dir.as_deref() {
            merge_module_files(&mut config.modules, Path::new(dir))?;
        }
        Ok(config)
    }

    /// `load_layered` when a path is given, built-in defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_layered(path);
        }
        let mut config = Self::default();
        resolve_server_home(&mut config.server)?;
        Ok(config)
    }

    /// Effective configuration as YAML, for `--print-config` and `check`.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Cannot render configuration as YAML")
    }

    /// Typed view of a module's configuration; a missing entry yields `T::default()`.
    pub fn module_config<T>(&self, module_name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(module_name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("Invalid configuration for module '{module_name}'")),
            None => Ok(T::default()),
        }
    }

    /// `--port` replaces the configured port; each `-v` raises the default
    /// console level one step (debug, then trace).
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        self.server.port = args.port.unwrap_or(self.server.port);

        let level = match args.verbose {
            0 => return,
            1 => "debug",
            _ => "trace",
        };
        if let Some(section) = self
            .logging
            .get_or_insert_with(default_logging_config)
            .get_mut("default")
        {
            section.console_level = level.to_owned();
        }
    }
}

/// Command line arguments relevant to configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

fn resolve_server_home(server: &mut ServerConfig) -> Result<()> {
    let configured = Some(server.home_dir.trim().to_owned()).filter(|s| !s.is_empty());
    let home: PathBuf = resolve_home_dir(configured, DEFAULT_SUBDIR, true)
        .with_context(|| format!("Cannot prepare server.home_dir '{}'", server.home_dir))?;
    server.home_dir = home.to_string_lossy().into_owned();
    Ok(())
}

/// Each `<name>.yaml` / `<name>.yml` in `dir` becomes `modules.<name>`,
/// replacing an inline section of the same name. A missing dir is ignored.
fn merge_module_files(bag: &mut HashMap<String, serde_json::Value>, dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot list modules_dir {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        let name = path.file_stem().and_then(|s| s.to_str());
        let (true, Some(name)) = (is_yaml && path.is_file(), name) else {
            continue;
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read module config {}", path.display()))?;
        let value: serde_json::Value = serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid module config {}", path.display()))?;
        bag.insert(name.to_owned(), value);
    }
    Ok(())
}
