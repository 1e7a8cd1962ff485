use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;

use crate::cli::Cli;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub delivery: DeliverySettings,
    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorMode {
    /// Spawn `command` once per request and talk to it over stdin/stdout.
    #[default]
    Process,
    /// Synthesize records inside the server process.
    Builtin,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorSettings {
    #[serde(default)]
    pub mode: GeneratorMode,
    #[serde(default = "default_generator_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Upper bound for one generator round trip. Unset means wait forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// Treat a generator that prints nothing as a failure instead of `{}`.
    #[serde(default)]
    pub empty_output_is_error: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            mode: GeneratorMode::default(),
            command: default_generator_command(),
            args: Vec::new(),
            timeout_seconds: None,
            empty_output_is_error: false,
        }
    }
}

fn default_generator_command() -> String {
    "dataforge-generator".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliverySettings {
    #[serde(default = "default_delivery_timeout")]
    pub timeout_seconds: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_delivery_timeout(),
        }
    }
}

fn default_delivery_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UiSettings {
    /// Serve the builder page from disk instead of the embedded assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(File::from(cli.config.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("dataforge");
        let mut settings =
            Self::load(File::with_name(&config_path.to_string_lossy()).required(false))?;
        settings.resolve_relative_paths(Path::new(root));
        settings.validate()?;
        Ok(settings)
    }

    fn load<S>(file: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("DATAFORGE").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(command) = &cli.generator_command {
            self.generator.command = command.clone();
        }
        match cli.builtin_generator {
            Some(true) => self.generator.mode = GeneratorMode::Builtin,
            Some(false) => self.generator.mode = GeneratorMode::Process,
            None => {}
        }
        if let Some(dir) = &cli.static_dir {
            self.ui.static_dir = Some(dir.clone());
        }
    }

    fn resolve_relative_paths(&mut self, root: &Path) {
        if let Some(dir) = &self.ui.static_dir {
            if dir.is_relative() {
                self.ui.static_dir = Some(root.join(dir));
            }
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }
}
