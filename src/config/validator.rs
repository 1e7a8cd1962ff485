use thiserror::Error;

use crate::config::{
    DeliverySettings, GeneratorMode, GeneratorSettings, ServerSettings, Settings, UiSettings,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_generator(&settings.generator) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_delivery(&settings.delivery) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_ui(&settings.ui) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ConfigError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_generator(generator: &GeneratorSettings) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if generator.mode == GeneratorMode::Process && generator.command.trim().is_empty() {
            errors.push(ConfigError::MissingField("generator.command".to_string()));
        }

        if generator.timeout_seconds == Some(0) {
            errors.push(ConfigError::InvalidValue {
                field: "generator.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0 (omit it to wait indefinitely)".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_delivery(delivery: &DeliverySettings) -> Result<(), Vec<ConfigError>> {
        if delivery.timeout_seconds == 0 {
            return Err(vec![ConfigError::InvalidValue {
                field: "delivery.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            }]);
        }
        Ok(())
    }

    fn validate_ui(ui: &UiSettings) -> Result<(), Vec<ConfigError>> {
        match &ui.static_dir {
            Some(dir) if !dir.is_dir() => Err(vec![ConfigError::InvalidValue {
                field: "ui.static_dir".to_string(),
                reason: format!("'{}' is not a directory", dir.display()),
            }]),
            _ => Ok(()),
        }
    }
}
