use std::path::PathBuf;

use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::fallback_store::FallbackStore;
use crate::webhook_client::WebhookClient;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub delivery: DeliverySettings,
    pub fallback_store: FallbackStoreSettings,
    pub booking: BookingSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Request bodies above this size are refused with 413.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_body_bytes: usize,
}

#[derive(serde::Deserialize, Clone)]
pub struct DeliverySettings {
    pub webhook_url: Option<Secret<String>>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
    #[serde(default)]
    pub store_when_unconfigured: bool,
}

impl DeliverySettings {
    /// `None` when no webhook is configured.
    pub fn client(&self) -> Result<Option<WebhookClient>, reqwest::Error> {
        match self.webhook_url() {
            Some(url) => WebhookClient::new(url, self.timeout()).map(Some),
            None => Ok(None),
        }
    }

    pub fn webhook_url(&self) -> Option<Secret<String>> {
        self.webhook_url
            .as_ref()
            .filter(|url| !url.expose_secret().trim().is_empty())
            .cloned()
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct FallbackStoreSettings {
    pub path: PathBuf,
}

impl FallbackStoreSettings {
    pub fn store(&self) -> FallbackStore {
        FallbackStore::new(self.path.clone())
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct BookingSettings {
    pub booking_url: Option<String>,
}

impl BookingSettings {
    pub fn booking_url(&self) -> Option<String> {
        self.booking_url
            .as_ref()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // E.g. `APP_APPLICATION__PORT=5001` would set `Settings.application.port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        // Names used by existing deployments.
        .set_override_option("delivery.webhook_url", legacy_variable("CONTACT_WEBHOOK_URL"))?
        .set_override_option("booking.booking_url", legacy_variable("NEXT_PUBLIC_BOOKING_URL"))?
        .build()?;

    settings.try_deserialize::<Settings>()
}

fn legacy_variable(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
