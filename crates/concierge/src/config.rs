use std::env;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};

const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
const TAVILY_API_KEY: &str = "TAVILY_API_KEY";
const OPENWEATHERMAP_API_KEY: &str = "OPENWEATHERMAP_API_KEY";

/// The error type for an incomplete process configuration.
///
/// Carries every missing key at once, so the user can fix their
/// environment in a single pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    missing: Vec<&'static str>,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing one or more required API keys. Please check your .env file for: {}",
            self.missing.join(", ")
        )
    }
}

impl StdError for ConfigError {}

/// Credentials for the external services the concierge talks to.
#[derive(Clone)]
pub struct Config {
    /// Key for the Gemini model provider.
    pub google_api_key: String,
    /// Key for the Tavily web search API.
    pub tavily_api_key: String,
    /// Key for the OpenWeatherMap API.
    pub openweathermap_api_key: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Unset and empty keys are both treated as missing, and the check
    /// runs before any collaborator is constructed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut read = |key: &'static str| match lookup(key) {
            Some(value) if !value.is_empty() => value,
            _ => {
                missing.push(key);
                String::new()
            }
        };

        let google_api_key = read(GOOGLE_API_KEY);
        let tavily_api_key = read(TAVILY_API_KEY);
        let openweathermap_api_key = read(OPENWEATHERMAP_API_KEY);
        if !missing.is_empty() {
            return Err(ConfigError { missing });
        }

        Ok(Self {
            google_api_key,
            tavily_api_key,
            openweathermap_api_key,
        })
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("google_api_key", &"<redacted>")
            .field("tavily_api_key", &"<redacted>")
            .field("openweathermap_api_key", &"<redacted>")
            .finish()
    }
}
