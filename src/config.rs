use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    // Twilio account identifier, auth secret and sending number
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_phone_number: Option<String>,

    #[serde(default = "default_twilio_api_base")]
    pub twilio_api_base: String,

    // Comma-separated emergency contacts
    pub user_phone_numbers: Option<String>,

    // Geocoding is optional enrichment; no key means coordinates only
    pub google_maps_api_key: Option<String>,

    #[serde(default = "default_geocode_api_base")]
    pub geocode_api_base: String,

    pub weather_api_key: Option<String>,

    #[serde(default = "default_weather_api_base")]
    pub weather_api_base: String,
}

/// Everything needed to talk to the messaging provider on behalf of this deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Config>()
    }

    /// Provider credentials, or `None` unless all three values are set and non-blank.
    pub fn provider_credentials(&self) -> Option<ProviderCredentials> {
        Some(ProviderCredentials {
            account_sid: non_blank(&self.twilio_account_sid)?.to_string(),
            auth_token: non_blank(&self.twilio_auth_token)?.to_string(),
            from_number: non_blank(&self.twilio_phone_number)?.to_string(),
        })
    }

    /// Raw recipient configuration, `None` when unset or blank.
    pub fn recipients_raw(&self) -> Option<&str> {
        non_blank(&self.user_phone_numbers)
    }

    pub fn geocode_api_key(&self) -> Option<&str> {
        non_blank(&self.google_maps_api_key)
    }

    pub fn weather_api_key(&self) -> Option<&str> {
        non_blank(&self.weather_api_key)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_phone_number: None,
            twilio_api_base: default_twilio_api_base(),
            user_phone_numbers: None,
            google_maps_api_key: None,
            geocode_api_base: default_geocode_api_base(),
            weather_api_key: None,
            weather_api_base: default_weather_api_base(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn default_port() -> u16 {
    3001
}

fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_string()
}

fn default_geocode_api_base() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_weather_api_base() -> String {
    "https://api.openweathermap.org".to_string()
}
