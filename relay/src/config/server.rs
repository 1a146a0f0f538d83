use super::errors::ConfigError;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                field: "PORT",
                reason: e.to_string(),
            })?,
            Err(_) => 3000,
        };
        Ok(Self { port })
    }
}
