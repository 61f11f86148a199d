use dogmail_core::utils::config::{ServerSettings, DEFAULT_PORT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            port: settings.port,
            ..Default::default()
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_settings() {
        let settings = ServerSettings {
            port: 8080,
            ..Default::default()
        };
        assert_eq!(ServerConfig::from_settings(&settings).address(), "0.0.0.0:8080");
    }
}
