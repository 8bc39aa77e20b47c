use reqwest::Url;

use crate::error::ConfigError;

/// Runtime settings shared by both front-ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Url,
}

impl Config {
    /// Validates the reading service address. Only absolute http(s) URLs are accepted.
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            value: endpoint.to_string(),
            reason,
        };

        let url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self { endpoint: url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_ENDPOINT;

    #[test]
    fn test_default_points_at_local_reading_service() {
        let config = Config::new(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_accepts_http_and_https() {
        assert!(Config::new("http://localhost:5000/chat").is_ok());
        assert!(Config::new("https://tarot.example.com/chat").is_ok());
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let config = Config::new("  http://127.0.0.1:5000/chat \n").unwrap();
        assert_eq!(config.endpoint.as_str(), "http://127.0.0.1:5000/chat");
    }

    #[test]
    fn test_rejects_relative_url() {
        let err = Config::new("/chat").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_rejects_other_schemes() {
        let err = Config::new("ftp://127.0.0.1/chat").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }
}
