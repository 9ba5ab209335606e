use crate::{ConfigError, FromEnv, env_parse};
use std::net::{IpAddr, SocketAddr};

/// Listen address for the HTTP server
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl FromEnv for ServerConfig {
    /// `HOST` must be an IP address (default all interfaces); `PORT` defaults to 8080.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_parse("HOST", "0.0.0.0")?,
            port: env_parse("PORT", "8080")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_listen_on_all_interfaces() {
        temp_env::with_vars_unset(["HOST", "PORT"], || {
            let config = ServerConfig::from_env().unwrap();
            assert!(config.host.is_unspecified());
            assert_eq!(config.address().to_string(), "0.0.0.0:8080");
        });
    }

    #[test]
    fn test_ipv6_host_and_custom_port() {
        temp_env::with_vars([("HOST", Some("::1")), ("PORT", Some("3000"))], || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.address().to_string(), "[::1]:3000");
        });
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        temp_env::with_vars([("HOST", Some("localhost")), ("PORT", None)], || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("HOST"));
        });
        temp_env::with_vars([("HOST", None), ("PORT", Some("99999"))], || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PORT"));
        });
    }
}
