use std::env;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.addr(), "127.0.0.1:3000");
        assert_eq!(config.cors_origin, "http://localhost:5173");
    }

    #[test]
    fn test_unparseable_port_falls_back() {
        let config = ServerConfig::from_lookup(|key| match key {
            "PORT" => Some("eighty".to_string()),
            "HOST" => Some("0.0.0.0".to_string()),
            _ => None,
        });
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }
}
