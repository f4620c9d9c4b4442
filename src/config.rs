//! Connection settings from the environment.
//!
//! The core only ever sees the finished `PgConnectOptions`; everything here
//! is the startup shell. Either a full `DATABASE_URL` or the discrete
//! `SQLGATE_*` variables (host, port, database, credentials or trusted
//! auth). `SQLGATE_SCHEMA` is the introspection filter.

use crate::error::ConfigError;
use sqlx::postgres::PgConnectOptions;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Authenticate without a password (peer/trust auth), the counterpart of
    /// a driver-level trusted connection.
    pub trusted_auth: bool,
    /// Schema whose tables are exposed. Tables elsewhere stay invisible.
    pub schema: String,
    pub max_connections: u32,
    pub bind: String,
}

fn env_var(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn truthy(v: &str) -> bool {
    matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env_var("DATABASE_URL");
        let schema = env_var("SQLGATE_SCHEMA").unwrap_or_else(|| "public".to_string());
        let bind = env_var("SQLGATE_BIND").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let max_connections = match env_var("SQLGATE_MAX_CONNECTIONS") {
            None => 5,
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "SQLGATE_MAX_CONNECTIONS",
                reason: format!("'{}' is not an integer", v),
            })?,
        };

        let host = env_var("SQLGATE_HOST").unwrap_or_else(|| "localhost".to_string());
        let port = match env_var("SQLGATE_PORT") {
            None => 5432,
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "SQLGATE_PORT",
                reason: format!("'{}' is not a port number", v),
            })?,
        };
        let trusted_auth = env_var("SQLGATE_TRUSTED_AUTH")
            .map(|v| truthy(&v))
            .unwrap_or(false);
        let username = env_var("SQLGATE_USER");
        let password = env_var("SQLGATE_PASSWORD");
        let database = env_var("SQLGATE_DATABASE").unwrap_or_default();

        if database_url.is_none() {
            if database.is_empty() {
                return Err(ConfigError::Missing("SQLGATE_DATABASE"));
            }
            if !trusted_auth {
                if username.is_none() {
                    return Err(ConfigError::Missing("SQLGATE_USER"));
                }
                if password.is_none() {
                    return Err(ConfigError::Missing("SQLGATE_PASSWORD"));
                }
            }
        }

        Ok(Settings {
            database_url,
            host,
            port,
            database,
            username,
            password,
            trusted_auth,
            schema,
            max_connections,
            bind,
        })
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.database_url {
            return PgConnectOptions::from_str(url).map_err(|e| ConfigError::Invalid {
                name: "DATABASE_URL",
                reason: e.to_string(),
            });
        }
        let mut opts = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database);
        if let Some(user) = &self.username {
            opts = opts.username(user);
        }
        if !self.trusted_auth {
            if let Some(password) = &self.password {
                opts = opts.password(password);
            }
        }
        Ok(opts)
    }

    /// Loggable connection description with the password obscured.
    pub fn masked(&self) -> String {
        match &self.database_url {
            Some(url) => mask_url(url),
            None => {
                let user = self.username.as_deref().unwrap_or("");
                if self.trusted_auth {
                    format!("postgres://{}@{}:{}/{}", user, self.host, self.port, self.database)
                } else {
                    format!(
                        "postgres://{}:****@{}:{}/{}",
                        user, self.host, self.port, self.database
                    )
                }
            }
        }
    }
}

/// Replace the password section of a `user:pass@host` URL with stars.
fn mask_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let Some(at) = rest.rfind('@') else {
        return url.to_string();
    };
    let userinfo = &rest[..at];
    match userinfo.find(':') {
        Some(colon) => format!(
            "{}://{}:****{}",
            &url[..scheme_end],
            &userinfo[..colon],
            &rest[at..]
        ),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_url_hides_only_the_password() {
        assert_eq!(
            mask_url("postgres://app:hunter2@db:5432/prod"),
            "postgres://app:****@db:5432/prod"
        );
        assert_eq!(
            mask_url("postgres://db:5432/prod"),
            "postgres://db:5432/prod"
        );
        assert_eq!(
            mask_url("postgres://app@db/prod"),
            "postgres://app@db/prod"
        );
    }

    #[test]
    fn truthy_accepts_common_spellings() {
        assert!(truthy("1"));
        assert!(truthy("TRUE"));
        assert!(truthy("yes"));
        assert!(!truthy("0"));
        assert!(!truthy("no"));
    }
}
