use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

/// Argon2id cost parameters. Defaults match the argon2 crate.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let jwt = JwtConfig {
            secret: jwt_secret(std::env::var("JWT_SECRET").ok())?,
            ttl_seconds: env_or("JWT_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS),
        };
        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: env_or("PASSWORD_MEMORY_KIB", defaults.memory_kib),
            iterations: env_or("PASSWORD_ITERATIONS", defaults.iterations),
            parallelism: env_or("PASSWORD_PARALLELISM", defaults.parallelism),
        };
        Ok(Self {
            database_url,
            jwt,
            password,
        })
    }
}

fn jwt_secret(value: Option<String>) -> anyhow::Result<String> {
    match value {
        None => anyhow::bail!("JWT_SECRET must be set"),
        Some(v) if v.trim().is_empty() => anyhow::bail!("JWT_SECRET must not be empty"),
        Some(v) => Ok(v),
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
