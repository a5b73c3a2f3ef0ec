use std::sync::Arc;

use tracing::warn;

use crate::auth::{
    password::PasswordHasher,
    repo::{MemoryUserStore, PgUserStore, UserStore},
};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub hasher: PasswordHasher,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let users = match &config.database_url {
            Some(url) => Arc::new(PgUserStore::connect(url).await?) as Arc<dyn UserStore>,
            None => {
                warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        Self::from_parts(users, config)
    }

    pub fn from_parts(users: Arc<dyn UserStore>, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(&config.password)?;
        Ok(Self {
            users,
            hasher,
            config,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                ttl_seconds: crate::config::DEFAULT_TOKEN_TTL_SECONDS,
            },
            password: crate::config::PasswordConfig::default(),
        });

        Self {
            users: Arc::new(MemoryUserStore::new()),
            hasher: crate::auth::password::cheap_hasher(),
            config,
        }
    }
}
