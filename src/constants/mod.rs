use crate::utils::TokenConfig;

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const REFRESH_TOKEN_PREFIX: &str = "refresh_token:";
pub const USER_CACHE_PREFIX: &str = "user:";
pub const USER_CACHE_TTL: u64 = 3600;

pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub refresh_token_expiration: u64,
    pub database_url: String,
    pub redis_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub workers: usize,
    pub friend_request_limit: u32,
    pub friend_request_window_secs: u64,
}

fn parse_or<T: std::str::FromStr>(key: &str, default: &str) -> T {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>()))
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());

        Env {
            jwt_secret,
            access_token_expiration: parse_or("ACCESS_TOKEN_EXPIRATION", "900"),
            refresh_token_expiration: parse_or("REFRESH_TOKEN_EXPIRATION", "604800"),
            database_url,
            redis_url,
            frontend_url,
            ip,
            port: parse_or("PORT", "8080"),
            workers: parse_or("WORKERS", "2"),
            friend_request_limit: parse_or("FRIEND_REQUEST_LIMIT", "3"),
            friend_request_window_secs: parse_or("FRIEND_REQUEST_WINDOW_SECS", "60"),
        }
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            secret: self.jwt_secret.clone(),
            access_ttl: self.access_token_expiration,
            refresh_ttl: self.refresh_token_expiration,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
