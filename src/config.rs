use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let razorpay_key_id = env::var("RAZORPAY_KEY_ID").ok().filter(|v| !v.is_empty());
        let razorpay_key_secret = env::var("RAZORPAY_KEY_SECRET")
            .ok()
            .filter(|v| !v.is_empty());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(5000);
        Ok(Self {
            database_url,
            jwt_secret,
            razorpay_key_id,
            razorpay_key_secret,
            host,
            port,
        })
    }

    /// Gateway credentials are optional; without them the order flow uses
    /// locally-generated placeholder identifiers.
    pub fn gateway_credentials(&self) -> Option<(String, String)> {
        match (&self.razorpay_key_id, &self.razorpay_key_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        }
    }
}
