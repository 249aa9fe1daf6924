use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub token_secret: String,
    pub mail_api_url: String,
    pub mail_api_token: String,
    pub mail_from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "eventlink.db".to_string()),
            token_secret: env::var("TOKEN_SECRET").unwrap_or_else(|_| "changeme".to_string()),
            mail_api_url: env::var("MAIL_API_URL").unwrap_or_default(),
            mail_api_token: env::var("MAIL_API_TOKEN").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@eventlink.local".to_string()),
        }
    }
}
