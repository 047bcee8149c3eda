/// API service configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for signing access tokens. Env var: `JWT_SECRET`.
    pub jwt_secret: String,
    /// Bearer key for the mail provider API. Env var: `MAIL_API_KEY`.
    pub mail_api_key: String,
    /// From-address on all outgoing mail. Env var: `MAIL_SENDER`.
    pub mail_sender: String,
    /// Mail provider base URL. Env var: `MAIL_API_BASE`
    /// (default `https://api.sendgrid.com`).
    pub mail_api_base: String,
    /// TCP port to listen on. Env var: `API_PORT` (default 3200).
    pub api_port: u16,
}

impl ApiConfig {
    /// Panics when a required variable is missing; the service cannot run
    /// without them.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            mail_api_key: std::env::var("MAIL_API_KEY").expect("MAIL_API_KEY"),
            mail_sender: std::env::var("MAIL_SENDER").expect("MAIL_SENDER"),
            mail_api_base: std::env::var("MAIL_API_BASE")
                .unwrap_or_else(|_| "https://api.sendgrid.com".to_owned()),
            api_port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3200),
        }
    }
}
