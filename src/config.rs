#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Paymob gateway configuration
    pub paymob_api_key: String,
    pub paymob_integration_id: String,
    pub paymob_iframe_id: String,
    pub paymob_hmac_secret: String,
    // Email service configuration
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url = std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        // Paymob configuration (with test defaults)
        let paymob_api_key = std::env::var("PAYMOB_API_KEY")
            .unwrap_or_else(|_| "test_api_key".to_string());
        let paymob_integration_id = std::env::var("PAYMOB_INTEGRATION_ID")
            .unwrap_or_else(|_| "0".to_string());
        let paymob_iframe_id = std::env::var("PAYMOB_IFRAME_ID")
            .unwrap_or_else(|_| "0".to_string());
        let paymob_hmac_secret = std::env::var("PAYMOB_HMAC_SECRET")
            .unwrap_or_else(|_| "".to_string());

        // Email service configuration (with defaults)
        let smtp_host = std::env::var("SMTP_HOST")
            .unwrap_or_else(|_| "localhost".to_string());
        let smtp_username = std::env::var("SMTP_USERNAME")
            .unwrap_or_else(|_| "".to_string());
        let smtp_password = std::env::var("SMTP_PASSWORD")
            .unwrap_or_else(|_| "".to_string());
        let smtp_from = std::env::var("SMTP_FROM")
            .unwrap_or_else(|_| "Srvana <no-reply@srvana.app>".to_string());

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            paymob_api_key,
            paymob_integration_id,
            paymob_iframe_id,
            paymob_hmac_secret,
            smtp_host,
            smtp_username,
            smtp_password,
            smtp_from,
        }
    }
}
