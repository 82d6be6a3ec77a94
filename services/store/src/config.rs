use anyhow::Context as _;

/// Store service configuration loaded from environment variables.
///
/// A `.env` file in the working directory is read first when present.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// HMAC secret for signing email verification tokens.
    pub email_verify_secret: String,
    /// Public frontend origin used to build links in emails.
    pub domain_url: String,
    /// TCP port to listen on (default 3000). Env var: `STORE_PORT`.
    pub store_port: u16,
    /// Cookie `Domain` attribute; host-only cookie when unset.
    pub cookie_domain: Option<String>,
    /// Cookie `Secure` attribute (default true). Env var: `COOKIE_SECURE`.
    pub cookie_secure: bool,
    pub smtp: SmtpConfig,
    pub cloudinary: CloudinaryConfig,
    pub razorpay: RazorpayConfig,
    /// Seconds between outbox relay polls (default 5).
    pub outbox_poll_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// Default 587 (STARTTLS).
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// RFC 5322 "From" address.
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Upload folder for profile photos (default `cakeorder/users`).
    pub folder: String,
}

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    /// API origin (default `https://api.razorpay.com`).
    pub base_url: String,
    /// ISO 4217 currency code for charges (default `INR`).
    pub currency: String,
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl StoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // Missing .env is fine; real deployments set the variables directly.
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            email_verify_secret: required("EMAIL_VERIFY_SECRET")?,
            domain_url: required("DOMAIN_URL")?.trim_end_matches('/').to_owned(),
            store_port: parsed_or("STORE_PORT", 3000),
            cookie_domain: optional("COOKIE_DOMAIN"),
            cookie_secure: parsed_or("COOKIE_SECURE", true),
            smtp: SmtpConfig {
                host: required("SMTP_HOST")?,
                port: parsed_or("SMTP_PORT", 587),
                username: optional("SMTP_USERNAME"),
                password: optional("SMTP_PASSWORD"),
                from: required("MAIL_FROM")?,
            },
            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
                folder: optional("IMAGE_FOLDER").unwrap_or_else(|| "cakeorder/users".to_owned()),
            },
            razorpay: RazorpayConfig {
                key_id: required("RAZORPAY_KEY_ID")?,
                key_secret: required("RAZORPAY_KEY_SECRET")?,
                base_url: optional("RAZORPAY_BASE_URL")
                    .unwrap_or_else(|| "https://api.razorpay.com".to_owned())
                    .trim_end_matches('/')
                    .to_owned(),
                currency: optional("PAYMENT_CURRENCY").unwrap_or_else(|| "INR".to_owned()),
            },
            outbox_poll_secs: parsed_or("OUTBOX_POLL_SECS", 5),
        })
    }
}
