#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub app: App,
    pub stripe: StripeSettings,
    pub mailer: Mailer,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct App {
    pub base_url: String,
    pub free_plan_slug: String,
}

#[derive(Debug, Clone)]
pub struct StripeCredentials {
    pub secret_key: String,
    pub webhook_secret: String,
}

#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub test: StripeCredentials,
    pub live: StripeCredentials,
}

#[derive(Debug, Clone)]
pub struct Mailer {
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
}

#[derive(Debug, Clone)]
pub struct JwtSecret {
    pub secret: String,
}
