use anyhow::{Context, Result};

use super::{
    config_model::{
        App, Database, DotEnvyConfig, JwtSecret, Mailer, Server, StripeCredentials,
        StripeSettings,
    },
    stage::Stage,
};
use crate::domain::value_objects::plans::FREE_PLAN_SLUG;

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: required("SERVER_PORT")?.parse()?,
        body_limit: required("SERVER_BODY_LIMIT")?.parse()?,
        timeout: required("SERVER_TIMEOUT")?.parse()?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let app = App {
        base_url: required("APP_BASE_URL")?,
        free_plan_slug: optional("FREE_PLAN_SLUG").unwrap_or_else(|| FREE_PLAN_SLUG.to_string()),
    };

    let stripe = StripeSettings {
        test: StripeCredentials {
            secret_key: required("STRIPE_TEST_SECRET_KEY")?,
            webhook_secret: required("STRIPE_TEST_WEBHOOK_SECRET")?,
        },
        live: StripeCredentials {
            secret_key: required("STRIPE_LIVE_SECRET_KEY")?,
            webhook_secret: required("STRIPE_LIVE_WEBHOOK_SECRET")?,
        },
    };

    let mailer = Mailer {
        sendgrid_api_key: optional("SENDGRID_API_KEY"),
        from_email: optional("NOTIFICATION_FROM_EMAIL")
            .unwrap_or_else(|| "noreply@localhost".to_string()),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        app,
        stripe,
        mailer,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_jwt_secret() -> Result<JwtSecret> {
    dotenvy::dotenv().ok();

    Ok(JwtSecret {
        secret: required("JWT_SECRET")?,
    })
}
