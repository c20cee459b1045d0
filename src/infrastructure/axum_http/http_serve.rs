use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use super::{
    default_routers,
    routers::{self, SharedBillingMode},
};
use crate::{
    config::{config_loader, config_model::DotEnvyConfig},
    infrastructure::{
        notifications::Mailer,
        payments::stripe_client::StripeClients,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::platform_settings::PlatformSettingsPostgres,
        },
    },
};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let jwt_secret = config_loader::get_jwt_secret()?.secret;

    let settings_repository = PlatformSettingsPostgres::new(Arc::clone(&db_pool));
    let billing_mode: Arc<SharedBillingMode> =
        Arc::new(SharedBillingMode::new(Arc::new(settings_repository)));
    let stripe = Arc::new(StripeClients::new(&config.stripe, &config.app.base_url));
    let mailer = Arc::new(Mailer::from_config(&config.mailer)?);

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/auth",
            routers::auth::routes(Arc::clone(&db_pool), jwt_secret),
        )
        .nest(
            "/api/v1/billing",
            routers::billing::routes(
                Arc::clone(&db_pool),
                Arc::clone(&stripe),
                Arc::clone(&billing_mode),
            ),
        )
        .nest(
            "/api/v1/admin",
            routers::admin::routes(Arc::clone(&billing_mode)),
        )
        .nest(
            "/api/v1/public",
            routers::public_board::routes(
                Arc::clone(&db_pool),
                mailer,
                config.app.base_url.clone(),
            ),
        )
        .nest(
            "/api/v1/webhooks",
            routers::stripe_webhook::routes(
                Arc::clone(&db_pool),
                stripe,
                billing_mode,
                config.app.free_plan_slug.clone(),
            ),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = ?err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
