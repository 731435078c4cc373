use std::sync::Arc;

use audit::LogSink;
use auth::Authenticator;
use auth::PasswordHasher;
use clinic_service::config::Config;
use clinic_service::domain::user::service::UserService;
use clinic_service::inbound::http::router::create_router;
use clinic_service::outbound::repositories::PostgresLogRepository;
use clinic_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_service=debug,audit=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "clinic-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        jwt_expiration_hours = config.jwt.expiration_hours,
        log_level = %config.log.level,
        log_init_table = config.log.init_table,
        "Configuration loaded"
    );

    let log = LogSink::new(&config.log);

    if config.jwt.uses_insecure_default() {
        audit::warn!(
            log,
            "JWT secret is the insecure development default; set JWT_SECRET before deploying"
        );
    }

    let pg_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => audit::fatal!(log, "Failed to connect to database: {}", e),
    };
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    log.set_persistence(Arc::new(PostgresLogRepository::new(pg_pool.clone())))
        .await;

    let password_hasher = PasswordHasher::with_cost(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes())
            .with_password_hasher(password_hasher)
            .with_token_ttl_hours(config.jwt.expiration_hours),
    );
    authenticator.warm_up()?;

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let user_service = Arc::new(UserService::new(
        user_repository,
        Arc::clone(&authenticator),
        log.clone(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );
    audit::info!(log, "Server starting on port {}", config.server.http_port);

    let http_application = create_router(user_service, authenticator, log);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
