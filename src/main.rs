use std::{process, sync::Arc, time::Duration};

use blotter::{
    application::{error::AppError, posts::PostService, repos::PostStore},
    config::{self, StoreBackend},
    domain::{entities::NewPost, seed::demo_posts},
    infra::{
        db::PostgresPostStore,
        document::MongoPostStore,
        error::InfraError,
        http::{self, HttpState},
        memory::MemoryPostStore,
        telemetry,
    },
};
use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Seed(_) => run_seed(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let store = init_store(&settings).await?;

    if settings.store.seed_demo_posts {
        if settings.store.backend == StoreBackend::Memory {
            seed_store(store.as_ref()).await?;
        } else {
            warn!(
                target = "blotter::serve",
                backend = %settings.store.backend,
                "seed_demo_posts only applies to the memory backend; use `blotter seed` instead"
            );
        }
    }

    let service = PostService::new(store, settings.store.operation_timeout);
    let router = http::build_router(HttpState::new(service));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "blotter::serve",
        addr = %settings.server.addr,
        backend = %settings.store.backend,
        "Listening"
    );

    let grace = settings.server.graceful_shutdown;
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    // The grace period only starts once a shutdown signal has arrived.
    tokio::select! {
        result = server => {
            result.map_err(InfraError::from)?;
        }
        _ = drain_deadline(grace) => {
            warn!(
                target = "blotter::serve",
                grace_seconds = grace.as_secs(),
                "Graceful shutdown timed out; dropping open connections"
            );
        }
    }

    Ok(())
}

async fn run_seed(settings: config::Settings) -> Result<(), AppError> {
    if settings.store.backend == StoreBackend::Memory {
        return Err(AppError::Usage(
            "seed needs a persistent backend; the memory store is discarded on exit".to_string(),
        ));
    }

    let store = init_store(&settings).await?;
    seed_store(store.as_ref()).await
}

async fn seed_store(store: &dyn PostStore) -> Result<(), AppError> {
    for fields in demo_posts() {
        let title = fields.title.clone();
        let id = store.add(NewPost::new(fields)).await?;
        info!(
            target = "blotter::seed",
            backend = store.backend(),
            id = %id,
            title = %title,
            "Seeded post"
        );
    }
    Ok(())
}

async fn init_store(settings: &config::Settings) -> Result<Arc<dyn PostStore>, AppError> {
    match settings.store.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryPostStore::new())),
        StoreBackend::Postgres => {
            let url = settings
                .database
                .url
                .as_ref()
                .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

            let pool = PostgresPostStore::connect(
                url,
                settings.database.max_connections.get(),
                settings.store.operation_timeout,
            )
            .await
            .map_err(|err| InfraError::database(err.to_string()))?;

            PostgresPostStore::run_migrations(&pool)
                .await
                .map_err(|err| InfraError::database(err.to_string()))?;

            let store = PostgresPostStore::new(pool);
            tokio::time::timeout(settings.store.operation_timeout, store.health_check())
                .await
                .map_err(|_| InfraError::database("health check timed out"))?
                .map_err(|err| InfraError::database(err.to_string()))?;

            Ok(Arc::new(store))
        }
        StoreBackend::MongoDb => {
            let uri = settings
                .document
                .uri
                .as_ref()
                .ok_or_else(|| InfraError::configuration("document uri is not configured"))?;

            let store = MongoPostStore::connect(uri, &settings.document.database)
                .await
                .map_err(|err| InfraError::document(err.to_string()))?;

            tokio::time::timeout(settings.store.operation_timeout, store.health_check())
                .await
                .map_err(|_| InfraError::document("ping timed out"))?
                .map_err(|err| InfraError::document(err.to_string()))?;

            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    wait_for_signal().await;
    info!(target = "blotter::serve", "Shutdown signal received");
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(target = "blotter::serve", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(target = "blotter::serve", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn drain_deadline(grace: Duration) {
    wait_for_signal().await;
    tokio::time::sleep(grace).await;
}
