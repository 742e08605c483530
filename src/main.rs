use std::{process, sync::Arc};

use quire::{
    application::{
        admin::AdminPostService,
        chrome::{ChromeService, SiteProfile},
        contact::{ContactService, Notifier},
        error::AppError,
        feed::FeedService,
        repos::{ContactsRepo, HealthRepo, PostsRepo, PostsWriteRepo},
        session::{AdminCredentials, SessionGate},
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState, session::cookie_key},
        mail::{SmtpNotifier, UnconfiguredNotifier},
        telemetry,
        uploads::UploadStorage,
    },
};
use sqlx::PgPool;
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

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_database(&settings.database).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
    info!(target = "quire::migrate", "Migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_database(&settings.database).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let repositories = Arc::new(PostgresRepositories::new(pool));
    let state = build_app_state(repositories, &settings)?;
    serve_http(&settings, state).await
}

async fn connect_database(database: &config::DatabaseSettings) -> Result<PgPool, AppError> {
    let database_url = database
        .url
        .as_ref()
        .ok_or_else(|| {
            let selected = if database.use_local {
                "database.local_url"
            } else {
                "database.production_url"
            };
            InfraError::configuration(format!("{selected} is not configured"))
        })
        .map_err(AppError::from)?;

    PostgresRepositories::connect(database_url, database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

fn build_notifier(settings: &config::Settings) -> Result<Arc<dyn Notifier>, AppError> {
    match settings.mail.as_ref() {
        Some(mail) => {
            let notifier = SmtpNotifier::new(mail).map_err(AppError::from)?;
            info!(
                target = "quire::mail",
                host = %mail.host,
                port = mail.port.get(),
                "Mail relay configured"
            );
            Ok(Arc::new(notifier))
        }
        None => {
            warn!(
                target = "quire::mail",
                "No mail account configured; contact messages will be stored but not relayed"
            );
            Ok(Arc::new(UnconfiguredNotifier))
        }
    }
}

fn build_app_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<AppState, AppError> {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let contacts_repo: Arc<dyn ContactsRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories;

    let upload_storage = Arc::new(
        UploadStorage::new(settings.uploads.directory.clone())
            .map_err(|err| AppError::from(InfraError::Io(err)))?,
    );

    let site = &settings.site;
    let chrome = ChromeService::new(SiteProfile {
        title: site.title.clone(),
        tagline: site.tagline.clone(),
        about: site.about.clone(),
        author: site.author.clone(),
        github_url: site.github_url.clone(),
        twitter_url: site.twitter_url.clone(),
        facebook_url: site.facebook_url.clone(),
    });

    Ok(AppState {
        feed: FeedService::new(posts_repo.clone(), settings.blog.posts_per_page),
        posts: AdminPostService::new(posts_repo, posts_write_repo, upload_storage.clone()),
        contact: ContactService::new(contacts_repo, build_notifier(settings)?, &site.title),
        chrome,
        gate: SessionGate::new(AdminCredentials {
            username: settings.admin.username.clone(),
            password: settings.admin.password.clone(),
        }),
        uploads: upload_storage,
        health: health_repo,
        cookie_key: cookie_key(&settings.session.secret),
    })
}

async fn serve_http(settings: &config::Settings, state: AppState) -> Result<(), AppError> {
    let upload_body_limit = usize::try_from(settings.uploads.max_request_bytes.get())
        .unwrap_or(usize::MAX);
    let router = http::build_router(state, upload_body_limit);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "quire::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target = "quire::serve", "Shutdown requested");
}
