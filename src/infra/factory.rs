use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{
    AccommodationBookingRepository, AccommodationRepository, AuthRepository,
    TransportBookingRepository, TransportRepository, UserRepository,
};
use crate::domain::services::{
    admission::AdmissionController, auth_service::AuthService, availability::AvailabilityChecker,
};
use crate::infra::repositories::{
    postgres_user_repo::PostgresUserRepo, postgres_auth_repo::PostgresAuthRepo,
    postgres_accommodation_repo::PostgresAccommodationRepo, postgres_transport_repo::PostgresTransportRepo,
    postgres_accommodation_booking_repo::PostgresAccommodationBookingRepo,
    postgres_transport_booking_repo::PostgresTransportBookingRepo,
    sqlite_user_repo::SqliteUserRepo, sqlite_auth_repo::SqliteAuthRepo,
    sqlite_accommodation_repo::SqliteAccommodationRepo, sqlite_transport_repo::SqliteTransportRepo,
    sqlite_accommodation_booking_repo::SqliteAccommodationBookingRepo,
    sqlite_transport_booking_repo::SqliteTransportBookingRepo,
};

struct Repositories {
    user_repo: Arc<dyn UserRepository>,
    auth_repo: Arc<dyn AuthRepository>,
    accommodation_repo: Arc<dyn AccommodationRepository>,
    transport_repo: Arc<dyn TransportRepository>,
    accommodation_booking_repo: Arc<dyn AccommodationBookingRepository>,
    transport_booking_repo: Arc<dyn TransportBookingRepository>,
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        Repositories {
            user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
            auth_repo: Arc::new(PostgresAuthRepo::new(pool.clone())),
            accommodation_repo: Arc::new(PostgresAccommodationRepo::new(pool.clone())),
            transport_repo: Arc::new(PostgresTransportRepo::new(pool.clone())),
            accommodation_booking_repo: Arc::new(PostgresAccommodationBookingRepo::new(pool.clone())),
            transport_booking_repo: Arc::new(PostgresTransportBookingRepo::new(pool)),
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        // Admission serializes on the database write lock, so writers queue
        // on the busy timeout rather than failing fast.
        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        Repositories {
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            auth_repo: Arc::new(SqliteAuthRepo::new(pool.clone())),
            accommodation_repo: Arc::new(SqliteAccommodationRepo::new(pool.clone())),
            transport_repo: Arc::new(SqliteTransportRepo::new(pool.clone())),
            accommodation_booking_repo: Arc::new(SqliteAccommodationBookingRepo::new(pool.clone())),
            transport_booking_repo: Arc::new(SqliteTransportBookingRepo::new(pool)),
        }
    };

    assemble_state(config, repos)
}

fn assemble_state(config: &Config, repos: Repositories) -> AppState {
    let auth_service = Arc::new(
        AuthService::new(repos.auth_repo.clone(), config.clone()).expect("Invalid JWT signing key"),
    );

    let admission = Arc::new(AdmissionController::new(
        repos.accommodation_repo.clone(),
        repos.transport_repo.clone(),
        repos.accommodation_booking_repo.clone(),
        repos.transport_booking_repo.clone(),
    ));

    let availability = Arc::new(AvailabilityChecker::new(
        repos.accommodation_repo.clone(),
        repos.transport_repo.clone(),
        repos.accommodation_booking_repo.clone(),
        repos.transport_booking_repo.clone(),
    ));

    AppState {
        config: config.clone(),
        user_repo: repos.user_repo,
        auth_repo: repos.auth_repo,
        accommodation_repo: repos.accommodation_repo,
        transport_repo: repos.transport_repo,
        accommodation_booking_repo: repos.accommodation_booking_repo,
        transport_booking_repo: repos.transport_booking_repo,
        auth_service,
        admission,
        availability,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
