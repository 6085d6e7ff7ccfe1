use log::{info, warn};
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::Connection;
use thiserror::Error;

use super::identifier::TrustedIdentifier;
use crate::config::DbConfig;

/// Schema migrations, applied in version order and recorded in `_sqlx_migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to connect to administrative database '{database}': {source}")]
    AdminConnect {
        database: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to check whether database '{database}' exists: {source}")]
    ExistenceCheck {
        database: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to create database '{database}': {source}")]
    CreateDatabase {
        database: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to connect to database '{database}': {source}")]
    Connect {
        database: String,
        #[source]
        source: sqlx::Error,
    },
    // Whatever ran before the failing migration stays applied.
    #[error("failed to apply migrations to '{database}': {source}")]
    Migrate {
        database: String,
        #[source]
        source: MigrateError,
    },
}

/// A ready connection pool for the target database.
pub struct Provisioned {
    pub pool: PgPool,
    /// Whether this run created the database (and therefore migrated it).
    pub created: bool,
}

/// Makes sure the configured database exists and is migrated, then connects to it.
///
/// Runs once at startup, before any request is served. The existence check and
/// the creation are two separate statements, so two processes provisioning the
/// same fresh server at the same moment can both try to create the database; the
/// loser fails with `CreateDatabase`.
pub async fn provision(config: &DbConfig) -> Result<Provisioned, ProvisionError> {
    let target = &config.database;

    // The target may not exist yet, and PostgreSQL refuses connections that
    // name a missing database, so start from the administrative one.
    let mut admin = PgConnection::connect_with(&config.connect_options(&config.admin_database))
        .await
        .map_err(|source| ProvisionError::AdminConnect {
            database: config.admin_database.clone(),
            source,
        })?;
    info!("Connected to administrative database {}", config.admin_database);

    let exists = database_exists(&mut admin, target)
        .await
        .map_err(|source| ProvisionError::ExistenceCheck {
            database: target.to_string(),
            source,
        })?;

    if !exists {
        create_database(&mut admin, target)
            .await
            .map_err(|source| ProvisionError::CreateDatabase {
                database: target.to_string(),
                source,
            })?;
        info!("Created database {}", target);
    } else {
        info!("Database {} already exists", target);
    }

    // Closing is best effort; the server drops the session either way.
    if let Err(e) = admin.close().await {
        warn!("Administrative connection did not close cleanly: {}", e);
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(config.connect_options(target.as_str()))
        .await
        .map_err(|source| ProvisionError::Connect {
            database: target.to_string(),
            source,
        })?;
    info!("Connected to database {}", target);

    if !exists {
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|source| ProvisionError::Migrate {
                database: target.to_string(),
                source,
            })?;
        info!("Applied {} migration(s) to {}", MIGRATOR.iter().count(), target);
    }

    Ok(Provisioned {
        pool,
        created: !exists,
    })
}

async fn database_exists(
    conn: &mut PgConnection,
    database: &TrustedIdentifier,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM pg_catalog.pg_database WHERE datname = $1)",
    )
    .bind(database.as_str())
    .fetch_one(conn)
    .await
}

async fn create_database(
    conn: &mut PgConnection,
    database: &TrustedIdentifier,
) -> Result<(), sqlx::Error> {
    // The one statement in this crate built by string formatting. Only a
    // TrustedIdentifier, which comes from the local config file, may go here.
    let statement = create_database_statement(database);
    sqlx::query(&statement).execute(conn).await?;
    Ok(())
}

fn create_database_statement(database: &TrustedIdentifier) -> String {
    format!("CREATE DATABASE {}", database.quoted())
}
