//! Applies the embedded schema migrations to the Pokedex databases.
//!
//! Does the same job as `diesel migration run` without needing the diesel CLI. Migrations are
//! applied to `DATABASE_URL`, then to `TEST_DATABASE_URL` when it is set. An unreachable test
//! database is skipped with a warning.

use std::sync::OnceLock;
use std::time::Instant;

use anyhow::{anyhow, Context};
use diesel::migration::MigrationSource;
use diesel::{Connection, ConnectionError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{debug, info, warn};
use pokedex::db::{get_db_url, Backend, SyncConnection};
use pokedex::helpers::env::{load_optional_dotenv, optional_env_var};
use regex::Regex;
use simple_logger::SimpleLogger;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .env()
        .init()
        .with_context(|| "failed to initialize logging")?;

    load_optional_dotenv().with_context(|| "failed to load `.env` file")?;

    let started = Instant::now();

    let db_url = get_db_url()?;
    migrate(&db_url, MIGRATIONS, Unreachable::Fail)?;

    match optional_env_var("TEST_DATABASE_URL")? {
        Some(test_db_url) => migrate(&test_db_url, MIGRATIONS, Unreachable::Skip)?,
        None => debug!("TEST_DATABASE_URL not set; only the main database was migrated"),
    }

    info!("Done in {:.3}s", started.elapsed().as_secs_f64());
    Ok(())
}

/// What to do when a database cannot be reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Unreachable {
    Fail,
    Skip,
}

fn migrate<S>(db_url: &str, migrations: S, unreachable: Unreachable) -> anyhow::Result<()>
where
    S: MigrationSource<Backend>,
{
    let display_url = redact_db_url(db_url)?;
    info!("Migrating `{}`", display_url);

    let mut connection = match SyncConnection::establish(db_url) {
        Ok(connection) => connection,
        Err(ConnectionError::BadConnection(err)) if unreachable == Unreachable::Skip => {
            warn!("Could not connect to `{}` ({}); skipped", display_url, err.trim());
            return Ok(());
        },
        Err(err) => {
            return Err(err).with_context(|| format!("failed to connect to `{}`", display_url))
        },
    };

    let applied = connection
        .run_pending_migrations(migrations)
        .map_err(|err| anyhow!("{}", err))
        .with_context(|| format!("failed to migrate `{}`", display_url))?;

    if applied.is_empty() {
        info!("`{}` is up to date", display_url);
    }
    for version in applied {
        info!("Applied migration {}", version);
    }

    Ok(())
}

/// Strips the credentials from a Postgres URL so it can be logged.
fn redact_db_url(db_url: &str) -> anyhow::Result<String> {
    static CREDENTIALS: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

    let credentials = CREDENTIALS
        .get_or_init(|| Regex::new(r"^(?<scheme>postgres(?:ql)?://)[^@/]*@"))
        .as_ref()
        .map_err(Clone::clone)
        .with_context(|| "failed to compile DB URL filter")?;

    Ok(credentials.replace(db_url, "$scheme").into_owned())
}
