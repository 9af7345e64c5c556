//! Loads the pokemon types catalogue into the Pokedex database.
//!
//! Types are read from `seed/types.csv` (or the file named by `SEED_TYPES_FILE`) and replace
//! whatever types the database already holds. Pokemon associations are not touched: an
//! association whose type is not seeded again simply stops showing up in type lists.

use std::env::current_exe;
use std::time::Instant;

use anyhow::{bail, Context};
use cargo_metadata::camino::Utf8PathBuf;
use cargo_metadata::MetadataCommand;
use diesel::{delete, insert_into, sql_query, Connection, RunQueryDsl};
use log::{debug, info};
use pokedex::db::{get_db_url, SyncConnection};
use pokedex::helpers::env::{load_optional_dotenv, optional_env_var};
use pokedex::models::types::ImportType;
use pokedex::schema::types;
use simple_logger::SimpleLogger;
use validator::Validate;

const SEED_FILE: &str = "seed/types.csv";

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .env()
        .init()
        .with_context(|| "failed to initialize logging")?;

    load_optional_dotenv().with_context(|| "failed to load `.env` file")?;

    let started = Instant::now();

    let seed_file = seed_file()?;
    let seeded = read_types(&seed_file)?;
    info!("Read {} types from {}", seeded.len(), seed_file);

    let mut connection =
        SyncConnection::establish(&get_db_url()?).with_context(|| "failed to connect to database")?;

    connection.transaction(|connection| replace_types(connection, &seeded))?;

    info!("Types seeded in {:.3}s", started.elapsed().as_secs_f64());
    Ok(())
}

/// Finds the seed file: `SEED_TYPES_FILE` if set, else next to the executable, else in the
/// cargo workspace.
fn seed_file() -> anyhow::Result<Utf8PathBuf> {
    if let Some(path) = optional_env_var("SEED_TYPES_FILE")? {
        return Ok(path.into());
    }

    let beside_exe = current_exe()?
        .parent()
        .map(|dir| dir.join(SEED_FILE))
        .filter(|path| path.is_file());
    if let Some(path) = beside_exe {
        return Utf8PathBuf::try_from(path).with_context(|| "seed file path is not valid UTF-8");
    }

    let workspace_root = MetadataCommand::new()
        .no_deps()
        .exec()
        .with_context(|| "failed to locate cargo workspace")?
        .workspace_root;
    Ok(workspace_root.join(SEED_FILE))
}

fn read_types(path: &Utf8PathBuf) -> anyhow::Result<Vec<ImportType>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("failed to open {}", path))?;

    let mut seeded = Vec::new();
    for (index, record) in reader.deserialize::<ImportType>().enumerate() {
        let line = index + 2;
        let seeded_type = record.with_context(|| format!("{}:{}: malformed record", path, line))?;
        seeded_type
            .validate()
            .with_context(|| format!("{}:{}: invalid type", path, line))?;
        seeded.push(seeded_type);
    }

    if seeded.is_empty() {
        bail!("{} does not contain any type", path);
    }
    Ok(seeded)
}

fn replace_types(connection: &mut SyncConnection, seeded: &[ImportType]) -> anyhow::Result<()> {
    let removed = delete(types::table)
        .execute(connection)
        .with_context(|| "failed to delete existing types")?;
    debug!("Removed {} existing types", removed);

    insert_into(types::table)
        .values(seeded)
        .execute(connection)
        .with_context(|| "failed to insert types")?;

    // Types are inserted with explicit ids; later inserts must not reuse them.
    sql_query("SELECT setval(pg_get_serial_sequence('types', 'id'), COALESCE(MAX(id), 1)) FROM types")
        .execute(connection)
        .with_context(|| "failed to reset types id sequence")?;

    Ok(())
}
