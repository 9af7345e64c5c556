//! Postgres connection helpers for the Pokedex store.

use std::env;

use diesel::pg::Pg;
use diesel::PgConnection;
use diesel_async::pooled_connection::deadpool::Object;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

use crate::error::EnvVarContext;
use crate::helpers::env::optional_int_env_var;

/// Database backend of the Pokedex store.
pub type Backend = Pg;

/// Blocking connection, used by the maintenance binaries (`run_migrations`, `seed_db`).
pub type SyncConnection = PgConnection;

/// Async connection used by the web app.
pub type Connection = AsyncPgConnection;

/// [`deadpool`] pool of [`Connection`]s, shared by all HTTP workers through
/// [`PgStore`](crate::repositories::postgres::PgStore).
pub type Pool = diesel_async::pooled_connection::deadpool::Pool<Connection>;

/// Connection checked out of the [`Pool`]; derefs to a [`Connection`].
pub type PooledConnection = Object<Connection>;

/// Returns the connection URL from `DATABASE_URL`, which must be set.
pub fn get_db_url() -> crate::Result<String> {
    env::var("DATABASE_URL")
        .with_env_var_context(|| "DATABASE_URL environment variable must be set")
}

/// Returns the pool size requested through `MAX_POOL_SIZE`, if any.
///
/// When unset, [`deadpool`] sizes the pool from the number of CPUs
/// (see [`PoolConfig::default`](deadpool::managed::PoolConfig::default)).
pub fn get_max_pool_size() -> crate::Result<Option<usize>> {
    optional_int_env_var("MAX_POOL_SIZE")
}

/// Creates the connection [`Pool`] from `DATABASE_URL` and `MAX_POOL_SIZE`.
///
/// No connection is opened here; [`deadpool`] connects on first use.
pub fn get_pool() -> crate::Result<Pool> {
    let manager = AsyncDieselConnectionManager::new(get_db_url()?);
    let builder = Pool::builder(manager);

    let builder = match get_max_pool_size()? {
        Some(max_size) => builder.max_size(max_size),
        None => builder,
    };

    Ok(builder.build()?)
}
