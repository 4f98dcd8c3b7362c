mod seen;
mod destinations;
mod api_calls;

#[cfg(test)]
pub(crate) mod test;

use std::str::FromStr;
use std::sync::Arc;
use anyhow::anyhow;
use sqlx::{Pool, Sqlite};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteQueryResult};
use tokio::sync::{Mutex, MutexGuard};
pub use seen::*;
pub use destinations::*;
pub use api_calls::*;
use crate::config::DatabaseConfig;

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Clone)]
pub struct Repositories {
    pub seen: SeenOffers,
    pub destinations: Destinations,
    pub api_calls: ApiCalls,
    write_lock: Arc<Mutex<()>>,
}

impl Repositories {
    pub fn new(db_conn: &Pool<Sqlite>) -> Self {
        Self {
            seen: SeenOffers::new(db_conn.clone()),
            destinations: Destinations::new(db_conn.clone()),
            api_calls: ApiCalls::new(db_conn.clone()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The single writer lock shared by the polling loop commits and the
    /// administrative commands.
    pub async fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}

pub async fn establish_database_connection(config: &DatabaseConfig) -> Result<Pool<Sqlite>, anyhow::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options).await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

#[macro_export]
macro_rules! repository {
    ($name:ident, $($methods:item),*) => {
        #[derive(Clone)]
        pub struct $name {
            pool: sqlx::Pool<sqlx::Sqlite>,
        }

        impl $name {
            pub fn new(pool: sqlx::Pool<sqlx::Sqlite>) -> Self {
                Self { pool }
            }

            $($methods)*
        }
    };
}

fn ensure_only_one_row_updated(res: SqliteQueryResult) -> Result<SqliteQueryResult, anyhow::Error> {
    match res.rows_affected() {
        1 => Ok(res),
        x => Err(anyhow!("not only one row was updated but {x}"))
    }
}
