//! # Address Book Storage
//!
//! Opens the [SurrealDB](https://surrealdb.com) session shared by the address book slices
//! and keeps their schema current.
//!
//! The `any` engine picks the backend from the URL: `mem://` for tests and throwaway
//! sessions, `rocksdb://` behind the `storage-rocksdb` feature, `ws://`/`http://` for a
//! remote server. Engine startup is polled with a short backoff before giving up. Each
//! slice hands in versioned scripts; they run once and are recorded in a checksummed ledger.
//!
//! ## Example
//!
//! ```rust
//! use abook_database::{Database, DatabaseError, Migration};
//!
//! const MIGRATIONS: &[Migration] =
//!     &[Migration::new("demo", "0001", "DEFINE TABLE note SCHEMALESS;")];
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("abook", "addresses")
//!         .migrations(MIGRATIONS.iter().copied())
//!         .init()
//!         .await?;
//!
//!     let _version = db.version().await?;
//!
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use migrations::{AppliedMigration, Migration, MigrationReport};

use migrations::MigrationRunner;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{info, instrument, warn};

/// Health probes made before the engine is declared unavailable.
pub const HEALTH_ATTEMPTS: u32 = 3;
const HEALTH_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Connection plus the session it was activated with.
#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "Closing session");
    }
}

/// Shared handle to the address book session. Clones share one connection.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Starts configuring a connection.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Active namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    /// Active database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.db
    }

    /// Applies `migrations` that are not yet recorded in the ledger.
    ///
    /// # Errors
    /// * [`DatabaseError::Migration`] if an applied version was edited afterwards.
    /// * [`DatabaseError::Surreal`] if a script fails; its transaction is rolled back.
    pub async fn apply_migrations(
        &self,
        migrations: &[Migration],
    ) -> Result<MigrationReport, DatabaseError> {
        MigrationRunner::new(&self.inner.instance).run(migrations).await
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// Collects connection settings and migrations; nothing happens until [`DatabaseBuilder::init`].
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
    migrations: Vec<Migration>,
}

impl DatabaseBuilder {
    /// Empty builder; URL and session are mandatory before `init`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine URL such as `mem://` or `rocksdb://data/abook`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Namespace and database activated after connecting.
    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Root credentials; engines without authentication ignore them.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Queues slice migrations, applied in order during [`DatabaseBuilder::init`].
    pub fn migrations(mut self, migrations: impl IntoIterator<Item = Migration>) -> Self {
        self.migrations.extend(migrations);
        self
    }

    /// Connects, waits for the engine, signs in, activates the session and migrates.
    ///
    /// The engine gets [`HEALTH_ATTEMPTS`] health probes, the delay doubling from 500ms.
    /// Sign-in only happens when [`DatabaseBuilder::auth`] was called.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] for a blank URL, namespace or database.
    /// * [`DatabaseError::Connection`] when the engine cannot start or never reports healthy.
    /// * [`DatabaseError::Auth`] when the credentials are rejected.
    /// * [`DatabaseError::Surreal`] when `use_ns`/`use_db` fails.
    /// * [`DatabaseError::Migration`] when an applied script was edited afterwards.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = required(self.url, "URL")?;
        let ns = required(self.ns, "Namespace")?;
        let db = required(self.db, "Database")?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        let mut delay = HEALTH_INITIAL_DELAY;
        for attempt in 1..=HEALTH_ATTEMPTS {
            if instance.health().await.is_ok() {
                break;
            }
            if attempt == HEALTH_ATTEMPTS {
                return Err(DatabaseError::Connection {
                    message: "Unhealthy after retries".into(),
                    context: Some(url.into()),
                });
            }
            warn!(attempt, ?delay, "Engine not healthy yet");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        if let Some((username, password)) = self.auth {
            instance.signin(Root { username, password }).await.map_err(|e| {
                DatabaseError::Auth { message: e.to_string().into(), context: Some(url.into()) }
            })?;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Activating session")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "Connected");

        let database = Database { inner: Arc::new(DatabaseInner { instance, ns, db }) };

        if !self.migrations.is_empty() {
            let report = database.apply_migrations(&self.migrations).await?;
            info!(
                applied = report.applied.len(),
                skipped = report.skipped.len(),
                "Schema up to date"
            );
        }

        Ok(database)
    }
}

fn required(value: Option<String>, what: &'static str) -> Result<String, DatabaseError> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| DatabaseError::Validation {
        message: format!("{what} is required").into(),
        context: None,
    })
}
