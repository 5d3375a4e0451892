use crate::error::{DatabaseError, DatabaseErrorExt};
use abook_domain::constants::MIGRATION;
use fxhash::FxHashMap;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;
use tracing::{info, instrument, trace};

/// Ledger of applied migrations, created on every start before any slice script runs.
const LEDGER_SCHEMA: &str = "
    DEFINE TABLE OVERWRITE migration SCHEMAFULL;
    DEFINE FIELD OVERWRITE slice ON migration TYPE string;
    DEFINE FIELD OVERWRITE version ON migration TYPE string;
    DEFINE FIELD OVERWRITE checksum ON migration TYPE string;
    DEFINE FIELD OVERWRITE applied_at ON migration TYPE datetime DEFAULT time::now();
    DEFINE INDEX OVERWRITE migration_key ON migration FIELDS slice, version UNIQUE;
";

/// A versioned schema script owned by a feature slice.
///
/// Slices embed their scripts with `include_str!` and hand them to
/// [`DatabaseBuilder::migrations`](crate::DatabaseBuilder::migrations). Versions are
/// applied in the order given; an applied version is never re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub slice: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(slice: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice, version, script }
    }

    /// Hex encoded SHA-256 of the script, recorded in the ledger.
    #[must_use]
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.script.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }

    fn to_applied(self) -> AppliedMigration {
        AppliedMigration {
            slice: self.slice.to_owned(),
            version: self.version.to_owned(),
            checksum: self.checksum(),
        }
    }
}

/// Outcome of a migration run.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

/// A ledger row.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
pub struct AppliedMigration {
    pub slice: String,
    pub version: String,
    pub checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    #[must_use]
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    #[instrument(skip_all, fields(count = migrations.len()))]
    pub(crate) async fn run(
        &self,
        migrations: &[Migration],
    ) -> Result<MigrationReport, DatabaseError> {
        self.db
            .query(LEDGER_SCHEMA)
            .await
            .context("Defining migration ledger")?
            .check()
            .map_err(surrealdb::Error::from)?;

        let ledger = self.ledger().await?;
        let mut report = MigrationReport::default();

        for migration in migrations {
            if let Some(applied) = ledger.get(&migration.key()) {
                ensure_checksum_match(migration, &applied.checksum)?;
                trace!(slice = migration.slice, version = migration.version, "Skipping migration");
                report.skipped.push(migration.to_applied());
                continue;
            }

            self.apply(migration).await?;
            info!(slice = migration.slice, version = migration.version, "Applied migration");
            report.applied.push(migration.to_applied());
        }

        Ok(report)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE {MIGRATION} CONTENT {{ slice: $slice, version: $version, checksum: $checksum }};
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(&query)
            .bind(("slice", migration.slice))
            .bind(("version", migration.version))
            .bind(("checksum", migration.checksum()))
            .await
            .context(format!("Sending {}", migration.key()))?
            .check()
            .map_err(surrealdb::Error::from)
            .context(format!("SQL execution failed at {}", migration.key()))?;

        Ok(())
    }

    async fn ledger(&self) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query(format!("SELECT slice, version, checksum FROM {MIGRATION}"))
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing migration ledger")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.slice, entry.version), entry))
            .collect())
    }
}

fn ensure_checksum_match(migration: &Migration, recorded: &str) -> Result<(), DatabaseError> {
    let checksum = migration.checksum();
    if recorded != checksum {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (recorded {recorded}, found {checksum})",
                migration.key()
            )
            .into(),
            context: Some("Migration already applied with a different script".into()),
        });
    }
    Ok(())
}
