use std::{marker::PhantomData, path::PathBuf, sync::Arc, sync::Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use time::OffsetDateTime;

use crate::models::{
    AiFeedback, FinancialAccount, Organization, Transaction, TransactionCategory, User,
};
use crate::storage::{fresh_id, DatabaseProvider, Entity, Repository, StorageError};

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Persistence(e.to_string())
    }
}

/// Secondary index over one JSON field of a table's document column.
pub struct IndexSpec {
    pub name: &'static str,
    pub field: &'static str,
    pub unique: bool,
}

pub struct TableSpec {
    pub name: &'static str,
    pub indexes: &'static [IndexSpec],
}

/// Current schema version. Upgrades are additive-only: tables and indexes
/// missing at the target version are created, existing ones are untouched.
pub const SCHEMA_VERSION: i32 = 1;

pub fn schema_tables() -> &'static [TableSpec] {
    &[
        TableSpec {
            name: User::TABLE,
            indexes: &[IndexSpec {
                name: "email",
                field: "email",
                unique: true,
            }],
        },
        TableSpec {
            name: Organization::TABLE,
            indexes: &[
                IndexSpec {
                    name: "user_id",
                    field: "user_id",
                    unique: false,
                },
                IndexSpec {
                    name: "slug",
                    field: "slug",
                    unique: true,
                },
            ],
        },
        TableSpec {
            name: Transaction::TABLE,
            indexes: &[
                IndexSpec {
                    name: "user_id",
                    field: "user_id",
                    unique: false,
                },
                IndexSpec {
                    name: "organization_id",
                    field: "organization_id",
                    unique: false,
                },
                IndexSpec {
                    name: "category_id",
                    field: "category_id",
                    unique: false,
                },
                IndexSpec {
                    name: "kind",
                    field: "kind",
                    unique: false,
                },
                IndexSpec {
                    name: "date",
                    field: "date",
                    unique: false,
                },
            ],
        },
        TableSpec {
            name: TransactionCategory::TABLE,
            indexes: &[],
        },
        TableSpec {
            name: AiFeedback::TABLE,
            indexes: &[
                IndexSpec {
                    name: "kind",
                    field: "kind",
                    unique: false,
                },
                IndexSpec {
                    name: "priority",
                    field: "priority",
                    unique: false,
                },
                IndexSpec {
                    name: "category",
                    field: "category",
                    unique: false,
                },
                IndexSpec {
                    name: "actionable",
                    field: "actionable",
                    unique: false,
                },
            ],
        },
        TableSpec {
            name: FinancialAccount::TABLE,
            indexes: &[IndexSpec {
                name: "organization_id",
                field: "organization_id",
                unique: false,
            }],
        },
    ]
}

#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file; `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    pub version: i32,
}

impl SqliteConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            version: SCHEMA_VERSION,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            version: SCHEMA_VERSION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxMode {
    Read,
    Write,
}

/// Connection wrapper. Repository code never touches rusqlite directly;
/// every operation goes through `execute`, which scopes a transaction of the
/// requested mode around a single closure.
pub struct SqliteClient {
    config: SqliteConfig,
    conn: Mutex<Option<Connection>>,
}

impl SqliteClient {
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
        }
    }

    pub fn initialize(&self) -> Result<(), StorageError> {
        let mut guard = self.conn.lock().unwrap();
        if guard.is_some() {
            return Ok(());
        }

        let conn = match &self.config.path {
            Some(path) => Connection::open(path),
            None => Connection::open_in_memory(),
        }?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let current: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        if current < self.config.version {
            Self::upgrade_schema(&conn)?;
            conn.pragma_update(None, "user_version", self.config.version)?;
            tracing::debug!(
                from = current,
                to = self.config.version,
                "sqlite schema upgraded"
            );
        }

        *guard = Some(conn);
        tracing::debug!(path = ?self.config.path, "sqlite client initialized");
        Ok(())
    }

    fn upgrade_schema(conn: &Connection) -> Result<(), StorageError> {
        for table in schema_tables() {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, data TEXT NOT NULL)",
                table.name
            ))?;
            for index in table.indexes {
                let uniqueness = if index.unique { "UNIQUE " } else { "" };
                conn.execute_batch(&format!(
                    "CREATE {}INDEX IF NOT EXISTS idx_{}_{} ON {} (json_extract(data, '$.{}'))",
                    uniqueness, table.name, index.name, table.name, index.field
                ))?;
            }
        }
        Ok(())
    }

    pub fn close(&self) {
        self.conn.lock().unwrap().take();
        tracing::debug!("sqlite client closed");
    }

    /// Runs `op` inside a transaction of the given mode and commits on
    /// success. Transaction-level failures reject the caller the same way
    /// per-operation failures do.
    pub fn execute<R>(
        &self,
        mode: TxMode,
        op: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let mut guard = self.conn.lock().unwrap();
        let conn = guard.as_mut().ok_or(StorageError::NotInitialized)?;
        let behavior = match mode {
            TxMode::Read => TransactionBehavior::Deferred,
            TxMode::Write => TransactionBehavior::Immediate,
        };
        let tx = conn.transaction_with_behavior(behavior)?;
        let out = op(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

/// Durable repository over one table. Records are stored as JSON documents
/// keyed by id; secondary indexes exist for housekeeping and are not part of
/// the query contract, so `find_by` is a scan like the mock backend's.
pub struct SqliteRepository<T: Entity> {
    client: Arc<SqliteClient>,
    _table: PhantomData<fn() -> T>,
}

impl<T: Entity> SqliteRepository<T> {
    pub fn new(client: Arc<SqliteClient>) -> Self {
        Self {
            client,
            _table: PhantomData,
        }
    }

    fn decode(data: &str) -> Result<T, StorageError> {
        Ok(serde_json::from_str(data)?)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for SqliteRepository<T> {
    async fn create(&self, record: T) -> Result<T, StorageError> {
        let mut record = record;
        record.assign(fresh_id(), OffsetDateTime::now_utc());
        let data = serde_json::to_string(&record)?;
        let id = record.id().to_string();
        self.client.execute(TxMode::Write, |tx| {
            tx.execute(
                &format!("INSERT INTO {} (id, data) VALUES (?1, ?2)", T::TABLE),
                params![id, data],
            )?;
            Ok(())
        })?;
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, StorageError> {
        let row: Option<String> = self.client.execute(TxMode::Read, |tx| {
            Ok(tx
                .query_row(
                    &format!("SELECT data FROM {} WHERE id = ?1", T::TABLE),
                    params![id],
                    |r| r.get(0),
                )
                .optional()?)
        })?;
        row.as_deref().map(Self::decode).transpose()
    }

    async fn find_all(&self) -> Result<Vec<T>, StorageError> {
        let rows: Vec<String> = self.client.execute(TxMode::Read, |tx| {
            let mut stmt =
                tx.prepare(&format!("SELECT data FROM {} ORDER BY rowid", T::TABLE))?;
            let rows = stmt
                .query_map([], |r| r.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        rows.iter().map(|d| Self::decode(d)).collect()
    }

    async fn find_by(&self, filter: T::Filter) -> Result<Vec<T>, StorageError> {
        let all = self.find_all().await?;
        Ok(all.into_iter().filter(|r| r.matches(&filter)).collect())
    }

    async fn update(&self, id: &str, patch: T::Patch) -> Result<T, StorageError> {
        self.client.execute(TxMode::Write, |tx| {
            let row: Option<String> = tx
                .query_row(
                    &format!("SELECT data FROM {} WHERE id = ?1", T::TABLE),
                    params![id],
                    |r| r.get(0),
                )
                .optional()?;
            let data = row.ok_or_else(|| StorageError::not_found(T::TABLE, id))?;
            let mut record = Self::decode(&data)?;
            record.merge(patch);
            record.touch(OffsetDateTime::now_utc());
            tx.execute(
                &format!("UPDATE {} SET data = ?2 WHERE id = ?1", T::TABLE),
                params![id, serde_json::to_string(&record)?],
            )?;
            Ok(record)
        })
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.client.execute(TxMode::Write, |tx| {
            // The underlying DELETE is a no-op on absent keys; report
            // NotFound explicitly to keep both backends' contracts identical.
            let changed = tx.execute(
                &format!("DELETE FROM {} WHERE id = ?1", T::TABLE),
                params![id],
            )?;
            if changed == 0 {
                return Err(StorageError::not_found(T::TABLE, id));
            }
            Ok(())
        })
    }
}

/// Durable backend persisting across sessions in a single SQLite file.
pub struct SqliteProvider {
    client: Arc<SqliteClient>,
}

impl SqliteProvider {
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            client: Arc::new(SqliteClient::new(config)),
        }
    }

    fn repository<T: Entity>(&self) -> Arc<dyn Repository<T>> {
        Arc::new(SqliteRepository::<T>::new(self.client.clone()))
    }
}

#[async_trait]
impl DatabaseProvider for SqliteProvider {
    async fn initialize(&self) -> Result<(), StorageError> {
        self.client.initialize()
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.client.close();
        Ok(())
    }

    fn users(&self) -> Arc<dyn Repository<User>> {
        self.repository()
    }

    fn organizations(&self) -> Arc<dyn Repository<Organization>> {
        self.repository()
    }

    fn transactions(&self) -> Arc<dyn Repository<Transaction>> {
        self.repository()
    }

    fn transaction_categories(&self) -> Arc<dyn Repository<TransactionCategory>> {
        self.repository()
    }

    fn feedbacks(&self) -> Arc<dyn Repository<AiFeedback>> {
        self.repository()
    }

    fn financial_accounts(&self) -> Arc<dyn Repository<FinancialAccount>> {
        self.repository()
    }
}
