//! Shop repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/read/update/delete, substring search, exact lookups and
//!   count over the `shops` table.
//! - Stamp `created_date`/`updated_date` at the moment of write.
//!
//! # Invariants
//! - Every operation is a single SQL statement and therefore atomic.
//! - Write paths call `ShopDraft::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `updated_date` strictly increases on every successful update.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::shop::{Shop, ShopDraft, ShopId, ShopValidationError};
use crate::query::substring::SubstringQuery;
use rusqlite::{params, params_from_iter, Connection, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

const SHOP_COLUMNS: &str = "id, name, address, phone, email, created_date, updated_date";

const REQUIRED_SHOP_COLUMNS: &[&str] = &[
    "id",
    "name",
    "address",
    "phone",
    "email",
    "created_date",
    "updated_date",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Store failure for shop persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ShopValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted shop data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShopValidationError> for RepoError {
    fn from(value: ShopValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable store contract for shop records.
pub trait ShopRepository {
    /// Persists a new shop; the store assigns `id` and both timestamps.
    /// `draft.id` is ignored.
    fn insert(&self, draft: &ShopDraft) -> RepoResult<Shop>;
    fn get_by_id(&self, id: ShopId) -> RepoResult<Option<Shop>>;
    fn exists_by_id(&self, id: ShopId) -> RepoResult<bool>;
    /// Overwrites the mutable fields of an existing row and refreshes
    /// `updated_date`. Returns `None` when no row has `id`.
    fn update(&self, id: ShopId, draft: &ShopDraft) -> RepoResult<Option<Shop>>;
    /// Hard-deletes one row. Returns `false` when it was already absent.
    fn delete_by_id(&self, id: ShopId) -> RepoResult<bool>;
    /// All rows in primary-key order.
    fn find_all(&self) -> RepoResult<Vec<Shop>>;
    /// Rows matching a literal, case-insensitive substring query, in
    /// primary-key order.
    fn find_by_substring(&self, query: &SubstringQuery) -> RepoResult<Vec<Shop>>;
    fn count(&self) -> RepoResult<u64>;
    /// Exact email match; the lowest id wins when several rows share it.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<Shop>>;
    /// Exact phone match; the lowest id wins when several rows share it.
    fn find_by_phone(&self, phone: &str) -> RepoResult<Option<Shop>>;
}

impl<R: ShopRepository + ?Sized> ShopRepository for &R {
    fn insert(&self, draft: &ShopDraft) -> RepoResult<Shop> {
        (**self).insert(draft)
    }

    fn get_by_id(&self, id: ShopId) -> RepoResult<Option<Shop>> {
        (**self).get_by_id(id)
    }

    fn exists_by_id(&self, id: ShopId) -> RepoResult<bool> {
        (**self).exists_by_id(id)
    }

    fn update(&self, id: ShopId, draft: &ShopDraft) -> RepoResult<Option<Shop>> {
        (**self).update(id, draft)
    }

    fn delete_by_id(&self, id: ShopId) -> RepoResult<bool> {
        (**self).delete_by_id(id)
    }

    fn find_all(&self) -> RepoResult<Vec<Shop>> {
        (**self).find_all()
    }

    fn find_by_substring(&self, query: &SubstringQuery) -> RepoResult<Vec<Shop>> {
        (**self).find_by_substring(query)
    }

    fn count(&self) -> RepoResult<u64> {
        (**self).count()
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<Shop>> {
        (**self).find_by_email(email)
    }

    fn find_by_phone(&self, phone: &str) -> RepoResult<Option<Shop>> {
        (**self).find_by_phone(phone)
    }
}

/// SQLite-backed shop repository.
pub struct SqliteShopRepository<'conn> {
    conn: &'conn Connection,
    clock: fn() -> i64,
}

impl<'conn> SqliteShopRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the `shops`
    ///   table does not have the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            clock: now_epoch_ms,
        })
    }

    /// Replaces the wall clock used to stamp timestamps.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    fn query_shops<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Shop>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut shops = Vec::new();

        while let Some(row) = rows.next()? {
            shops.push(parse_shop_row(row)?);
        }

        Ok(shops)
    }

    fn query_first<P: Params>(&self, sql: &str, params: P) -> RepoResult<Option<Shop>> {
        Ok(self.query_shops(sql, params)?.into_iter().next())
    }
}

impl ShopRepository for SqliteShopRepository<'_> {
    fn insert(&self, draft: &ShopDraft) -> RepoResult<Shop> {
        draft.validate()?;

        let now = (self.clock)();
        self.query_first(
            &format!(
                "INSERT INTO shops (name, address, phone, email, created_date, updated_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 RETURNING {SHOP_COLUMNS};"
            ),
            params![
                draft.name.as_str(),
                draft.address.as_str(),
                draft.phone.as_deref(),
                draft.email.as_deref(),
                now,
            ],
        )?
        .ok_or_else(|| RepoError::InvalidData("insert returned no row".to_string()))
    }

    fn get_by_id(&self, id: ShopId) -> RepoResult<Option<Shop>> {
        self.query_first(
            &format!("SELECT {SHOP_COLUMNS} FROM shops WHERE id = ?1;"),
            [id],
        )
    }

    fn exists_by_id(&self, id: ShopId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM shops WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn update(&self, id: ShopId, draft: &ShopDraft) -> RepoResult<Option<Shop>> {
        draft.validate()?;

        let now = (self.clock)();
        self.query_first(
            &format!(
                "UPDATE shops
                 SET
                    name = ?1,
                    address = ?2,
                    phone = ?3,
                    email = ?4,
                    updated_date = MAX(?5, updated_date + 1)
                 WHERE id = ?6
                 RETURNING {SHOP_COLUMNS};"
            ),
            params![
                draft.name.as_str(),
                draft.address.as_str(),
                draft.phone.as_deref(),
                draft.email.as_deref(),
                now,
                id,
            ],
        )
    }

    fn delete_by_id(&self, id: ShopId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM shops WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn find_all(&self) -> RepoResult<Vec<Shop>> {
        self.query_shops(
            &format!("SELECT {SHOP_COLUMNS} FROM shops ORDER BY id ASC;"),
            [],
        )
    }

    fn find_by_substring(&self, query: &SubstringQuery) -> RepoResult<Vec<Shop>> {
        let predicate = query.to_predicate();
        let mut sql = format!("SELECT {SHOP_COLUMNS} FROM shops");
        if let Some(clause) = predicate.clause.as_deref() {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        sql.push_str(" ORDER BY id ASC;");

        self.query_shops(&sql, params_from_iter(predicate.binds))
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM shops;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<Shop>> {
        self.query_first(
            &format!("SELECT {SHOP_COLUMNS} FROM shops WHERE email = ?1 ORDER BY id ASC LIMIT 1;"),
            [email],
        )
    }

    fn find_by_phone(&self, phone: &str) -> RepoResult<Option<Shop>> {
        self.query_first(
            &format!("SELECT {SHOP_COLUMNS} FROM shops WHERE phone = ?1 ORDER BY id ASC LIMIT 1;"),
            [phone],
        )
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'shops'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists != 1 {
        return Err(RepoError::MissingRequiredTable("shops"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(shops);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for required in REQUIRED_SHOP_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::MissingRequiredColumn {
                table: "shops",
                column: *required,
            });
        }
    }

    Ok(())
}

fn parse_shop_row(row: &Row<'_>) -> RepoResult<Shop> {
    let shop = Shop {
        id: row.get("id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        created_date: row.get("created_date")?,
        updated_date: row.get("updated_date")?,
    };
    shop.validate()
        .map_err(|err| RepoError::InvalidData(format!("shop {}: {err}", shop.id)))?;
    Ok(shop)
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, ShopRepository, SqliteShopRepository};
    use crate::db::open_db_in_memory;
    use crate::model::shop::ShopDraft;

    fn frozen_clock() -> i64 {
        1_700_000_000_000
    }

    #[test]
    fn now_epoch_ms_is_after_2020() {
        assert!(now_epoch_ms() > 1_577_836_800_000);
    }

    #[test]
    fn update_advances_updated_date_even_with_frozen_clock() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteShopRepository::try_new(&conn)
            .unwrap()
            .with_clock(frozen_clock);

        let created = repo.insert(&ShopDraft::new("Deli", "1 Elm St")).unwrap();
        assert_eq!(created.created_date, 1_700_000_000_000);
        assert_eq!(created.updated_date, created.created_date);

        let first = repo
            .update(created.id, &ShopDraft::new("Deli", "2 Elm St"))
            .unwrap()
            .unwrap();
        let second = repo
            .update(created.id, &ShopDraft::new("Deli", "3 Elm St"))
            .unwrap()
            .unwrap();

        assert_eq!(first.updated_date, created.updated_date + 1);
        assert_eq!(second.updated_date, first.updated_date + 1);
        assert_eq!(second.created_date, created.created_date);
    }
}
