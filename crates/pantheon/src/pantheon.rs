// Copyright (C) 2025 Micah R Ledbetter
// SPDX-License-Identifier: Apache-2.0

//! This library provides the Pantheon dataset store.
//!
//! The store is a single sqlite table bulk-loaded once from the Pantheon
//! tsv dataset and read-only afterward. The table schema comes from the
//! tsv header row and every value is kept as text; the only typed access
//! the application needs is the [PersonRecord] projection served by
//! [Db::random_by_country].

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use thiserror::Error;

/// The name of the records table.
pub const TABLE: &str = "pantheon";

/// The store error.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The dataset file does not exist.
    #[error("dataset source not found: {0}")]
    MissingSource(PathBuf),

    /// The dataset file has no header row.
    #[error("dataset source has no header: {0}")]
    EmptySource(PathBuf),

    /// A data row field count does not match the header.
    #[error("dataset row {row} has {got} fields, expected {want}")]
    BadRow {
        /// One-based source line number.
        row: usize,
        /// Fields found on the row.
        got: usize,
        /// Fields declared by the header.
        want: usize,
    },

    /// The table already exists with a different column set.
    #[error("table columns {existing:?} do not match the source header {header:?}")]
    SchemaMismatch {
        /// Columns of the existing table.
        existing: Vec<String>,
        /// Columns declared by the source header.
        header: Vec<String>,
    },

    /// Reading the dataset file failed.
    #[error("dataset read failed: {0}")]
    Read(#[from] std::io::Error),

    /// The underlying database failed.
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
}

/// One Pantheon entry, projected down to the columns the application uses.
/// The remaining dataset columns stay in the table as opaque text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonRecord {
    /// The person's full name, space-separated tokens.
    pub name: String,
    /// The two-letter country code of the birth place.
    pub country_code: String,
    /// The Wikipedia curid used to resolve the reference url.
    pub curid: String,
}

/// The Pantheon database handle.
#[derive(Clone)]
pub struct Db(SqlitePool);

// Double-quote an identifier, doubling any embedded quote, so that
// arbitrary tsv header names survive as column names.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Db {
    /// Open the store, creating the database file and its parent
    /// directories when needed. The table itself is only created by
    /// [Db::load].
    pub async fn open(path: &Path) -> Result<Db, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Ok(Db(pool))
    }

    /// Destroy the store file so the next [Db::load] starts from empty.
    /// A missing file is not an error. sqlx opens sqlite in WAL mode, so
    /// the `-wal` and `-shm` side files go too.
    pub fn reset(path: &Path) -> Result<(), StoreError> {
        for suffix in ["", "-wal", "-shm"] {
            let mut side = path.as_os_str().to_os_string();
            side.push(suffix);
            match std::fs::remove_file(Path::new(&side)) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
                _ => {}
            }
        }
        Ok(())
    }

    /// Check whether the records table exists.
    pub async fn is_initialized(&self) -> Result<bool, StoreError> {
        let row = sqlx::query("select name from sqlite_master where type = 'table' and name = ?")
            .bind(TABLE)
            .fetch_optional(&self.0)
            .await?;
        Ok(row.is_some())
    }

    async fn columns(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(&format!("pragma table_info({})", quote_ident(TABLE)))
            .fetch_all(&self.0)
            .await?;
        rows.iter()
            .map(|row| row.try_get("name").map_err(StoreError::from))
            .collect()
    }

    /// Load the store from a tsv dataset whose first row is the header.
    ///
    /// The table is created from the header when absent; when it already
    /// exists the header must match its columns exactly, and the rows are
    /// appended. The whole load runs in a single transaction so an
    /// interrupted load leaves no partial table behind. Returns the
    /// number of rows inserted.
    pub async fn load(&self, tsv_path: &Path) -> Result<usize, StoreError> {
        if !tsv_path.exists() {
            return Err(StoreError::MissingSource(tsv_path.into()));
        }
        let text = std::fs::read_to_string(tsv_path)?;
        let mut lines = text.lines();
        let header: Vec<String> = match lines.next() {
            Some(line) if !line.is_empty() => line.split('\t').map(str::to_string).collect(),
            _ => return Err(StoreError::EmptySource(tsv_path.into())),
        };

        let initialized = self.is_initialized().await?;
        if initialized {
            let existing = self.columns().await?;
            if existing != header {
                return Err(StoreError::SchemaMismatch { existing, header });
            }
        }

        let mut tx = self.0.begin().await?;
        if !initialized {
            let columns = header
                .iter()
                .map(|name| quote_ident(name))
                .collect::<Vec<_>>()
                .join(", ");
            sqlx::query(&format!("create table {} ({})", quote_ident(TABLE), columns))
                .execute(&mut *tx)
                .await?;
        }

        let placeholders = vec!["?"; header.len()].join(", ");
        let insert = format!("insert into {} values ({})", quote_ident(TABLE), placeholders);
        let mut count = 0;
        for (pos, line) in lines.enumerate() {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != header.len() {
                return Err(StoreError::BadRow {
                    row: pos + 2,
                    got: fields.len(),
                    want: header.len(),
                });
            }
            let mut query = sqlx::query(&insert);
            for field in &fields {
                query = query.bind(*field);
            }
            query.execute(&mut *tx).await?;
            count += 1;
        }
        tx.commit().await?;
        tracing::debug!(count, path = ?tsv_path, "Loaded the dataset");
        Ok(count)
    }

    /// Pick one record uniformly at random among the rows matching the
    /// country code. Returns `None` when no row matches.
    pub async fn random_by_country(
        &self,
        country_code: &str,
    ) -> Result<Option<PersonRecord>, StoreError> {
        let sql = format!(
            r#"select "name", "countryCode", "en_curid" from {} where "countryCode" = ? order by random() limit 1"#,
            quote_ident(TABLE)
        );
        sqlx::query(&sql)
            .bind(country_code)
            .fetch_optional(&self.0)
            .await?
            .map(|row| {
                Ok(PersonRecord {
                    name: row.try_get("name")?,
                    country_code: row.try_get("countryCode")?,
                    curid: row.try_get("en_curid")?,
                })
            })
            .transpose()
    }

    /// Count the loaded records.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query(&format!("select count(*) from {}", quote_ident(TABLE)))
            .fetch_one(&self.0)
            .await?;
        Ok(row.try_get(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tsv(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("pantheon.tsv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    async fn open_db(dir: &Path) -> Db {
        Db::open(&dir.join("pantheon.sqlite")).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_two_columns() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(dir.path()).await;
        assert!(!db.is_initialized().await.unwrap());

        let tsv = write_tsv(dir.path(), "a\tb\nx\ty\n");
        assert_eq!(db.load(&tsv).await.unwrap(), 1);
        assert!(db.is_initialized().await.unwrap());
        assert_eq!(db.count().await.unwrap(), 1);

        let row = sqlx::query(r#"select "a", "b" from "pantheon""#)
            .fetch_one(&db.0)
            .await
            .unwrap();
        assert_eq!(row.try_get::<String, _>("a").unwrap(), "x");
        assert_eq!(row.try_get::<String, _>("b").unwrap(), "y");
    }

    #[tokio::test]
    async fn test_quote_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(dir.path()).await;
        let tsv = write_tsv(
            dir.path(),
            "name\tcountryCode\ten_curid\nHe said \"hi\"\tUS\t42\n",
        );
        db.load(&tsv).await.unwrap();

        let record = db.random_by_country("US").await.unwrap().unwrap();
        assert_eq!(
            record,
            PersonRecord {
                name: "He said \"hi\"".to_string(),
                country_code: "US".to_string(),
                curid: "42".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_quoted_column_name() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(dir.path()).await;
        let tsv = write_tsv(dir.path(), "wei\"rd\tb\nx\ty\n");
        db.load(&tsv).await.unwrap();
        assert_eq!(db.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_random_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(dir.path()).await;
        let tsv = write_tsv(
            dir.path(),
            "name\tcountryCode\ten_curid\nAda Lovelace\tGB\t7\n",
        );
        db.load(&tsv).await.unwrap();
        assert_eq!(db.random_by_country("US").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reload_same_schema_appends() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(dir.path()).await;
        let tsv = write_tsv(dir.path(), "a\tb\nx\ty\n");
        db.load(&tsv).await.unwrap();
        db.load(&tsv).await.unwrap();
        assert_eq!(db.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reload_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(dir.path()).await;
        let tsv = write_tsv(dir.path(), "a\tb\nx\ty\n");
        db.load(&tsv).await.unwrap();

        let other = write_tsv(dir.path(), "a\tc\nx\ty\n");
        match db.load(&other).await {
            Err(StoreError::SchemaMismatch { existing, header }) => {
                assert_eq!(existing, vec!["a", "b"]);
                assert_eq!(header, vec!["a", "c"]);
            }
            other => panic!("expected a schema mismatch, got {:?}", other.map(|_| ())),
        }
        // The failed load must not have touched the table.
        assert_eq!(db.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bad_row_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(dir.path()).await;
        let tsv = write_tsv(dir.path(), "a\tb\nx\ty\nonly-one-field\n");
        match db.load(&tsv).await {
            Err(StoreError::BadRow { row, got, want }) => {
                assert_eq!((row, got, want), (3, 1, 2));
            }
            other => panic!("expected a bad row error, got {:?}", other.map(|_| ())),
        }
        // The transaction rolled back, so not even the table remains.
        assert!(!db.is_initialized().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(dir.path()).await;
        let missing = dir.path().join("nope.tsv");
        assert!(matches!(
            db.load(&missing).await,
            Err(StoreError::MissingSource(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(dir.path()).await;
        let tsv = write_tsv(dir.path(), "");
        assert!(matches!(
            db.load(&tsv).await,
            Err(StoreError::EmptySource(_))
        ));
    }

    #[tokio::test]
    async fn test_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pantheon.sqlite");
        {
            let db = Db::open(&path).await.unwrap();
            let tsv = write_tsv(dir.path(), "a\tb\nx\ty\n");
            db.load(&tsv).await.unwrap();
            db.0.close().await;
        }
        Db::reset(&path).unwrap();
        let db = Db::open(&path).await.unwrap();
        assert!(!db.is_initialized().await.unwrap());

        // Resetting a store that does not exist is fine.
        Db::reset(&dir.path().join("nope.sqlite")).unwrap();
    }
}
