//! SQLite persistence for docdex catalogs.
//!
//! A [`Store`] owns one catalog database: the `docs` table of catalog entries
//! with its FTS5 index, and the `help_urls` table of symbol associations.
//! [`Store::create`] starts a fresh database for a build; [`Store::open`]
//! reads an existing one for lookups.

mod schema;
mod search;

use std::path::Path;

use docdex_catalog::{Catalog, SymbolAssociation};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use search::{SearchHit, SearchTier};

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Store error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// I/O error while replacing the database file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// No document with this row id.
    #[error("No document with rowid {0}")]
    NotFound(i64),
    /// Search query is empty.
    #[error("Empty search string")]
    EmptyQuery,
}

/// A catalog entry as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub rowid: i64,
    pub path: String,
    pub file: String,
    pub title: String,
    pub keywords: String,
    pub content: String,
    pub excluded: bool,
}

type DocumentRow = (i64, String, String, String, String, String, bool);

impl From<DocumentRow> for StoredDocument {
    fn from((rowid, path, file, title, keywords, content, excluded): DocumentRow) -> Self {
        Self {
            rowid,
            path,
            file,
            title,
            keywords,
            content,
            excluded,
        }
    }
}

/// Catalog database.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a fresh database at `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the old file cannot be removed or the schema cannot
    /// be created.
    pub async fn create(path: &Path) -> Result<Self, StoreError> {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed existing database"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let store = Self::connect(options).await?;
        store.init_schema().await?;
        Ok(store)
    }

    /// Open an existing database.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);
        Self::connect(options).await
    }

    /// Create a database that lives only as long as this store.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let store = Self::connect(options).await?;
        store.init_schema().await?;
        Ok(store)
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        // A single long-lived connection keeps in-memory databases alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in schema::CREATE_STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert all catalog entries in one transaction.
    ///
    /// Entries whose path is already stored are ignored. Returns the number of
    /// rows inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is written in that case.
    pub async fn write_catalog(&self, catalog: &Catalog) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for entry in catalog {
            let result = sqlx::query(schema::INSERT_DOC)
                .bind(&entry.path)
                .bind(&entry.file)
                .bind(&entry.title)
                .bind(&entry.keywords)
                .bind(&entry.content)
                .bind(entry.excluded)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;

        tracing::info!(inserted, total = catalog.len(), "Stored catalog entries");
        Ok(inserted)
    }

    /// Insert symbol associations in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is written in that case.
    pub async fn write_associations(
        &self,
        associations: &[SymbolAssociation],
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for association in associations {
            let result = sqlx::query(schema::INSERT_HELP_URL)
                .bind(&association.symbol)
                .bind(&association.path)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;

        tracing::info!(inserted, "Stored symbol associations");
        Ok(inserted)
    }

    /// Search the catalog. See [`SearchTier`] for the matching order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EmptyQuery` for a blank query.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, StoreError> {
        search::search(&self.pool, query, limit).await
    }

    /// Fetch a document by row id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no document has this id.
    pub async fn fetch(&self, rowid: i64) -> Result<StoredDocument, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as(schema::SELECT_DOC_BY_ROWID)
            .bind(rowid)
            .fetch_optional(&self.pool)
            .await?;
        row.map(StoredDocument::from)
            .ok_or(StoreError::NotFound(rowid))
    }

    /// Find the document associated with a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn lookup_symbol(&self, symbol: &str) -> Result<Option<StoredDocument>, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as(schema::SELECT_DOC_BY_SYMBOL)
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(StoredDocument::from))
    }

    /// Number of stored documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn document_count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(schema::COUNT_DOCS)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Close the underlying connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdex_catalog::CatalogEntry;
    use pretty_assertions::assert_eq;

    fn entry(path: &str, title: &str, keywords: &str, content: &str) -> CatalogEntry {
        CatalogEntry {
            path: path.to_owned(),
            file: format!("docs/{}.md", title.to_lowercase().replace(' ', "-")),
            title: title.to_owned(),
            keywords: keywords.to_owned(),
            content: content.to_owned(),
            excluded: false,
        }
    }

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(entry(
            "Primitive Functions / Index Generator",
            "Index Generator",
            "⍳ iota",
            "Produces consecutive integers. See also Shape.",
        ));
        catalog.insert(entry(
            "Primitive Functions / Shape",
            "Shape",
            "⍴ rho",
            "Returns the dimensions of an array.",
        ));
        catalog.insert(entry(
            "Primitive Operators / Each",
            "Each",
            "¨",
            "Applies a function to each item. Works with Shape results.",
        ));
        catalog.insert(CatalogEntry {
            excluded: true,
            ..entry("Symbols / Iota", "Iota", "", "Disambiguation for the iota symbol.")
        });
        catalog
    }

    async fn sample_store() -> Store {
        let store = Store::in_memory().await.unwrap();
        store.write_catalog(&sample_catalog()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_write_catalog_counts_rows() {
        let store = Store::in_memory().await.unwrap();
        let inserted = store.write_catalog(&sample_catalog()).await.unwrap();

        assert_eq!(inserted, 4);
        assert_eq!(store.document_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_write_catalog_ignores_existing_paths() {
        let store = sample_store().await;
        let inserted = store.write_catalog(&sample_catalog()).await.unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(store.document_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_fetch_by_rowid() {
        let store = sample_store().await;
        let hits = store.search("rho", 10).await.unwrap();
        let document = store.fetch(hits[0].rowid).await.unwrap();

        assert_eq!(document.path, "Primitive Functions / Shape");
        assert_eq!(document.content, "Returns the dimensions of an array.");
        assert!(!document.excluded);
    }

    #[tokio::test]
    async fn test_fetch_unknown_rowid() {
        let store = sample_store().await;
        let result = store.fetch(999).await;
        assert!(matches!(result, Err(StoreError::NotFound(999))));
    }

    #[tokio::test]
    async fn test_search_keywords_case_insensitive() {
        let store = sample_store().await;
        let hits = store.search("IOTA", 10).await.unwrap();

        assert_eq!(hits[0].title, "Index Generator");
        assert_eq!(hits[0].tier, SearchTier::Keywords);
    }

    #[tokio::test]
    async fn test_search_tiers_in_order_without_duplicates() {
        let store = sample_store().await;
        let hits = store.search("shape", 10).await.unwrap();
        let found: Vec<_> = hits.iter().map(|h| (h.title.as_str(), h.tier)).collect();

        // Shape matches by title and by nothing else, the others by content.
        assert_eq!(found[0], ("Shape", SearchTier::Title));
        assert_eq!(found.len(), 3);
        assert!(found[1..].iter().all(|(_, tier)| *tier == SearchTier::Content));

        let mut rowids: Vec<_> = hits.iter().map(|h| h.rowid).collect();
        rowids.dedup();
        assert_eq!(rowids.len(), hits.len());
    }

    #[tokio::test]
    async fn test_search_limit() {
        let store = sample_store().await;
        let hits = store.search("shape", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].tier, SearchTier::Title);
    }

    #[tokio::test]
    async fn test_search_finds_excluded_entries() {
        let store = sample_store().await;
        let hits = store.search("disambiguation", 10).await.unwrap();

        assert_eq!(hits.len(), 1);
        let document = store.fetch(hits[0].rowid).await.unwrap();
        assert!(document.excluded);
    }

    #[tokio::test]
    async fn test_search_quotes_fts_syntax() {
        let store = sample_store().await;
        let hits = store.search("each AND \"", 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let store = sample_store().await;
        assert!(matches!(
            store.search("  ", 10).await,
            Err(StoreError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_lookup_symbol() {
        let store = sample_store().await;
        let associations = vec![
            SymbolAssociation {
                symbol: "⍴".to_owned(),
                path: "Primitive Functions / Shape".to_owned(),
            },
            SymbolAssociation {
                symbol: "⍴".to_owned(),
                path: "Primitive Operators / Each".to_owned(),
            },
        ];
        let inserted = store.write_associations(&associations).await.unwrap();
        assert_eq!(inserted, 1);

        let document = store.lookup_symbol("⍴").await.unwrap().unwrap();
        assert_eq!(document.title, "Shape");
        assert!(store.lookup_symbol("⍬").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/docdex.db");

        let store = Store::create(&path).await.unwrap();
        store.write_catalog(&sample_catalog()).await.unwrap();
        store.close().await;

        let store = Store::create(&path).await.unwrap();
        assert_eq!(store.document_count().await.unwrap(), 0);
        store.close().await;

        let reopened = Store::open(&path).await.unwrap();
        assert_eq!(reopened.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Store::open(&dir.path().join("missing.db")).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
