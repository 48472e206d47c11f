//! Database schema.

/// Statements creating a fresh catalog database, in execution order.
///
/// `docs_fts` is an external-content FTS5 table over `docs`. Rows reach it
/// only through the insert trigger, so `INSERT OR IGNORE` collisions never
/// leave stale index entries.
pub(crate) const CREATE_STATEMENTS: &[&str] = &[
    r"CREATE TABLE docs (
        path TEXT PRIMARY KEY,
        file TEXT NOT NULL,
        title TEXT NOT NULL,
        keywords TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL,
        exclude INTEGER NOT NULL DEFAULT 0
    )",
    r"CREATE VIRTUAL TABLE docs_fts USING fts5(
        path,
        title,
        keywords,
        content,
        content='docs',
        content_rowid='rowid'
    )",
    r"CREATE TRIGGER docs_ai AFTER INSERT ON docs BEGIN
        INSERT INTO docs_fts(rowid, path, title, keywords, content)
        VALUES (NEW.rowid, NEW.path, NEW.title, NEW.keywords, NEW.content);
    END",
    r"CREATE TABLE help_urls (
        symbol TEXT PRIMARY KEY,
        path TEXT NOT NULL
    )",
];

pub(crate) const INSERT_DOC: &str = "INSERT OR IGNORE INTO docs (path, file, title, keywords, content, exclude) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

pub(crate) const INSERT_HELP_URL: &str =
    "INSERT OR IGNORE INTO help_urls (symbol, path) VALUES (?1, ?2)";

pub(crate) const SELECT_DOC_BY_ROWID: &str =
    "SELECT rowid, path, file, title, keywords, content, exclude FROM docs WHERE rowid = ?1";

pub(crate) const SELECT_DOC_BY_SYMBOL: &str = "SELECT d.rowid, d.path, d.file, d.title, d.keywords, d.content, d.exclude \
     FROM help_urls h JOIN docs d ON d.path = h.path \
     WHERE h.symbol = ?1";

pub(crate) const COUNT_DOCS: &str = "SELECT COUNT(*) FROM docs";
