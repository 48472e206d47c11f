//! Three-tier catalog search.
//!
//! Tiers run in priority order and their results are concatenated:
//!
//! 1. case-insensitive substring match on keywords
//! 2. full-text phrase match on titles
//! 3. full-text phrase match on content
//!
//! A document found by an earlier tier is not repeated by a later one.

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::StoreError;

/// Search tier that produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTier {
    Keywords,
    Title,
    Content,
}

impl SearchTier {
    /// All tiers in priority order.
    pub const ALL: [Self; 3] = [Self::Keywords, Self::Title, Self::Content];

    fn sql(self) -> &'static str {
        match self {
            Self::Keywords => {
                "SELECT rowid, title FROM docs \
                 WHERE keywords LIKE '%' || ?1 || '%' COLLATE NOCASE \
                 ORDER BY rowid"
            }
            Self::Title => "SELECT rowid, title FROM docs_fts WHERE title MATCH ?1 ORDER BY rank",
            Self::Content => {
                "SELECT rowid, title FROM docs_fts WHERE content MATCH ?1 ORDER BY rank"
            }
        }
    }

    fn parameter(self, query: &str) -> String {
        match self {
            Self::Keywords => query.to_owned(),
            Self::Title | Self::Content => phrase_query(query),
        }
    }
}

/// A search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub rowid: i64,
    pub title: String,
    pub tier: SearchTier,
}

/// Quote `query` as a single FTS5 phrase so operators and punctuation match literally.
pub(crate) fn phrase_query(query: &str) -> String {
    format!("\"{}\"", query.replace('"', "\"\""))
}

/// Run all tiers, deduplicating by row id and stopping at `limit` hits.
pub(crate) async fn search(
    pool: &SqlitePool,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchHit>, StoreError> {
    if query.trim().is_empty() {
        return Err(StoreError::EmptyQuery);
    }

    let mut seen = HashSet::new();
    let mut hits = Vec::new();

    for tier in SearchTier::ALL {
        if hits.len() >= limit {
            break;
        }

        let rows: Vec<(i64, String)> = sqlx::query_as(tier.sql())
            .bind(tier.parameter(query))
            .fetch_all(pool)
            .await?;

        let before = hits.len();
        for (rowid, title) in rows {
            if hits.len() >= limit {
                break;
            }
            if seen.insert(rowid) {
                hits.push(SearchHit { rowid, title, tier });
            }
        }
        tracing::debug!(?tier, new_hits = hits.len() - before, "Search tier finished");
    }

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_phrase_query_plain() {
        assert_eq!(phrase_query("index generator"), "\"index generator\"");
    }

    #[test]
    fn test_phrase_query_doubles_quotes() {
        assert_eq!(phrase_query(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn test_phrase_query_keeps_operators_literal() {
        assert_eq!(phrase_query("a OR b*"), "\"a OR b*\"");
    }

    #[test]
    fn test_keyword_tier_passes_raw_query() {
        assert_eq!(SearchTier::Keywords.parameter("⍳"), "⍳");
        assert_eq!(SearchTier::Content.parameter("⍳"), "\"⍳\"");
    }
}
