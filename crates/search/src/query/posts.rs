//! Post lookups outside faceted search.
//!
//! These read tags from the relational `"tag map"` table rather than the
//! denormalized array used by post search.

use super::binder::{Binder, SqlParam};
use super::statement::{Statement, lines};
use crate::query::clause::title_search_predicate;
use crate::types::{MAX_POST_LIMIT, Pagination};

/// Fetches full posts by id. Returns `None` for an empty id list.
pub fn posts_by_id(ids: &[i64]) -> Option<Statement> {
    if ids.is_empty() {
        return None;
    }
    let (p, binder) = Binder::new().bind(SqlParam::IntegerArray(ids.to_vec()));
    let text = lines([
        "SELECT posts.*, json_agg(DISTINCT images.*) AS images,",
        "json_agg(DISTINCT \"tag map\".tag) AS tags,",
        "COUNT(DISTINCT favorites.\"username\") AS \"favoriteCount\",",
        "ROUND(AVG(DISTINCT cuteness.\"cuteness\")) AS \"cuteness\"",
        "FROM posts",
        "JOIN images ON posts.\"postID\" = images.\"postID\"",
        "JOIN \"tag map\" ON posts.\"postID\" = \"tag map\".\"postID\"",
        "LEFT JOIN \"favorites\" ON posts.\"postID\" = \"favorites\".\"postID\"",
        "LEFT JOIN \"cuteness\" ON posts.\"postID\" = \"cuteness\".\"postID\"",
        format!("WHERE posts.\"postID\" = ANY ({p}::bigint[])").as_str(),
        "GROUP BY posts.\"postID\"",
    ]);
    Some(Statement::new(text, binder.into_params()))
}

/// Lists posts flagged as deleted, optionally filtered by title.
///
/// Pages are a fixed 100 rows.
pub fn deleted_posts(search: Option<&str>, pagination: Pagination) -> Statement {
    let mut predicates = vec!["posts.\"deleted\" IS TRUE".to_string()];
    let (search_p, binder) = Binder::new().bind_opt(
        search
            .filter(|s| !s.is_empty())
            .map(|s| SqlParam::text(s.to_lowercase())),
    );
    if let Some(p) = search_p {
        predicates.push(title_search_predicate(p));
    }
    let (offset, binder) =
        binder.bind_opt(pagination.effective_offset().map(SqlParam::from));
    let page = match offset {
        Some(p) => format!("LIMIT {MAX_POST_LIMIT} OFFSET {p}"),
        None => format!("LIMIT {MAX_POST_LIMIT}"),
    };

    let text = lines([
        "SELECT posts.*, json_agg(DISTINCT images.*) AS images,",
        "COUNT(*) OVER() AS \"postCount\"",
        "FROM posts",
        "JOIN images ON posts.\"postID\" = images.\"postID\"",
        format!("WHERE {}", predicates.join(" AND ")).as_str(),
        "GROUP BY posts.\"postID\"",
        "ORDER BY posts.\"uploadDate\" DESC",
        page.as_str(),
    ]);
    Statement::new(text, binder.into_params())
}

/// Lists uploads awaiting moderation, newest first.
pub fn unverified_posts(pagination: Pagination) -> Statement {
    let (offset, binder) = Binder::new().bind_opt(pagination.effective_offset().map(SqlParam::from));
    let page = match offset {
        Some(p) => format!("LIMIT {MAX_POST_LIMIT} OFFSET {p}"),
        None => format!("LIMIT {MAX_POST_LIMIT}"),
    };

    let text = lines([
        "SELECT \"unverified posts\".*, json_agg(DISTINCT \"unverified images\".*) AS images,",
        "json_agg(DISTINCT \"unverified tag map\".tag) AS tags,",
        "COUNT(*) OVER() AS \"postCount\"",
        "FROM \"unverified posts\"",
        "JOIN \"unverified images\" ON \"unverified posts\".\"postID\" = \"unverified images\".\"postID\"",
        "JOIN \"unverified tag map\" ON \"unverified posts\".\"postID\" = \"unverified tag map\".\"postID\"",
        "WHERE \"unverified posts\".\"originalID\" IS NULL AND \"unverified posts\".\"deleted\" IS NOT TRUE",
        "GROUP BY \"unverified posts\".\"postID\"",
        "ORDER BY \"unverified posts\".\"uploadDate\" DESC",
        page.as_str(),
    ]);
    Statement::new(text, binder.into_params())
}
