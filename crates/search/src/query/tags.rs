//! Tag, tag category and tag social search compilers.

use crate::types::{
    MAX_TAG_CATEGORY_LIMIT, MAX_TAG_LIMIT, Style, TagCategorySearch, TagSearch, TagTypeFilter,
};

use super::binder::{Binder, SqlParam};
use super::sort::{tag_category_order_by, tag_order_by};
use super::statement::{Statement, bind_window, lines, where_clause};

/// Default tag category page.
pub const DEFAULT_TAG_CATEGORY_PAGE: u32 = 25;

/// Default tag search page.
pub const DEFAULT_TAG_PAGE: u32 = 100;

/// Tag types grouped under [`TagTypeFilter::Tags`].
const GENERAL_TAG_TYPES: [&str; 6] = ["appearance", "outfit", "accessory", "scenery", "action", "tag"];

/// Compiles a tag category browse.
///
/// Sample posts come from a 5% table sample, excluding sketches and
/// lineart, so the category pages stay cheap.
pub fn compile_tag_category(search: &TagCategorySearch) -> Statement {
    let mut join_filters = vec![search.category.predicate()];
    let (prefix, binder) = Binder::new().bind_opt(
        search
            .search
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| SqlParam::text(s.to_lowercase())),
    );
    if let Some(p) = prefix {
        join_filters.push(format!("lower(tags.tag) LIKE {p} || '%'"));
    }
    let (window, binder) = bind_window(
        binder,
        &search.pagination,
        MAX_TAG_CATEGORY_LIMIT,
        DEFAULT_TAG_CATEGORY_PAGE,
    );
    let order_by = search.sort.map(tag_category_order_by).unwrap_or_default();
    let sample_filter = Style::All
        .predicate()
        .map(|p| format!("WHERE {p}"))
        .unwrap_or_default();

    let text = lines([
        "WITH post_json AS (",
        "SELECT posts.*, json_agg(DISTINCT images.*) AS images,",
        "ROUND(AVG(DISTINCT cuteness.\"cuteness\")) AS \"cuteness\"",
        "FROM posts",
        "TABLESAMPLE SYSTEM(5)",
        "JOIN images ON images.\"postID\" = posts.\"postID\"",
        "LEFT JOIN \"cuteness\" ON posts.\"postID\" = \"cuteness\".\"postID\"",
        sample_filter.as_str(),
        "GROUP BY posts.\"postID\"",
        ")",
        "SELECT tags.*, json_agg(DISTINCT post_json.*) AS posts,",
        "COUNT(*) OVER() AS \"tagCount\",",
        "array_length(\"tag map posts\".\"posts\", 1) AS \"postCount\",",
        "ROUND(AVG(DISTINCT post_json.\"cuteness\")) AS \"cuteness\"",
        "FROM tags",
        format!(
            "JOIN \"tag map\" ON \"tag map\".\"tag\" = tags.\"tag\" AND {}",
            join_filters.join(" AND ")
        )
        .as_str(),
        "JOIN post_json ON post_json.\"postID\" = \"tag map\".\"postID\"",
        "JOIN \"tag map posts\" ON \"tag map posts\".\"tag\" = tags.\"tag\"",
        "GROUP BY \"tags\".\"tagID\", \"tag map posts\".\"posts\"",
        order_by.as_str(),
        window.as_str(),
    ]);
    Statement::new(text, binder.into_params())
}

/// Compiles a tag search by name or alias substring.
pub fn compile_tag_search(search: &TagSearch) -> Statement {
    let mut predicates = Vec::new();
    let (term, binder) = Binder::new().bind_opt(
        search
            .search
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| SqlParam::text(s.to_lowercase())),
    );
    if let Some(p) = term {
        predicates.push(format!(
            "(lower(tags.tag) LIKE '%' || {p} || '%' OR EXISTS (SELECT 1 FROM aliases \
             WHERE aliases.tag = \"tags\".tag AND lower(aliases.alias) LIKE '%' || {p} || '%'))"
        ));
    }
    let binder = match &search.tag_type {
        TagTypeFilter::All => binder,
        TagTypeFilter::Tags => {
            let types = GENERAL_TAG_TYPES
                .iter()
                .map(|t| format!("tags.type = '{t}'"))
                .collect::<Vec<_>>()
                .join(" OR ");
            predicates.push(format!("({types})"));
            binder
        }
        TagTypeFilter::Exact(tag_type) => {
            let (p, binder) = binder.bind(SqlParam::text(tag_type.clone()));
            predicates.push(format!("tags.type = {p}"));
            binder
        }
    };
    let (window, binder) = bind_window(binder, &search.pagination, MAX_TAG_LIMIT, DEFAULT_TAG_PAGE);
    let order_by = search.sort.map(tag_order_by).unwrap_or_default();

    let text = lines([
        "SELECT tags.*, json_agg(DISTINCT aliases.*) AS aliases, json_agg(DISTINCT implications.*) AS implications,",
        "COUNT(*) OVER() AS \"tagCount\",",
        "array_length(\"tag map posts\".\"posts\", 1) AS \"postCount\",",
        "COUNT(DISTINCT tags.\"image\") AS \"variationCount\",",
        "COUNT(DISTINCT aliases.\"alias\") AS \"aliasCount\"",
        "FROM tags",
        "LEFT JOIN aliases ON aliases.\"tag\" = tags.\"tag\"",
        "LEFT JOIN implications ON implications.\"tag\" = tags.\"tag\"",
        "JOIN \"tag map posts\" ON \"tag map posts\".\"tag\" = tags.\"tag\"",
        where_clause(&predicates).as_str(),
        "GROUP BY \"tags\".\"tagID\", \"tag map posts\".\"posts\"",
        order_by.as_str(),
        window.as_str(),
    ]);
    Statement::new(text, binder.into_params())
}

/// Compiles a search for tags whose social links contain a substring.
pub fn compile_tag_social_search(social: &str) -> Statement {
    let (p, binder) = Binder::new().bind(SqlParam::text(social));
    let links = ["social", "twitter", "website", "fandom", "wikipedia"]
        .iter()
        .map(|column| format!("tags.{column} LIKE '%' || {p} || '%'"))
        .collect::<Vec<_>>()
        .join(" OR ");

    let text = lines([
        "SELECT tags.*, json_agg(DISTINCT aliases.*) AS aliases, json_agg(DISTINCT implications.*) AS implications,",
        "COUNT(*) OVER() AS \"tagCount\",",
        "COUNT(DISTINCT posts.\"postID\") AS \"postCount\",",
        "COUNT(DISTINCT tags.\"image\") AS \"variationCount\",",
        "COUNT(DISTINCT aliases.\"alias\") AS \"aliasCount\"",
        "FROM tags",
        "LEFT JOIN aliases ON aliases.\"tag\" = tags.\"tag\"",
        "LEFT JOIN implications ON implications.\"tag\" = tags.\"tag\"",
        format!("JOIN \"tag map\" ON \"tag map\".\"tag\" = tags.\"tag\" AND ({links})").as_str(),
        "JOIN posts ON posts.\"postID\" = \"tag map\".\"postID\"",
        "GROUP BY \"tags\".\"tagID\"",
    ]);
    Statement::new(text, binder.into_params())
}
