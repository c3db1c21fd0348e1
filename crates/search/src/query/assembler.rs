//! Post search statement assembly.
//!
//! A post search compiles into two statements that filter identically:
//!
//! - the **count** statement groups matching post ids and returns the total
//!   as a single array-mode row;
//! - the **page** statement aggregates images, tags and the derived columns
//!   per post and returns one window of rows.
//!
//! Both are built from one [`BoundFilters`], so they share the same WHERE
//! text, and the count statement's values are a prefix of the page values.

use crate::types::{PostSearch, PostSort, PostSortField};

use super::binder::Placeholder;
use super::clause::{BoundFilters, UserJoin, bind_filters};
use super::sort::{SortScope, post_order_by};
use super::statement::{Statement, lines, where_clause};

const TAG_JOIN: &str = "JOIN \"tag map tags\" ON posts.\"postID\" = \"tag map tags\".\"postID\"";
const FAVORITES_JOIN: &str = "LEFT JOIN \"favorites\" ON posts.\"postID\" = \"favorites\".\"postID\"";
const HISTORY_JOIN: &str = "JOIN \"history\" ON posts.\"postID\" = \"history\".\"postID\"";

/// The compiled count/page pair of a post search.
#[derive(Debug, Clone, PartialEq)]
pub struct PostStatements {
    /// Array-mode statement returning the total match count.
    pub count: Statement,
    /// Object-mode statement returning one page of posts.
    pub page: Statement,
    /// The WHERE text shared by both statements (empty when unfiltered).
    pub where_clause: String,
    /// Whether the tag array table is joined.
    pub include_tags: bool,
    /// The effective sort order.
    pub sort: PostSort,
}

/// Compiles a post search into its count and page statements.
pub fn compile_post_search(search: &PostSearch) -> PostStatements {
    let bound = bind_filters(search);
    let where_sql = where_clause(&bound.predicates());

    let count = Statement::array(
        count_text(&bound, &where_sql),
        bound.binder.params()[..bound.count_len].to_vec(),
    );
    let page_text = page_text(&bound, &where_sql, search.interm_limit);

    tracing::debug!(
        predicates = bound.clauses.len(),
        params = bound.binder.len(),
        count_params = bound.count_len,
        sort = %bound.sort,
        interm_limit = search.interm_limit,
        "compiled post search"
    );

    PostStatements {
        page: Statement::new(page_text, bound.binder.into_params()),
        count,
        where_clause: where_sql,
        include_tags: bound.include_tags,
        sort: bound.sort,
    }
}

fn format_filter(table: &str, format: Option<Placeholder>) -> Option<String> {
    format.map(|p| format!("{table}.\"filename\" LIKE '%' || {p}"))
}

fn user_join_sql(join: Option<UserJoin>) -> &'static str {
    match join {
        Some(UserJoin::Favorites) => FAVORITES_JOIN,
        Some(UserJoin::History) => HISTORY_JOIN,
        None => "",
    }
}

fn group_by(bound: &BoundFilters, with_tags_column: bool) -> String {
    let mut columns = vec!["posts.\"postID\""];
    if with_tags_column && bound.include_tags {
        columns.push("\"tag map tags\".\"tags\"");
    }
    if let Some(join) = bound.user_join {
        columns.push(join.group_by());
    }
    format!("GROUP BY {}", columns.join(", "))
}

fn count_text(bound: &BoundFilters, where_sql: &str) -> String {
    let images_join = match format_filter("images", bound.format) {
        Some(filter) => format!(
            "JOIN images ON posts.\"postID\" = images.\"postID\" AND {filter}"
        ),
        None => "JOIN images ON posts.\"postID\" = images.\"postID\"".to_string(),
    };

    lines([
        "WITH post_json AS (",
        "SELECT posts.\"postID\"",
        "FROM posts",
        images_join.as_str(),
        if bound.include_tags { TAG_JOIN } else { "" },
        user_join_sql(bound.user_join),
        where_sql,
        group_by(bound, false).as_str(),
        ")",
        "SELECT COUNT(*) OVER() AS \"postCount\"",
        "FROM post_json",
        "LIMIT 1",
    ])
}

fn pagination_sql(bound: &BoundFilters) -> String {
    let limit = match bound.limit {
        Some(p) => format!("LIMIT {p}"),
        None => "LIMIT 100".to_string(),
    };
    match bound.offset {
        Some(p) => format!("{limit} OFFSET {p}"),
        None => limit,
    }
}

fn projections(bound: &BoundFilters) -> String {
    let mut columns = vec!["SELECT posts.*, json_agg(DISTINCT image_json.*) AS images,".to_string()];
    if bound.include_tags {
        columns.push("\"tag map tags\".\"tags\",".to_string());
        columns.push("array_length(\"tag map tags\".\"tags\", 1) AS \"tagCount\",".to_string());
    }
    match bound.user_join {
        Some(UserJoin::Favorites) => columns.push("favorites.\"favoriteDate\",".to_string()),
        Some(UserJoin::History) => columns.push("\"history\".\"viewDate\",".to_string()),
        None => {}
    }
    columns.extend(
        [
            "MAX(DISTINCT COALESCE(image_json.\"size\", 0) + COALESCE(image_json.\"upscaledSize\", 0)) AS \"fileSize\",",
            "MAX(DISTINCT image_json.\"width\")::float / MAX(DISTINCT image_json.\"height\")::float AS \"aspectRatio\",",
            "COUNT(DISTINCT image_json.\"imageID\") AS \"variationCount\",",
            "COUNT(DISTINCT favorites.\"username\") AS \"favoriteCount\",",
            "ROUND(AVG(DISTINCT cuteness.\"cuteness\")) AS \"cuteness\",",
            "CASE WHEN COUNT(\"child posts\".\"childID\") > 0 THEN true ELSE false END AS \"hasChildren\",",
        ]
        .map(String::from),
    );
    match bound.user {
        Some(u) => {
            columns.push(
                "CASE WHEN COUNT(\"group map\".\"groupID\") > 0 THEN true ELSE false END AS \"isGrouped\","
                    .to_string(),
            );
            columns.push(format!(
                "CASE WHEN COUNT(favorites.\"username\") FILTER (WHERE favorites.\"username\" = {u}) > 0 \
                 THEN true ELSE false END AS favorited,"
            ));
            columns.push(format!(
                "CASE WHEN COUNT(\"favgroup map\".\"favgroupID\") FILTER (WHERE \"favgroup map\".\"favgroupID\" IN \
                 (SELECT \"favgroupID\" FROM \"favgroups\" WHERE \"favgroups\".\"username\" = {u})) > 0 \
                 THEN true ELSE false END AS favgrouped"
            ));
        }
        None => columns.push(
            "CASE WHEN COUNT(\"group map\".\"groupID\") > 0 THEN true ELSE false END AS \"isGrouped\""
                .to_string(),
        ),
    }
    columns.join("\n")
}

fn page_text(bound: &BoundFilters, where_sql: &str, interm_limit: bool) -> String {
    let image_filter = format_filter("images", bound.format)
        .map(|f| format!("WHERE {f}"))
        .unwrap_or_default();
    let is_random = bound.sort.field == PostSortField::Random;

    let (inner_tail, outer_tail) = if interm_limit {
        let inner = format!(
            "{}\n{}",
            post_order_by(bound.sort, SortScope::Inner),
            pagination_sql(bound)
        );
        let outer = if is_random {
            String::new()
        } else {
            post_order_by(bound.sort, SortScope::Outer)
        };
        (inner, outer)
    } else {
        let outer = format!(
            "{}\n{}",
            post_order_by(bound.sort, SortScope::Outer),
            pagination_sql(bound)
        );
        (String::new(), outer)
    };

    lines([
        "WITH image_json AS (",
        "SELECT *",
        "FROM images",
        image_filter.as_str(),
        "),",
        "post_json AS (",
        projections(bound).as_str(),
        "FROM posts",
        "JOIN image_json ON posts.\"postID\" = image_json.\"postID\"",
        if bound.include_tags { TAG_JOIN } else { "" },
        FAVORITES_JOIN,
        if bound.user_join == Some(UserJoin::History) {
            HISTORY_JOIN
        } else {
            ""
        },
        "LEFT JOIN \"cuteness\" ON posts.\"postID\" = \"cuteness\".\"postID\"",
        "LEFT JOIN \"child posts\" ON posts.\"postID\" = \"child posts\".\"parentID\"",
        "LEFT JOIN \"group map\" ON posts.\"postID\" = \"group map\".\"postID\"",
        if bound.user.is_some() {
            "LEFT JOIN \"favgroup map\" ON posts.\"postID\" = \"favgroup map\".\"postID\""
        } else {
            ""
        },
        where_sql,
        group_by(bound, true).as_str(),
        inner_tail.as_str(),
        ")",
        "SELECT post_json.*",
        "FROM post_json",
        outer_tail.as_str(),
    ])
}
