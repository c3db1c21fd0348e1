//! Integration tests for statement compilation.
//!
//! These exercise the public compiler entry points end to end and check
//! properties that must hold for every post search: placeholders are
//! contiguous, the count and page statements filter identically, and
//! compilation is deterministic.

use std::collections::BTreeSet;

use regex::Regex;

use moepictures_search::query::{
    RowMode, SqlParam, Statement, compile_group_search, compile_post_search,
    compile_tag_category, compile_tag_search,
};
use moepictures_search::types::{
    Condition, GroupSearch, GroupSort, Pagination, PostSearch, PostSort, PostSortField,
    PostType, Rating, Sort, Style, TagCategory, TagCategorySearch, TagSearch, TagSort,
};

fn placeholders(text: &str) -> BTreeSet<usize> {
    let re = Regex::new(r"\$(\d+)").unwrap();
    re.captures_iter(text)
        .map(|c| c[1].parse().unwrap())
        .collect()
}

fn assert_contiguous(statement: &Statement) {
    let expected: BTreeSet<usize> = (1..=statement.values.len()).collect();
    assert_eq!(
        placeholders(&statement.text),
        expected,
        "placeholders in:\n{}",
        statement.text
    );
}

fn where_line(text: &str) -> Option<&str> {
    text.lines().find(|l| l.starts_with("WHERE ") && l.contains("posts."))
}

fn sample_searches() -> Vec<PostSearch> {
    vec![
        PostSearch::default(),
        PostSearch::new(["kawaii", "+dog", "+cat", "-scary", "+-gore", "*^chib"]),
        PostSearch::new(["landscape"])
            .with_type(PostType::Image)
            .with_rating(Rating::AllH)
            .with_style(Style::AllS)
            .with_children(true),
        PostSearch::new(["a"])
            .with_search("night sky")
            .with_format("png")
            .with_username("alice")
            .with_limit(20)
            .with_offset(40),
        PostSearch::default()
            .with_sort(Sort::new(PostSortField::Favorites))
            .with_username("alice")
            .with_limit(10),
        PostSearch::default()
            .with_sort(Sort::reversed(PostSortField::ViewDate))
            .with_username("bob")
            .with_format("gif")
            .with_interm_limit(false),
        PostSearch::default()
            .with_condition(Condition::PixivId("12345".to_string()))
            .with_sort(Sort::new(PostSortField::Random)),
        PostSearch::default()
            .with_condition(Condition::Source("example.com".to_string()))
            .with_sort(Sort::new(PostSortField::TagCount))
            .with_offset(100),
    ]
}

// ============================================================================
// Post Search Invariants
// ============================================================================

#[test]
fn test_placeholders_are_contiguous() {
    for search in sample_searches() {
        let statements = compile_post_search(&search);
        assert_contiguous(&statements.page);
        assert_contiguous(&statements.count);
    }
}

#[test]
fn test_count_and_page_share_where() {
    for search in sample_searches() {
        let statements = compile_post_search(&search);
        assert_eq!(
            where_line(&statements.count.text),
            where_line(&statements.page.text)
        );
        if !statements.where_clause.is_empty() {
            assert_eq!(
                where_line(&statements.page.text),
                Some(statements.where_clause.as_str())
            );
        }
    }
}

#[test]
fn test_count_values_prefix_page_values() {
    for search in sample_searches() {
        let statements = compile_post_search(&search);
        assert!(statements.page.values.starts_with(&statements.count.values));
    }
}

#[test]
fn test_statement_modes() {
    let statements = compile_post_search(&PostSearch::default());
    assert_eq!(statements.count.row_mode, RowMode::Array);
    assert_eq!(statements.page.row_mode, RowMode::Object);
}

#[test]
fn test_compilation_is_idempotent() {
    for search in sample_searches() {
        assert_eq!(compile_post_search(&search), compile_post_search(&search));
    }
}

// ============================================================================
// Post Search Scenarios
// ============================================================================

#[test]
fn test_tag_groups_bind_in_order() {
    let search = PostSearch::new(["kawaii", "+dog", "+cat", "-scary", "+-gore", "*^chib"]);
    let statements = compile_post_search(&search);
    let where_sql = &statements.where_clause;

    assert!(where_sql.starts_with(
        "WHERE \"tag map tags\".tags @> $1 AND \"tag map tags\".tags && $2 \
         AND NOT \"tag map tags\".tags @> $3 AND NOT \"tag map tags\".tags && $4 \
         AND EXISTS (SELECT 1 FROM unnest(\"tag map tags\".tags) AS tag WHERE tag ~* $5)"
    ));
    assert_eq!(
        statements.count.values,
        vec![
            SqlParam::text_array(["kawaii"]),
            SqlParam::text_array(["dog", "cat"]),
            SqlParam::text_array(["scary"]),
            SqlParam::text_array(["gore"]),
            SqlParam::text("^chib"),
        ]
    );
    assert!(statements.include_tags);
}

#[test]
fn test_limit_is_clamped() {
    let statements = compile_post_search(&PostSearch::default().with_limit(500));
    assert_eq!(statements.page.values, vec![SqlParam::Integer(100)]);
    assert!(statements.page.text.contains("LIMIT $1"));
    assert!(statements.count.values.is_empty());
}

#[test]
fn test_default_limit_is_literal() {
    let statements = compile_post_search(&PostSearch::default());
    assert!(statements.page.text.contains("LIMIT 100"));
    assert!(statements.page.values.is_empty());
}

#[test]
fn test_unfiltered_search_has_no_where() {
    let search = PostSearch::default()
        .with_rating(Rating::AllH)
        .with_style(Style::AllS)
        .with_children(true);
    let statements = compile_post_search(&search);
    assert!(statements.where_clause.is_empty());
    assert!(!statements.count.text.contains("WHERE"));
    assert!(!statements.page.text.contains("WHERE"));
}

#[test]
fn test_default_search_filters_anonymous_rating_and_style() {
    let statements = compile_post_search(&PostSearch::default());
    assert_eq!(
        statements.where_clause,
        "WHERE posts.rating = 'cute' \
         AND NOT (posts.style = 'sketch' OR posts.style = 'lineart') \
         AND posts.\"parentID\" IS NULL"
    );
}

#[test]
fn test_signed_in_rating_excludes_hentai() {
    let statements = compile_post_search(&PostSearch::default().with_username("alice"));
    assert!(statements.where_clause.contains(
        "(posts.rating = 'cute' OR posts.rating = 'sexy' OR posts.rating = 'ecchi')"
    ));
}

#[test]
fn test_favorites_sort_binds_user_once() {
    let search = PostSearch::default()
        .with_sort(Sort::new(PostSortField::Favorites))
        .with_username("alice");
    let statements = compile_post_search(&search);
    assert_eq!(statements.page.values, vec![SqlParam::text("alice")]);
    assert_eq!(statements.count.values, vec![SqlParam::text("alice")]);
    assert!(statements.where_clause.ends_with("favorites.\"username\" = $1"));
}

#[test]
fn test_user_sort_without_user_falls_back_to_date() {
    let search = PostSearch::default().with_sort(Sort::new(PostSortField::ViewDate));
    let statements = compile_post_search(&search);
    assert_eq!(statements.sort, PostSort::default());
    assert!(!statements.page.text.contains("history"));
}

#[test]
fn test_unknown_sort_name_falls_back() {
    let sort = PostSort::parse_or_default("sideways");
    assert_eq!(sort, PostSort::default());
    let statements = compile_post_search(&PostSearch::default().with_sort(sort));
    assert!(statements.page.text.contains("ORDER BY posts.\"uploadDate\" DESC"));
}

#[test]
fn test_condition_predicates() {
    let twitter = compile_post_search(
        &PostSearch::default().with_condition(Condition::TwitterId("987".to_string())),
    );
    assert!(twitter.where_clause.contains("$1"));
    assert_eq!(twitter.count.values, vec![SqlParam::text("987")]);

    let pixiv = compile_post_search(
        &PostSearch::default().with_condition(Condition::PixivId("555".to_string())),
    );
    assert!(pixiv.where_clause.contains("$1"));
    assert_eq!(pixiv.count.values, vec![SqlParam::text("555")]);
}

#[test]
fn test_request_round_trips_from_json() {
    let search: PostSearch = serde_json::from_str(
        r#"{"tags":["a","-b"],"type":"video","rating":"all+h","sort":"reverse tagcount","limit":5}"#,
    )
    .unwrap();
    assert_eq!(search.post_type, PostType::Video);
    assert_eq!(search.rating, Rating::AllH);
    assert_eq!(search.sort, Sort::reversed(PostSortField::TagCount));
    assert_eq!(search.pagination, Pagination::new(5));
    assert!(search.interm_limit);

    let statements = compile_post_search(&search);
    assert_contiguous(&statements.page);
}

#[test]
fn test_request_with_unknown_sort_uses_upload_date() {
    let search: PostSearch = serde_json::from_str(r#"{"tags":["a"],"sort":"sideways"}"#).unwrap();
    assert_eq!(search.sort, PostSort::default());

    let statements = compile_post_search(&search);
    assert!(statements.page.text.contains("ORDER BY posts.\"uploadDate\" DESC"));
}

#[test]
fn test_non_post_sorts_stay_strict_in_json() {
    assert!(serde_json::from_str::<TagSearch>(r#"{"sort":"sideways"}"#).is_err());
    assert!(serde_json::from_str::<GroupSearch>(r#"{"sort":"sideways"}"#).is_err());
    assert!(
        serde_json::from_str::<TagCategorySearch>(r#"{"category":"artists","sort":"sideways"}"#)
            .is_err()
    );
}

// ============================================================================
// Tag, Tag Category and Group Compilers
// ============================================================================

#[test]
fn test_tag_search_placeholders() {
    let search = TagSearch::new("Neko")
        .with_sort("reverse posts".parse::<TagSort>().unwrap())
        .with_pagination(Pagination::new(50).with_offset(50));
    let statement = compile_tag_search(&search);
    assert_contiguous(&statement);
    assert_eq!(statement.values[0], SqlParam::text("neko"));
}

#[test]
fn test_tag_category_placeholders() {
    let search = TagCategorySearch::new(TagCategory::Series)
        .with_search("Touhou")
        .with_pagination(Pagination::new(10).with_offset(20));
    let statement = compile_tag_category(&search);
    assert_contiguous(&statement);
    assert!(statement.text.contains("tags.type = 'series'"));
}

#[test]
fn test_group_search_placeholders() {
    let search = GroupSearch::new("Favorites")
        .with_sort("date".parse::<GroupSort>().unwrap())
        .with_rating(Rating::All)
        .with_pagination(Pagination::new(30).with_offset(60));
    let statement = compile_group_search(&search);
    assert_contiguous(&statement);
    assert!(statement.text.contains("groups.rating = 'cute'"));
}
