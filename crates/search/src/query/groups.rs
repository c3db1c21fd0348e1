//! Group search compiler.

use crate::types::{GroupSearch, MAX_GROUP_LIMIT};

use super::binder::{Binder, SqlParam};
use super::sort::group_order_by;
use super::statement::{Statement, bind_window, lines, where_clause};

/// Default group search page.
pub const DEFAULT_GROUP_PAGE: u32 = 100;

/// Compiles a group search. Posts are aggregated in group order.
pub fn compile_group_search(search: &GroupSearch) -> Statement {
    let signed_in = search.username.as_deref().is_some_and(|u| !u.is_empty());
    let mut predicates: Vec<String> = search.rating.predicate("groups", signed_in).into_iter().collect();

    let (term, binder) = Binder::new().bind_opt(
        search
            .search
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| SqlParam::text(s.to_lowercase())),
    );
    if let Some(p) = term {
        predicates.push(format!("lower(groups.\"name\") LIKE '%' || {p} || '%'"));
    }
    let (window, binder) =
        bind_window(binder, &search.pagination, MAX_GROUP_LIMIT, DEFAULT_GROUP_PAGE);
    let order_by = search.sort.map(group_order_by).unwrap_or_default();

    let text = lines([
        "WITH post_json AS (",
        "SELECT posts.*, \"group map\".\"order\", json_agg(DISTINCT images.*) AS images",
        "FROM posts",
        "JOIN images ON images.\"postID\" = posts.\"postID\"",
        "JOIN \"group map\" ON \"group map\".\"postID\" = posts.\"postID\"",
        "GROUP BY posts.\"postID\", \"group map\".\"order\"",
        ")",
        "SELECT groups.*, json_agg(post_json.* ORDER BY post_json.\"order\" ASC) AS posts,",
        "COUNT(*) OVER() AS \"groupCount\",",
        "COUNT(DISTINCT post_json.\"postID\") AS \"postCount\"",
        "FROM \"group map\"",
        "JOIN groups ON groups.\"groupID\" = \"group map\".\"groupID\"",
        "JOIN post_json ON post_json.\"postID\" = \"group map\".\"postID\"",
        where_clause(&predicates).as_str(),
        "GROUP BY groups.\"groupID\"",
        order_by.as_str(),
        window.as_str(),
    ]);
    Statement::new(text, binder.into_params())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GroupSortField, Pagination, Rating, Sort};

    #[test]
    fn test_anonymous_group_search_is_cute_only() {
        let stmt = compile_group_search(&GroupSearch::new("Summer"));
        assert!(stmt.text.contains(
            "WHERE groups.rating = 'cute' AND lower(groups.\"name\") LIKE '%' || $1 || '%'"
        ));
        assert_eq!(stmt.values, vec![SqlParam::text("summer")]);
        assert!(stmt.text.ends_with("LIMIT 100"));
    }

    #[test]
    fn test_signed_in_all_rating() {
        let stmt = compile_group_search(&GroupSearch::new("x").with_username("alice"));
        assert!(stmt.text.contains(
            "(groups.rating = 'cute' OR groups.rating = 'sexy' OR groups.rating = 'ecchi')"
        ));
        // the user only widens the rating; it is not bound
        assert_eq!(stmt.values.len(), 1);
    }

    #[test]
    fn test_group_search_unfiltered() {
        let search = GroupSearch::default()
            .with_rating(Rating::AllH)
            .with_sort(Sort::reversed(GroupSortField::Date))
            .with_pagination(Pagination::new(250).with_offset(100));
        let stmt = compile_group_search(&search);
        assert!(!stmt.text.contains("WHERE"));
        assert!(stmt.text.ends_with("ORDER BY groups.\"createDate\" ASC\nLIMIT $1 OFFSET $2"));
        assert_eq!(stmt.values, vec![SqlParam::Integer(100), SqlParam::Integer(100)]);
    }
}
