//! ORDER BY rendering.
//!
//! Sort keys reach statement text only through the mappings in this module.

use crate::types::{
    GroupSort, GroupSortField, PostSort, PostSortField, TagCategorySort, TagCategorySortField,
    TagSort, TagSortField,
};

/// Where a post sort is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortScope {
    /// Inside the aggregation CTE, against base tables and aggregate aliases.
    Inner,
    /// On the outer select, against `post_json` columns.
    Outer,
}

fn direction(reverse: bool) -> &'static str {
    if reverse { "ASC" } else { "DESC" }
}

/// Column a post sort orders by, or `None` for random order.
fn post_sort_column(field: PostSortField, scope: SortScope) -> Option<&'static str> {
    use PostSortField as F;

    let column = match (scope, field) {
        (_, F::Random) => return None,
        (SortScope::Inner, F::Date) => "posts.\"uploadDate\"",
        (SortScope::Inner, F::ViewDate) => "\"history\".\"viewDate\"",
        (SortScope::Inner, F::Posted) => "posts.posted",
        (SortScope::Inner, F::Cuteness) => "\"cuteness\"",
        (SortScope::Inner, F::Popularity) => "\"favoriteCount\"",
        (SortScope::Inner, F::Variations) => "\"variationCount\"",
        (SortScope::Inner, F::Parent) => "\"hasChildren\"",
        (SortScope::Inner, F::Child) => "posts.\"parentID\"",
        (SortScope::Inner, F::Groups) => "\"isGrouped\"",
        (SortScope::Inner, F::TagCount) => "\"tagCount\"",
        (SortScope::Inner, F::FileSize) => "\"fileSize\"",
        (SortScope::Inner, F::AspectRatio) => "\"aspectRatio\"",
        (SortScope::Inner, F::Bookmarks) => "posts.bookmarks",
        (SortScope::Inner, F::Favorites) => "favorites.\"favoriteDate\"",
        (SortScope::Inner, F::Hidden) => "posts.hidden",
        (SortScope::Inner, F::Locked) => "posts.locked",
        (SortScope::Inner, F::Private) => "posts.private",
        (SortScope::Outer, F::Date) => "post_json.\"uploadDate\"",
        (SortScope::Outer, F::ViewDate) => "post_json.\"viewDate\"",
        (SortScope::Outer, F::Posted) => "post_json.posted",
        (SortScope::Outer, F::Cuteness) => "post_json.\"cuteness\"",
        (SortScope::Outer, F::Popularity) => "post_json.\"favoriteCount\"",
        (SortScope::Outer, F::Variations) => "post_json.\"variationCount\"",
        (SortScope::Outer, F::Parent) => "post_json.\"hasChildren\"",
        (SortScope::Outer, F::Child) => "post_json.\"parentID\"",
        (SortScope::Outer, F::Groups) => "post_json.\"isGrouped\"",
        (SortScope::Outer, F::TagCount) => "post_json.\"tagCount\"",
        (SortScope::Outer, F::FileSize) => "post_json.\"fileSize\"",
        (SortScope::Outer, F::AspectRatio) => "post_json.\"aspectRatio\"",
        (SortScope::Outer, F::Bookmarks) => "post_json.bookmarks",
        (SortScope::Outer, F::Favorites) => "post_json.\"favoriteDate\"",
        (SortScope::Outer, F::Hidden) => "post_json.hidden",
        (SortScope::Outer, F::Locked) => "post_json.locked",
        (SortScope::Outer, F::Private) => "post_json.private",
    };
    Some(column)
}

/// Renders a post sort as an `ORDER BY` fragment.
pub fn post_order_by(sort: PostSort, scope: SortScope) -> String {
    use PostSortField as F;

    let Some(column) = post_sort_column(sort.field, scope) else {
        return "ORDER BY random()".to_string();
    };
    let nulls_last = matches!(
        sort.field,
        F::Posted | F::Child | F::Bookmarks | F::Hidden | F::Locked | F::Private
    );

    let mut out = format!("ORDER BY {} {}", column, direction(sort.reverse));
    if nulls_last {
        out.push_str(" NULLS LAST");
    }
    out
}

/// Renders a tag search sort.
pub fn tag_order_by(sort: TagSort) -> String {
    let dir = direction(sort.reverse);
    match sort.field {
        TagSortField::Random => "ORDER BY random()".to_string(),
        TagSortField::Date => format!("ORDER BY tags.\"updatedDate\" {dir}"),
        // alphabetic and length read naturally ascending
        TagSortField::Alphabetic => format!("ORDER BY tags.tag {}", direction(!sort.reverse)),
        TagSortField::Posts => format!("ORDER BY \"postCount\" {dir}"),
        TagSortField::Image => format!("ORDER BY \"variationCount\" {dir}"),
        TagSortField::Aliases => format!("ORDER BY \"aliasCount\" {dir}"),
        TagSortField::Length => format!("ORDER BY LENGTH(tags.tag) {}", direction(!sort.reverse)),
    }
}

/// Renders a tag category sort.
pub fn tag_category_order_by(sort: TagCategorySort) -> String {
    let dir = direction(sort.reverse);
    match sort.field {
        TagCategorySortField::Random => "ORDER BY random()".to_string(),
        TagCategorySortField::Cuteness => format!("ORDER BY \"cuteness\" {dir}"),
        TagCategorySortField::Posts => format!("ORDER BY \"postCount\" {dir}"),
        TagCategorySortField::Alphabetic => {
            format!("ORDER BY tags.tag {}", direction(!sort.reverse))
        }
    }
}

/// Renders a group search sort.
pub fn group_order_by(sort: GroupSort) -> String {
    let dir = direction(sort.reverse);
    match sort.field {
        GroupSortField::Random => "ORDER BY random()".to_string(),
        GroupSortField::Date => format!("ORDER BY groups.\"createDate\" {dir}"),
        GroupSortField::Posts => format!("ORDER BY \"postCount\" {dir}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sort;

    #[test]
    fn test_default_sort() {
        assert_eq!(
            post_order_by(PostSort::default(), SortScope::Inner),
            "ORDER BY posts.\"uploadDate\" DESC"
        );
    }

    #[test]
    fn test_reverse_is_ascending() {
        assert_eq!(
            post_order_by(Sort::reversed(PostSortField::Popularity), SortScope::Inner),
            "ORDER BY \"favoriteCount\" ASC"
        );
    }

    #[test]
    fn test_nulls_last_columns() {
        assert_eq!(
            post_order_by(Sort::new(PostSortField::Posted), SortScope::Inner),
            "ORDER BY posts.posted DESC NULLS LAST"
        );
        assert_eq!(
            post_order_by(Sort::reversed(PostSortField::Child), SortScope::Inner),
            "ORDER BY posts.\"parentID\" ASC NULLS LAST"
        );
        assert_eq!(
            post_order_by(Sort::new(PostSortField::Private), SortScope::Outer),
            "ORDER BY post_json.private DESC NULLS LAST"
        );
    }

    #[test]
    fn test_outer_scope_uses_post_json() {
        assert_eq!(
            post_order_by(Sort::new(PostSortField::Favorites), SortScope::Outer),
            "ORDER BY post_json.\"favoriteDate\" DESC"
        );
        assert_eq!(
            post_order_by(Sort::reversed(PostSortField::ViewDate), SortScope::Inner),
            "ORDER BY \"history\".\"viewDate\" ASC"
        );
    }

    #[test]
    fn test_random() {
        assert_eq!(
            post_order_by(Sort::new(PostSortField::Random), SortScope::Outer),
            "ORDER BY random()"
        );
        assert_eq!(
            group_order_by(Sort::new(GroupSortField::Random)),
            "ORDER BY random()"
        );
    }

    #[test]
    fn test_tag_sorts() {
        assert_eq!(
            tag_order_by(Sort::new(TagSortField::Alphabetic)),
            "ORDER BY tags.tag ASC"
        );
        assert_eq!(
            tag_order_by(Sort::reversed(TagSortField::Length)),
            "ORDER BY LENGTH(tags.tag) DESC"
        );
        assert_eq!(
            tag_order_by(Sort::new(TagSortField::Date)),
            "ORDER BY tags.\"updatedDate\" DESC"
        );
        assert_eq!(
            tag_category_order_by(Sort::reversed(TagCategorySortField::Alphabetic)),
            "ORDER BY tags.tag DESC"
        );
    }

    #[test]
    fn test_group_sorts() {
        assert_eq!(
            group_order_by(Sort::new(GroupSortField::Date)),
            "ORDER BY groups.\"createDate\" DESC"
        );
        assert_eq!(
            group_order_by(Sort::reversed(GroupSortField::Posts)),
            "ORDER BY \"postCount\" ASC"
        );
    }
}
