//! Clause building for post searches.
//!
//! [`bind_filters`] walks a [`PostSearch`] in a fixed order, binding each
//! present value exactly once and collecting the WHERE predicates that
//! reference them. The result is shared by the count and page statements.

use crate::types::{PostSearch, PostSort, PostSortField, MAX_POST_LIMIT};

use super::binder::{Binder, Placeholder, SqlParam};
use super::classifier::{ClassifiedTags, classify};

/// A boolean predicate and the placeholder it references, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Predicate text.
    pub sql: String,
    /// The bound value the predicate reads.
    pub placeholder: Option<Placeholder>,
}

impl Clause {
    fn literal(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            placeholder: None,
        }
    }

    fn bound(sql: impl Into<String>, placeholder: Placeholder) -> Self {
        Self {
            sql: sql.into(),
            placeholder: Some(placeholder),
        }
    }
}

/// Array operator applied to the post's tag column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOperator {
    /// Post has every tag.
    Contains,
    /// Post has at least one tag.
    Overlaps,
    /// Post is missing at least one tag.
    NotContains,
    /// Post has none of the tags.
    NotOverlaps,
}

impl TagOperator {
    /// Renders the predicate against `"tag map tags".tags`.
    pub fn render(self, p: Placeholder) -> String {
        match self {
            TagOperator::Contains => format!("\"tag map tags\".tags @> {p}"),
            TagOperator::Overlaps => format!("\"tag map tags\".tags && {p}"),
            TagOperator::NotContains => format!("NOT \"tag map tags\".tags @> {p}"),
            TagOperator::NotOverlaps => format!("NOT \"tag map tags\".tags && {p}"),
        }
    }
}

/// Binds the classified tag groups, one clause per non-empty group and one
/// per pattern.
pub fn tag_clauses(binder: Binder, tags: &ClassifiedTags) -> (Vec<Clause>, Binder) {
    let groups = [
        (TagOperator::Contains, &tags.and),
        (TagOperator::Overlaps, &tags.or),
        (TagOperator::NotContains, &tags.not),
        (TagOperator::NotOverlaps, &tags.not_or),
    ];

    let mut clauses = Vec::new();
    let binder = groups
        .into_iter()
        .filter(|(_, group)| !group.is_empty())
        .fold(binder, |binder, (op, group)| {
            let (p, binder) = binder.bind(SqlParam::text_array(group.iter().cloned()));
            clauses.push(Clause::bound(op.render(p), p));
            binder
        });

    let binder = tags.patterns.iter().fold(binder, |binder, pattern| {
        let (p, binder) = binder.bind(SqlParam::text(pattern.clone()));
        clauses.push(Clause::bound(
            format!("EXISTS (SELECT 1 FROM unnest(\"tag map tags\".tags) AS tag WHERE tag ~* {p})"),
            p,
        ));
        binder
    });

    (clauses, binder)
}

/// Case-insensitive title substring predicate.
pub fn title_search_predicate(p: Placeholder) -> String {
    format!(
        "(posts.title ILIKE '%' || {p} || '%' OR posts.\"englishTitle\" ILIKE '%' || {p} || '%')"
    )
}

/// A join that restricts rows to the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserJoin {
    /// The user's favorites, for the favorites sort.
    Favorites,
    /// The user's view history, for the view date sort.
    History,
}

impl UserJoin {
    /// Predicate tying the joined table to the acting user.
    pub fn predicate(self, user: Placeholder) -> String {
        match self {
            UserJoin::Favorites => format!("favorites.\"username\" = {user}"),
            UserJoin::History => format!("\"history\".\"username\" = {user}"),
        }
    }

    /// Extra GROUP BY column the join requires.
    pub fn group_by(self) -> &'static str {
        match self {
            UserJoin::Favorites => "favorites.\"favoriteID\"",
            UserJoin::History => "\"history\".\"historyID\"",
        }
    }
}

/// Everything the assembler needs from a bound post search.
#[derive(Debug, Clone)]
pub struct BoundFilters {
    /// Tag predicates, in binding order.
    pub tag_clauses: Vec<Clause>,
    /// All WHERE predicates, in order.
    pub clauses: Vec<Clause>,
    /// Image filename suffix.
    pub format: Option<Placeholder>,
    /// Acting user.
    pub user: Option<Placeholder>,
    /// User-restricted join required by the sort.
    pub user_join: Option<UserJoin>,
    /// Number of leading values the count statement needs.
    pub count_len: usize,
    /// Page limit.
    pub limit: Option<Placeholder>,
    /// Page offset.
    pub offset: Option<Placeholder>,
    /// The effective sort after user-dependent fallbacks.
    pub sort: PostSort,
    /// Whether the tag array table is joined.
    pub include_tags: bool,
    /// All bound values.
    pub binder: Binder,
}

impl BoundFilters {
    /// The WHERE predicates as text.
    pub fn predicates(&self) -> Vec<&str> {
        self.clauses.iter().map(|c| c.sql.as_str()).collect()
    }
}

/// Resolves the sort order actually used for a search.
///
/// User-specific orders fall back to the default when nobody is signed in.
pub fn effective_sort(search: &PostSearch) -> PostSort {
    if search.sort.needs_user() && search.user().is_none() {
        tracing::debug!(sort = %search.sort, "user sort without a user, using upload date");
        return PostSort::default();
    }
    search.sort
}

/// Binds all filter values of a post search.
pub fn bind_filters(search: &PostSearch) -> BoundFilters {
    let sort = effective_sort(search);
    let binder = Binder::new();

    let tags = classify(&search.tags);
    let (tag_clauses, binder) = tag_clauses(binder, &tags);

    let (search_p, binder) = binder.bind_opt(
        search
            .search
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| SqlParam::text(s.clone())),
    );
    let (condition_p, binder) = binder.bind_opt(
        search
            .condition
            .as_ref()
            .map(|c| SqlParam::text(c.value())),
    );
    let (format, binder) = binder.bind_opt(
        search
            .format
            .as_ref()
            .filter(|f| !f.is_empty())
            .map(|f| SqlParam::text(f.clone())),
    );
    let filter_len = binder.len();

    let (user, binder) = binder.bind_opt(search.user().map(SqlParam::text));
    let user_join = user.and_then(|_| match sort.field {
        PostSortField::Favorites => Some(UserJoin::Favorites),
        PostSortField::ViewDate => Some(UserJoin::History),
        _ => None,
    });
    let count_len = if user_join.is_some() {
        binder.len()
    } else {
        filter_len
    };

    let (limit, binder) = binder.bind_opt(
        search
            .pagination
            .clamped_limit(MAX_POST_LIMIT)
            .map(SqlParam::from),
    );
    let (offset, binder) = binder.bind_opt(search.pagination.effective_offset().map(SqlParam::from));

    let mut clauses = tag_clauses.clone();
    clauses.extend(
        [
            search.post_type.predicate(),
            search.rating.predicate("posts", user.is_some()),
            search.style.predicate(),
            (!search.show_children).then(|| "posts.\"parentID\" IS NULL".to_string()),
        ]
        .into_iter()
        .flatten()
        .map(Clause::literal),
    );
    if let Some(p) = search_p {
        clauses.push(Clause::bound(title_search_predicate(p), p));
    }
    if let (Some(condition), Some(p)) = (&search.condition, condition_p) {
        clauses.push(Clause::bound(condition.predicate(p), p));
    }
    if let (Some(join), Some(p)) = (user_join, user) {
        clauses.push(Clause::bound(join.predicate(p), p));
    }

    let include_tags =
        search.with_tags || !tag_clauses.is_empty() || sort.field == PostSortField::TagCount;

    BoundFilters {
        tag_clauses,
        clauses,
        format,
        user,
        user_join,
        count_len,
        limit,
        offset,
        sort,
        include_tags,
        binder,
    }
}
