//! Named search entry points.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::Executor;
use crate::error::{SearchError, SearchResult, StorageResult};
use crate::query::{
    compile_group_search, compile_post_search, compile_tag_category, compile_tag_search,
    compile_tag_social_search, deleted_posts, posts_by_id, unverified_posts,
};
use crate::types::rows::into_row;
use crate::types::{
    Condition, GroupSearch, Pagination, PostSearch, PostSearchRow, Row, TagCategorySearch,
    TagSearch, TagSortField,
};

/// Post search over all posts.
pub const POSTS_ENDPOINT: &str = "search/posts";
/// Post search by pixiv artwork id.
pub const PIXIV_ID_ENDPOINT: &str = "search/pixiv-id";
/// Post search by x.com / twitter.com status id.
pub const TWITTER_ID_ENDPOINT: &str = "search/twitter-id";
/// Post search by source substring.
pub const SOURCE_ENDPOINT: &str = "search/source";
/// Post search by image format.
pub const FORMAT_ENDPOINT: &str = "search/format";
/// Full posts by id.
pub const POSTS_BY_ID_ENDPOINT: &str = "search/posts/ids";
/// Deleted posts.
pub const DELETED_POSTS_ENDPOINT: &str = "search/posts/deleted";
/// Tag search.
pub const TAGS_ENDPOINT: &str = "search/tags";
/// Tag social link search.
pub const TAG_SOCIAL_ENDPOINT: &str = "search/tags/social";

/// Builds the cache key of a request: the endpoint followed by the
/// request's JSON form.
pub fn cache_key<T: Serialize + ?Sized>(endpoint: &str, params: &T) -> StorageResult<String> {
    Ok(format!("{}:{}", endpoint, serde_json::to_string(params)?))
}

/// Reads the total from a count statement's rows.
///
/// The count statement returns at most one row, so an empty result means
/// zero matches.
pub fn parse_count(rows: &[Value]) -> SearchResult<String> {
    let Some(row) = rows.first() else {
        return Ok("0".to_string());
    };
    let value = match row {
        Value::Array(columns) => columns.first(),
        Value::Object(columns) => columns.get("postCount"),
        _ => None,
    };
    match value {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(SearchError::MalformedRow {
            statement: "count",
            message: format!("expected a single count column, got {}", row),
        }),
    }
}

/// Dispatches searches to an executor.
///
/// Every post entry point runs a page statement and a count statement and
/// stamps the total onto each returned row as `postCount`.
#[derive(Debug, Clone)]
pub struct SearchService<E> {
    executor: E,
}

impl<E: Executor> SearchService<E> {
    /// Creates a service over an executor.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// The underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Faceted post search.
    pub async fn search(&self, search: &PostSearch) -> StorageResult<Vec<PostSearchRow>> {
        self.post_search(POSTS_ENDPOINT, search).await
    }

    /// Post search restricted to a pixiv artwork id.
    pub async fn search_pixiv_id(
        &self,
        pixiv_id: &str,
        search: &PostSearch,
    ) -> StorageResult<Vec<PostSearchRow>> {
        let search = search
            .clone()
            .with_condition(Condition::PixivId(pixiv_id.to_string()));
        self.post_search(PIXIV_ID_ENDPOINT, &search).await
    }

    /// Post search restricted to an x.com / twitter.com status id.
    pub async fn search_twitter_id(
        &self,
        twitter_id: &str,
        search: &PostSearch,
    ) -> StorageResult<Vec<PostSearchRow>> {
        let search = search
            .clone()
            .with_condition(Condition::TwitterId(twitter_id.to_string()));
        self.post_search(TWITTER_ID_ENDPOINT, &search).await
    }

    /// Post search restricted to posts whose source or mirrors contain a substring.
    pub async fn search_source(
        &self,
        source: &str,
        search: &PostSearch,
    ) -> StorageResult<Vec<PostSearchRow>> {
        let search = search
            .clone()
            .with_condition(Condition::Source(source.to_string()));
        self.post_search(SOURCE_ENDPOINT, &search).await
    }

    /// Post search restricted to images with a filename suffix.
    pub async fn search_format(
        &self,
        format: &str,
        search: &PostSearch,
    ) -> StorageResult<Vec<PostSearchRow>> {
        let search = search.clone().with_format(format);
        self.post_search(FORMAT_ENDPOINT, &search).await
    }

    #[instrument(skip(self, search), fields(sort = %search.sort))]
    async fn post_search(
        &self,
        endpoint: &'static str,
        search: &PostSearch,
    ) -> StorageResult<Vec<PostSearchRow>> {
        let statements = compile_post_search(search);
        let key = if search.sort.is_cacheable() {
            Some(cache_key(endpoint, search)?)
        } else {
            None
        };
        let count_key = key.as_ref().map(|k| format!("{k}/count"));

        let page = self.executor.run(&statements.page, key.as_deref()).await?;
        let count_rows = self
            .executor
            .run(&statements.count, count_key.as_deref())
            .await?;
        let post_count = parse_count(&count_rows)?;

        debug!(rows = page.len(), post_count = %post_count, cached = key.is_some(), "post search done");

        page.into_iter()
            .map(|value| -> StorageResult<PostSearchRow> {
                let mut row = PostSearchRow::from_value(value)?;
                row.post_count = post_count.clone();
                Ok(row)
            })
            .collect()
    }

    /// Fetches full posts by id. An empty list returns no rows without
    /// touching the executor.
    pub async fn posts_by_id(&self, ids: &[i64]) -> StorageResult<Vec<Row>> {
        let Some(statement) = posts_by_id(ids) else {
            return Ok(Vec::new());
        };
        let key = cache_key(POSTS_BY_ID_ENDPOINT, ids)?;
        self.rows(&statement, Some(&key)).await
    }

    /// Lists deleted posts, 100 per page.
    pub async fn deleted_posts(
        &self,
        search: Option<&str>,
        pagination: Pagination,
    ) -> StorageResult<Vec<Row>> {
        let statement = deleted_posts(search, pagination);
        let key = cache_key(DELETED_POSTS_ENDPOINT, &(search, pagination))?;
        self.rows(&statement, Some(&key)).await
    }

    /// Lists uploads awaiting moderation, 100 per page. Never cached.
    pub async fn unverified_posts(&self, pagination: Pagination) -> StorageResult<Vec<Row>> {
        self.rows(&unverified_posts(pagination), None).await
    }

    /// Browses one tag category. Never cached.
    pub async fn tag_category(&self, search: &TagCategorySearch) -> StorageResult<Vec<Row>> {
        self.rows(&compile_tag_category(search), None).await
    }

    /// Searches tags by name or alias.
    pub async fn tag_search(&self, search: &TagSearch) -> StorageResult<Vec<Row>> {
        let statement = compile_tag_search(search);
        let random = search
            .sort
            .is_some_and(|s| s.field == TagSortField::Random);
        let key = if random {
            None
        } else {
            Some(cache_key(TAGS_ENDPOINT, search)?)
        };
        self.rows(&statement, key.as_deref()).await
    }

    /// Searches tags whose social links contain a substring.
    pub async fn tag_social_search(&self, social: &str) -> StorageResult<Vec<Row>> {
        let key = cache_key(TAG_SOCIAL_ENDPOINT, social)?;
        self.rows(&compile_tag_social_search(social), Some(&key)).await
    }

    /// Searches groups by name. Never cached.
    pub async fn group_search(&self, search: &GroupSearch) -> StorageResult<Vec<Row>> {
        self.rows(&compile_group_search(search), None).await
    }

    async fn rows(
        &self,
        statement: &crate::query::Statement,
        key: Option<&str>,
    ) -> StorageResult<Vec<Row>> {
        let rows = self.executor.run(statement, key).await?;
        let rows = rows.into_iter().map(into_row).collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
