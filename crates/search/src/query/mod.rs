//! Statement compilation.
//!
//! Everything in this module is synchronous and side-effect free: a request
//! goes in, [`Statement`] values come out.
//!
//! # Pipeline
//!
//! ```text
//! PostSearch ─► classifier ─► clause (Binder) ─► sort ─► assembler ─► PostStatements
//! ```
//!
//! The tag, tag category and group compilers follow the same conventions
//! but produce a single statement each.

pub mod assembler;
pub mod binder;
pub mod classifier;
pub mod clause;
pub mod groups;
pub mod posts;
pub mod sort;
pub mod statement;
pub mod tags;

pub use assembler::{PostStatements, compile_post_search};
pub use binder::{Binder, Placeholder, SqlParam};
pub use classifier::{ClassifiedTags, TagClass, classify};
pub use groups::compile_group_search;
pub use posts::{deleted_posts, posts_by_id, unverified_posts};
pub use statement::{RowMode, Statement};
pub use tags::{compile_tag_category, compile_tag_search, compile_tag_social_search};
