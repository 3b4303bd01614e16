//! Multi-call workflows over the controllers

pub mod posts;

pub use posts::{Cleanup, PostService, PostWithComments, UpdatedPost, UserPosts, ValidatedUserPosts};
