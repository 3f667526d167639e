pub mod comments;
pub mod feeds;
pub mod follows;
pub mod posts;
pub mod validation;

pub use comments::CommentService;
pub use feeds::FeedService;
pub use follows::FollowService;
pub use posts::PostService;
