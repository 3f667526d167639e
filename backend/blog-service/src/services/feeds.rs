/// Listing composer.
///
/// Four feed entry points share one shape: count the base set, resolve the
/// requested page against it, fetch the page slice, and package the result
/// with its title and feed-specific context. Composers are pure reads; the
/// only relational extra is the follow-state existence check on profiles.
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{follow_repo, group_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::metrics::FEED_REQUEST_TOTAL;
use crate::models::{Group, PostView};
use crate::pagination::{resolve_page, PageMeta};

/// Author context attached to the profile feed.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorContext {
    pub id: Uuid,
    pub username: String,
    /// Whether the current viewer follows this author; absent for anonymous
    /// viewers.
    pub following: Option<bool>,
}

/// A composed, paginated feed ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub title: String,
    pub posts: Vec<PostView>,
    pub page: PageMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorContext>,
}

#[derive(Clone)]
pub struct FeedService {
    pool: PgPool,
}

impl FeedService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Global feed: every post, newest first.
    pub async fn index(&self, requested_page: Option<i64>) -> Result<FeedPage> {
        FEED_REQUEST_TOTAL.with_label_values(&["index"]).inc();

        let total = post_repo::count_all(&self.pool).await?;
        let page = resolve_page(total, requested_page);
        let posts = post_repo::list_all(&self.pool, page.limit(), page.offset()).await?;

        Ok(FeedPage {
            title: index_title(),
            posts,
            page,
            group: None,
            author: None,
        })
    }

    /// Group feed: posts of the group resolved by slug.
    pub async fn group(&self, slug: &str, requested_page: Option<i64>) -> Result<FeedPage> {
        FEED_REQUEST_TOTAL.with_label_values(&["group"]).inc();

        let group = group_repo::find_group_by_slug(&self.pool, slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

        let total = post_repo::count_by_group(&self.pool, group.id).await?;
        let page = resolve_page(total, requested_page);
        let posts =
            post_repo::list_by_group(&self.pool, group.id, page.limit(), page.offset()).await?;

        Ok(FeedPage {
            title: group_title(&group.title),
            posts,
            page,
            group: Some(group),
            author: None,
        })
    }

    /// Author feed: posts of the author resolved by username, plus whether
    /// the viewer follows them.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        requested_page: Option<i64>,
    ) -> Result<FeedPage> {
        FEED_REQUEST_TOTAL.with_label_values(&["profile"]).inc();

        let author = user_repo::find_user_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", username)))?;

        let following = match viewer {
            Some(viewer_id) => {
                Some(follow_repo::follow_exists(&self.pool, viewer_id, author.id).await?)
            }
            None => None,
        };

        let total = post_repo::count_by_author(&self.pool, author.id).await?;
        let page = resolve_page(total, requested_page);
        let posts =
            post_repo::list_by_author(&self.pool, author.id, page.limit(), page.offset()).await?;

        Ok(FeedPage {
            title: profile_title(&author.username),
            posts,
            page,
            group: None,
            author: Some(AuthorContext {
                id: author.id,
                username: author.username,
                following,
            }),
        })
    }

    /// Followed-authors feed for an authenticated viewer.
    pub async fn following(&self, viewer: Uuid, requested_page: Option<i64>) -> Result<FeedPage> {
        FEED_REQUEST_TOTAL.with_label_values(&["follow"]).inc();

        let total = post_repo::count_followed(&self.pool, viewer).await?;
        let page = resolve_page(total, requested_page);
        let posts =
            post_repo::list_followed(&self.pool, viewer, page.limit(), page.offset()).await?;

        Ok(FeedPage {
            title: follow_title(),
            posts,
            page,
            group: None,
            author: None,
        })
    }
}

fn index_title() -> String {
    "Latest updates on the site".to_string()
}

fn group_title(group_title: &str) -> String {
    format!("Posts of the community {}", group_title)
}

fn profile_title(username: &str) -> String {
    format!("Profile of {}", username)
}

fn follow_title() -> String {
    "Posts of your favourite authors".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_name_their_subject() {
        assert_eq!(group_title("Rustaceans"), "Posts of the community Rustaceans");
        assert_eq!(profile_title("leo"), "Profile of leo");
        assert_eq!(index_title(), "Latest updates on the site");
    }
}
