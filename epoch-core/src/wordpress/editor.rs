//! Authoring: create, edit and delete posts and upload media on behalf of a
//! signed-in author. Every call carries the author's token, so WordPress
//! decides which posts they may touch.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::error::FetchError;
use crate::http::FileUpload;

use super::{RawPost, WordPressClient};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Pending,
    Publish,
    Private,
    Future,
}

/// A new post. Saved as a draft unless `status` says otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub categories: Vec<u64>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    /// Media library ID of the featured image.
    #[serde(default)]
    pub featured_media: Option<u64>,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PostChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<u64>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        *self == PostChanges::default()
    }
}

/// A media library item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Media {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub source_url: String,
}

impl WordPressClient {
    fn editor_url(&self, path: &str) -> String {
        format!("{}/{}", self.config().wp_v2(), path)
    }

    pub async fn create_post(&self, token: &str, post: &NewPost) -> Result<RawPost, FetchError> {
        let mut body = json!({
            "title": post.title,
            "content": post.content,
            "categories": post.categories,
            "status": post.status.unwrap_or_default(),
        });
        if let Some(media) = post.featured_media {
            body["featured_media"] = json!(media);
        }

        let value = self
            .http()
            .post_json_authed(&self.editor_url("posts"), token, &body)
            .await?;
        let created: RawPost = parse(value)?;
        tracing::info!(id = created.id, status = %created.status, "created post");
        Ok(created)
    }

    pub async fn update_post(
        &self,
        token: &str,
        id: u64,
        changes: &PostChanges,
    ) -> Result<RawPost, FetchError> {
        let body =
            serde_json::to_value(changes).map_err(|e| FetchError::InvalidJson(e.to_string()))?;
        let value = self
            .http()
            .put_json_authed(&self.editor_url(&format!("posts/{}", id)), token, &body)
            .await?;
        tracing::info!(id, "updated post");
        parse(value)
    }

    /// Move a post to the trash.
    pub async fn delete_post(&self, token: &str, id: u64) -> Result<(), FetchError> {
        self.http()
            .delete_authed(&self.editor_url(&format!("posts/{}", id)), token)
            .await?;
        tracing::info!(id, "trashed post");
        Ok(())
    }

    /// A post in any status the token may read, for editing. `None` if it
    /// does not exist or is not visible to the token.
    pub async fn fetch_post(&self, token: &str, id: u64) -> Option<RawPost> {
        let url = self.editor_url(&format!("posts/{}", id));
        match self.http().get_json_authed(&url, token).await {
            Ok(value) => parse(value)
                .inspect_err(|e| tracing::warn!(id, error = %e, "malformed post payload"))
                .ok(),
            Err(e) => {
                tracing::warn!(id, error = %e, "post fetch for editing failed");
                None
            }
        }
    }

    pub async fn upload_media(&self, token: &str, file: &FileUpload) -> Result<Media, FetchError> {
        let value = self
            .http()
            .upload_authed(&self.editor_url("media"), token, file)
            .await?;
        let media: Media = parse(value)?;
        tracing::info!(id = media.id, filename = %file.filename, "uploaded media");
        Ok(media)
    }

    pub async fn fetch_media(&self, token: &str, id: u64) -> Option<Media> {
        let url = self.editor_url(&format!("media/{}", id));
        match self.http().get_json_authed(&url, token).await {
            Ok(value) => parse(value).ok(),
            Err(e) => {
                tracing::warn!(id, error = %e, "media fetch failed");
                None
            }
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::InvalidJson(e.to_string()))
}
