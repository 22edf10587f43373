use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::env;

use super::error::{ClientError, ClientResult};
use super::model::{Comment, Commentable, Followable, ForumUser, Thread, Votable, VoteValue};

/// Remote operations offered by the comment service.
///
/// Every lookup answers `ClientError::NotFound` when the id is unknown.
/// Vote and flag operations return the updated content as the service
/// renders it.
#[async_trait]
pub trait CommentClient: Send + Sync {
    async fn find_thread(&self, thread_id: &str) -> ClientResult<Thread>;

    /// Creates the thread when it has no id yet, updates it otherwise.
    async fn save_thread(&self, thread: &Thread) -> ClientResult<Thread>;

    async fn delete_thread(&self, thread_id: &str) -> ClientResult<Thread>;

    async fn find_comment(&self, comment_id: &str) -> ClientResult<Comment>;

    /// Creates the comment when it has no id yet, updates it otherwise.
    async fn save_comment(&self, comment: &Comment) -> ClientResult<Comment>;

    async fn delete_comment(&self, comment_id: &str) -> ClientResult<Comment>;

    async fn vote(&self, user_id: &str, target: &Votable, value: VoteValue) -> ClientResult<Value>;

    async fn unvote(&self, user_id: &str, target: &Votable) -> ClientResult<Value>;

    async fn flag_abuse(&self, user_id: &str, target: &Votable) -> ClientResult<Value>;

    /// With `remove_all` every flag is cleared, otherwise only the caller's.
    async fn unflag_abuse(&self, user_id: &str, target: &Votable, remove_all: bool)
    -> ClientResult<Value>;

    async fn pin_thread(&self, user_id: &str, thread_id: &str) -> ClientResult<Thread>;

    async fn unpin_thread(&self, user_id: &str, thread_id: &str) -> ClientResult<Thread>;

    async fn follow(&self, user_id: &str, target: &Followable) -> ClientResult<()>;

    async fn unfollow(&self, user_id: &str, target: &Followable) -> ClientResult<()>;

    async fn find_commentable(&self, commentable_id: &str) -> ClientResult<Commentable>;

    /// Fetches the user with activity counters scoped to `course_id`.
    async fn retrieve_user(&self, user_id: &str, course_id: Option<&str>) -> ClientResult<ForumUser>;
}

/// Like `retrieve_user`, but an account the service has never seen counts as
/// a user with no activity instead of an error.
pub async fn retrieve_user_or_new(
    client: &dyn CommentClient,
    user_id: &str,
    course_id: Option<&str>,
) -> ClientResult<ForumUser> {
    match client.retrieve_user(user_id, course_id).await {
        Err(ClientError::NotFound(_)) => Ok(ForumUser {
            id: user_id.to_string(),
            ..Default::default()
        }),
        other => other,
    }
}

/// Comment service endpoint loaded from environment variables
#[derive(Debug, Clone)]
pub struct CommentServiceConfig {
    pub base_url: String,
    pub api_key: String,
}

impl CommentServiceConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            base_url: env::var("COMMENTS_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:4567".to_string()),
            api_key: env::var("COMMENTS_SERVICE_KEY")
                .map_err(|_| "COMMENTS_SERVICE_KEY is required")?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Serialize)]
struct ThreadPayload<'a> {
    title: &'a str,
    body: &'a str,
    course_id: &'a str,
    commentable_id: &'a str,
    user_id: &'a str,
    anonymous: bool,
    anonymous_to_peers: bool,
    thread_type: &'a str,
    closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_id: Option<i64>,
}

impl<'a> From<&'a Thread> for ThreadPayload<'a> {
    fn from(thread: &'a Thread) -> Self {
        Self {
            title: &thread.title,
            body: &thread.body,
            course_id: &thread.course_id,
            commentable_id: &thread.commentable_id,
            user_id: &thread.user_id,
            anonymous: thread.anonymous,
            anonymous_to_peers: thread.anonymous_to_peers,
            thread_type: &thread.thread_type,
            closed: thread.closed,
            group_id: thread.group_id,
        }
    }
}

#[derive(Serialize)]
struct CommentPayload<'a> {
    body: &'a str,
    course_id: &'a str,
    user_id: &'a str,
    anonymous: bool,
    anonymous_to_peers: bool,
    endorsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    endorsement_user_id: Option<&'a str>,
}

impl<'a> From<&'a Comment> for CommentPayload<'a> {
    fn from(comment: &'a Comment) -> Self {
        Self {
            body: &comment.body,
            course_id: &comment.course_id,
            user_id: &comment.user_id,
            anonymous: comment.anonymous,
            anonymous_to_peers: comment.anonymous_to_peers,
            endorsed: comment.endorsed,
            endorsement_user_id: comment.endorsement_user_id.as_deref(),
        }
    }
}

/// `CommentClient` over the comment service REST API
pub struct HttpCommentClient {
    config: CommentServiceConfig,
    client: reqwest::Client,
}

impl HttpCommentClient {
    pub fn new() -> Result<Self, String> {
        let config = CommentServiceConfig::from_env()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: CommentServiceConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.config.url(path))
            .header("X-Edx-Api-Key", &self.config.api_key)
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> ClientResult<T> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Request {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(format!("Failed to parse {}: {}", resource, e)))
    }

    async fn expect_success(&self, response: reqwest::Response, resource: &str) -> ClientResult<()> {
        self.decode::<Value>(response, resource).await.map(|_| ())
    }

    fn resource_name(target: &Votable) -> &'static str {
        match target {
            Votable::Thread(_) => "Thread",
            Votable::Comment(_) => "Comment",
        }
    }
}

#[async_trait]
impl CommentClient for HttpCommentClient {
    async fn find_thread(&self, thread_id: &str) -> ClientResult<Thread> {
        let response = self
            .request(reqwest::Method::GET, &format!("threads/{}", thread_id))
            .query(&[("recursive", "false"), ("mark_as_read", "false")])
            .send()
            .await?;
        self.decode(response, "Thread").await
    }

    async fn save_thread(&self, thread: &Thread) -> ClientResult<Thread> {
        let payload = ThreadPayload::from(thread);
        let request = match thread.id.as_deref() {
            Some(id) => self.request(reqwest::Method::PUT, &format!("threads/{}", id)),
            None => self.request(
                reqwest::Method::POST,
                &format!("{}/threads", thread.commentable_id),
            ),
        };
        let response = request.form(&payload).send().await?;
        self.decode(response, "Thread").await
    }

    async fn delete_thread(&self, thread_id: &str) -> ClientResult<Thread> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("threads/{}", thread_id))
            .send()
            .await?;
        self.decode(response, "Thread").await
    }

    async fn find_comment(&self, comment_id: &str) -> ClientResult<Comment> {
        let response = self
            .request(reqwest::Method::GET, &format!("comments/{}", comment_id))
            .send()
            .await?;
        self.decode(response, "Comment").await
    }

    async fn save_comment(&self, comment: &Comment) -> ClientResult<Comment> {
        let payload = CommentPayload::from(comment);
        let path = match (comment.id.as_deref(), comment.parent_id.as_deref()) {
            (Some(id), _) => format!("comments/{}", id),
            (None, Some(parent_id)) => format!("comments/{}", parent_id),
            (None, None) => format!("threads/{}/comments", comment.thread_id),
        };
        let method = if comment.id.is_some() {
            reqwest::Method::PUT
        } else {
            reqwest::Method::POST
        };
        let response = self.request(method, &path).form(&payload).send().await?;
        self.decode(response, "Comment").await
    }

    async fn delete_comment(&self, comment_id: &str) -> ClientResult<Comment> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("comments/{}", comment_id))
            .send()
            .await?;
        self.decode(response, "Comment").await
    }

    async fn vote(&self, user_id: &str, target: &Votable, value: VoteValue) -> ClientResult<Value> {
        let response = self
            .request(reqwest::Method::PUT, &format!("{}/votes", target.path()))
            .form(&[("user_id", user_id), ("value", value.as_str())])
            .send()
            .await?;
        self.decode(response, Self::resource_name(target)).await
    }

    async fn unvote(&self, user_id: &str, target: &Votable) -> ClientResult<Value> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("{}/votes", target.path()))
            .query(&[("user_id", user_id)])
            .send()
            .await?;
        self.decode(response, Self::resource_name(target)).await
    }

    async fn flag_abuse(&self, user_id: &str, target: &Votable) -> ClientResult<Value> {
        let response = self
            .request(reqwest::Method::PUT, &format!("{}/abuse_flag", target.path()))
            .form(&[("user_id", user_id)])
            .send()
            .await?;
        self.decode(response, Self::resource_name(target)).await
    }

    async fn unflag_abuse(
        &self,
        user_id: &str,
        target: &Votable,
        remove_all: bool,
    ) -> ClientResult<Value> {
        let mut form = vec![("user_id", user_id.to_string())];
        if remove_all {
            form.push(("all", "true".to_string()));
        }
        let response = self
            .request(reqwest::Method::PUT, &format!("{}/abuse_unflag", target.path()))
            .form(&form)
            .send()
            .await?;
        self.decode(response, Self::resource_name(target)).await
    }

    async fn pin_thread(&self, user_id: &str, thread_id: &str) -> ClientResult<Thread> {
        let response = self
            .request(reqwest::Method::PUT, &format!("threads/{}/pin", thread_id))
            .form(&[("user_id", user_id)])
            .send()
            .await?;
        self.decode(response, "Thread").await
    }

    async fn unpin_thread(&self, user_id: &str, thread_id: &str) -> ClientResult<Thread> {
        let response = self
            .request(reqwest::Method::PUT, &format!("threads/{}/unpin", thread_id))
            .form(&[("user_id", user_id)])
            .send()
            .await?;
        self.decode(response, "Thread").await
    }

    async fn follow(&self, user_id: &str, target: &Followable) -> ClientResult<()> {
        let (source_type, source_id) = target.source();
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("users/{}/subscriptions", user_id),
            )
            .form(&[("source_type", source_type), ("source_id", source_id)])
            .send()
            .await?;
        self.expect_success(response, "Subscription").await
    }

    async fn unfollow(&self, user_id: &str, target: &Followable) -> ClientResult<()> {
        let (source_type, source_id) = target.source();
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("users/{}/subscriptions", user_id),
            )
            .query(&[("source_type", source_type), ("source_id", source_id)])
            .send()
            .await?;
        self.expect_success(response, "Subscription").await
    }

    async fn find_commentable(&self, commentable_id: &str) -> ClientResult<Commentable> {
        // Commentables are plain identifiers on the service side.
        Ok(Commentable {
            id: commentable_id.to_string(),
        })
    }

    async fn retrieve_user(&self, user_id: &str, course_id: Option<&str>) -> ClientResult<ForumUser> {
        let mut query = vec![("complete", "false")];
        if let Some(course_id) = course_id {
            query.push(("course_id", course_id));
        }
        let response = self
            .request(reqwest::Method::GET, &format!("users/{}", user_id))
            .query(&query)
            .send()
            .await?;
        self.decode(response, "User").await
    }
}
