//! In-memory collaborators and an app harness for handler tests.

use actix_web::dev::{Service, ServiceRequest, ServiceResponse};
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpMessage, web};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::client::{
    ClientError, ClientResult, Comment, CommentClient, Commentable, Followable, ForumUser, Thread,
    Votable, VoteValue,
};
use crate::course::model::DiscussionTopic;
use crate::course::{Course, CourseKey, CourseStore};
use crate::middleware::auth::Claims;
use crate::middleware::error_handler::{form_config, query_config};
use crate::notification::model::{NotificationMessage, NotificationType};
use crate::notification::service::NotificationPublisher;
use crate::router::index::discussion_routes;
use crate::state::AppState;
use crate::uploader::storage::FileStorage;
use crate::user::model::LocalUser;
use crate::user::service::UserDirectory;
use crate::utils::config::ForumSettings;
use crate::utils::error::CustomError;
use crate::utils::uploads::{FileUpload, FileValidator};

pub const COURSE_ID: &str = "org/cs101/2024";
pub const COURSE_URL: &str = "/courses/org/cs101/2024/discussion";

/// Stands in for the bearer token in tests.
const TEST_USER_HEADER: &str = "X-Test-User";

const STUDENT_PERMISSIONS: &[&str] = &[
    "create_thread",
    "create_comment",
    "create_sub_comment",
    "update_thread",
    "update_comment",
    "vote",
    "unvote",
    "follow_thread",
    "unfollow_thread",
    "follow_commentable",
    "unfollow_commentable",
    "follow_user",
    "unfollow_user",
];

const MODERATOR_PERMISSIONS: &[&str] = &[
    "edit_content",
    "delete_thread",
    "delete_comment",
    "endorse_comment",
    "openclose_thread",
    "see_all_cohorts",
];

#[derive(Default)]
pub struct FakeCommentClient {
    threads: Mutex<HashMap<String, Thread>>,
    comments: Mutex<HashMap<String, Comment>>,
    users: Mutex<HashMap<String, ForumUser>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl FakeCommentClient {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    /// Mutating calls in the order they were made, e.g. `"vote threads/t1 up by 5"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn put_thread(&self, mut thread: Thread) -> String {
        let id = thread.id.clone().unwrap_or_else(|| self.next_id("t"));
        thread.id = Some(id.clone());
        self.threads.lock().unwrap().insert(id.clone(), thread);
        id
    }

    pub fn put_comment(&self, mut comment: Comment) -> String {
        let id = comment.id.clone().unwrap_or_else(|| self.next_id("c"));
        comment.id = Some(id.clone());
        self.comments.lock().unwrap().insert(id.clone(), comment);
        id
    }

    pub fn put_user(&self, user: ForumUser) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    pub fn thread(&self, id: &str) -> Option<Thread> {
        self.threads.lock().unwrap().get(id).cloned()
    }

    pub fn comment(&self, id: &str) -> Option<Comment> {
        self.comments.lock().unwrap().get(id).cloned()
    }

    async fn content_of(&self, target: &Votable) -> ClientResult<Value> {
        match target {
            Votable::Thread(id) => Ok(self.find_thread(id).await?.to_content()),
            Votable::Comment(id) => Ok(self.find_comment(id).await?.to_content()),
        }
    }

    fn set_pinned(&self, thread_id: &str, pinned: bool) -> ClientResult<Thread> {
        let mut threads = self.threads.lock().unwrap();
        let thread = threads
            .get_mut(thread_id)
            .ok_or_else(|| ClientError::NotFound("Thread".to_string()))?;
        thread.pinned = pinned;
        Ok(thread.clone())
    }
}

#[async_trait]
impl CommentClient for FakeCommentClient {
    async fn find_thread(&self, thread_id: &str) -> ClientResult<Thread> {
        self.thread(thread_id)
            .ok_or_else(|| ClientError::NotFound("Thread".to_string()))
    }

    async fn save_thread(&self, thread: &Thread) -> ClientResult<Thread> {
        let id = self.put_thread(thread.clone());
        self.record(format!("save_thread {}", id));
        self.find_thread(&id).await
    }

    async fn delete_thread(&self, thread_id: &str) -> ClientResult<Thread> {
        let thread = self
            .threads
            .lock()
            .unwrap()
            .remove(thread_id)
            .ok_or_else(|| ClientError::NotFound("Thread".to_string()))?;
        self.record(format!("delete_thread {}", thread_id));
        Ok(thread)
    }

    async fn find_comment(&self, comment_id: &str) -> ClientResult<Comment> {
        self.comment(comment_id)
            .ok_or_else(|| ClientError::NotFound("Comment".to_string()))
    }

    async fn save_comment(&self, comment: &Comment) -> ClientResult<Comment> {
        let mut comment = comment.clone();
        if comment.id.is_none() {
            comment.depth = match comment.parent_id.as_deref().and_then(|id| self.comment(id)) {
                Some(parent) => parent.depth + 1,
                None => 0,
            };
        }
        let id = self.put_comment(comment);
        self.record(format!("save_comment {}", id));
        self.find_comment(&id).await
    }

    async fn delete_comment(&self, comment_id: &str) -> ClientResult<Comment> {
        let comment = self
            .comments
            .lock()
            .unwrap()
            .remove(comment_id)
            .ok_or_else(|| ClientError::NotFound("Comment".to_string()))?;
        self.record(format!("delete_comment {}", comment_id));
        Ok(comment)
    }

    async fn vote(&self, user_id: &str, target: &Votable, value: VoteValue) -> ClientResult<Value> {
        let content = self.content_of(target).await?;
        self.record(format!("vote {} {} by {}", target.path(), value, user_id));
        Ok(content)
    }

    async fn unvote(&self, user_id: &str, target: &Votable) -> ClientResult<Value> {
        let content = self.content_of(target).await?;
        self.record(format!("unvote {} by {}", target.path(), user_id));
        Ok(content)
    }

    async fn flag_abuse(&self, user_id: &str, target: &Votable) -> ClientResult<Value> {
        let content = self.content_of(target).await?;
        self.record(format!("flag {} by {}", target.path(), user_id));
        Ok(content)
    }

    async fn unflag_abuse(
        &self,
        user_id: &str,
        target: &Votable,
        remove_all: bool,
    ) -> ClientResult<Value> {
        let content = self.content_of(target).await?;
        self.record(format!(
            "unflag {} by {} all={}",
            target.path(),
            user_id,
            remove_all
        ));
        Ok(content)
    }

    async fn pin_thread(&self, user_id: &str, thread_id: &str) -> ClientResult<Thread> {
        let thread = self.set_pinned(thread_id, true)?;
        self.record(format!("pin {} by {}", thread_id, user_id));
        Ok(thread)
    }

    async fn unpin_thread(&self, user_id: &str, thread_id: &str) -> ClientResult<Thread> {
        let thread = self.set_pinned(thread_id, false)?;
        self.record(format!("unpin {} by {}", thread_id, user_id));
        Ok(thread)
    }

    async fn follow(&self, user_id: &str, target: &Followable) -> ClientResult<()> {
        let (source_type, source_id) = target.source();
        self.record(format!("follow {} {} by {}", source_type, source_id, user_id));
        Ok(())
    }

    async fn unfollow(&self, user_id: &str, target: &Followable) -> ClientResult<()> {
        let (source_type, source_id) = target.source();
        self.record(format!("unfollow {} {} by {}", source_type, source_id, user_id));
        Ok(())
    }

    async fn find_commentable(&self, commentable_id: &str) -> ClientResult<Commentable> {
        Ok(Commentable {
            id: commentable_id.to_string(),
        })
    }

    async fn retrieve_user(&self, user_id: &str, _course_id: Option<&str>) -> ClientResult<ForumUser> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("User".to_string()))
    }
}

/// One course, `org/cs101/2024`, where everyone holds the student role.
pub struct FakeCourseStore {
    course: Mutex<Course>,
    grants: Mutex<HashMap<String, HashSet<String>>>,
    revoked: Mutex<HashSet<String>>,
}

impl Default for FakeCourseStore {
    fn default() -> Self {
        let mut course = Course::new(COURSE_ID);
        course.display_name = "Intro to CS".to_string();
        course.discussion_topics.push(DiscussionTopic {
            id: "general".to_string(),
            name: "General".to_string(),
        });
        Self {
            course: Mutex::new(course),
            grants: Mutex::new(HashMap::new()),
            revoked: Mutex::new(HashSet::new()),
        }
    }
}

impl FakeCourseStore {
    pub fn edit_course(&self, edit: impl FnOnce(&mut Course)) {
        edit(&mut self.course.lock().unwrap());
    }

    pub fn grant(&self, user_id: &str, permissions: &[&str]) {
        self.grants
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .extend(permissions.iter().map(|p| p.to_string()));
    }

    pub fn make_moderator(&self, user_id: &str) {
        self.grant(user_id, MODERATOR_PERMISSIONS);
    }

    /// Leaves the user with no forum permission at all.
    pub fn revoke_all(&self, user_id: &str) {
        self.revoked.lock().unwrap().insert(user_id.to_string());
    }
}

#[async_trait]
impl CourseStore for FakeCourseStore {
    async fn get_course(&self, course_key: &CourseKey) -> Result<Option<Course>, CustomError> {
        let course = self.course.lock().unwrap();
        Ok((course.id == course_key.to_string()).then(|| course.clone()))
    }

    async fn user_permissions(
        &self,
        _course_key: &CourseKey,
        user_id: &str,
    ) -> Result<HashSet<String>, CustomError> {
        if self.revoked.lock().unwrap().contains(user_id) {
            return Ok(HashSet::new());
        }
        let mut permissions: HashSet<String> =
            STUDENT_PERMISSIONS.iter().map(|p| p.to_string()).collect();
        if let Some(extra) = self.grants.lock().unwrap().get(user_id) {
            permissions.extend(extra.iter().cloned());
        }
        Ok(permissions)
    }
}

#[derive(Default)]
pub struct FakeUserDirectory {
    users: Mutex<Vec<LocalUser>>,
}

impl FakeUserDirectory {
    /// Registers an account and returns its id.
    pub fn add(&self, username: &str) -> String {
        let user = LocalUser {
            id: ObjectId::new(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
        };
        let id = user.id.to_hex();
        self.users.lock().unwrap().push(user);
        id
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<LocalUser>, CustomError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    registered: Mutex<Vec<String>>,
    sent: Mutex<Vec<(String, NotificationMessage)>>,
    failing: bool,
}

impl RecordingPublisher {
    /// A publisher whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(String, NotificationMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationPublisher for RecordingPublisher {
    async fn register_type(&self, msg_type: &NotificationType) -> Result<(), String> {
        if self.failing {
            return Err("notification bus down".to_string());
        }
        self.registered.lock().unwrap().push(msg_type.name.clone());
        Ok(())
    }

    async fn publish_to_user(
        &self,
        user_id: &str,
        message: &NotificationMessage,
    ) -> Result<(), String> {
        if self.failing {
            return Err("notification bus down".to_string());
        }
        self.sent
            .lock()
            .unwrap()
            .push((user_id.to_string(), message.clone()));
        Ok(())
    }
}

/// Keeps uploads in memory and serves them from `https://cdn.test/uploads/`.
#[derive(Default)]
pub struct MemoryStorage {
    stored: Mutex<Vec<String>>,
    fail_next: AtomicBool,
}

impl MemoryStorage {
    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn store(&self, name: &str, _file: FileUpload) -> Result<String, String> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("bucket unavailable".to_string());
        }
        self.stored.lock().unwrap().push(name.to_string());
        Ok(format!(
            "https://cdn.test/uploads/{}?X-Signature=abc#preview",
            name
        ))
    }
}

pub struct TestApp {
    pub comments: Arc<FakeCommentClient>,
    pub courses: Arc<FakeCourseStore>,
    pub users: Arc<FakeUserDirectory>,
    pub notifier: Arc<RecordingPublisher>,
    pub storage: Arc<MemoryStorage>,
    pub settings: ForumSettings,
    pub notifications_enabled: bool,
}

pub fn test_app() -> TestApp {
    TestApp {
        comments: Arc::new(FakeCommentClient::default()),
        courses: Arc::new(FakeCourseStore::default()),
        users: Arc::new(FakeUserDirectory::default()),
        notifier: Arc::new(RecordingPublisher::default()),
        storage: Arc::new(MemoryStorage::default()),
        settings: ForumSettings {
            max_comment_depth: None,
            upload_policy: FileValidator::images().with_max_size(1024),
        },
        notifications_enabled: true,
    }
}

fn test_user(req: &ServiceRequest) -> Option<Claims> {
    let id = req.headers().get(TEST_USER_HEADER)?.to_str().ok()?;
    Some(Claims {
        id: id.to_string(),
        username: format!("user{}", id),
        exp: usize::MAX,
    })
}

impl TestApp {
    pub fn get(user_id: &str, uri: &str) -> TestRequest {
        TestRequest::get()
            .uri(uri)
            .insert_header((TEST_USER_HEADER, user_id))
    }

    pub fn post(user_id: &str, uri: &str) -> TestRequest {
        TestRequest::post()
            .uri(uri)
            .insert_header((TEST_USER_HEADER, user_id))
    }

    pub fn post_form(user_id: &str, uri: &str, form: &[(&str, &str)]) -> TestRequest {
        Self::post(user_id, uri).set_form(form)
    }

    fn state(&self) -> AppState {
        let notifier: Option<Arc<dyn NotificationPublisher>> = if self.notifications_enabled {
            Some(self.notifier.clone())
        } else {
            None
        };
        AppState {
            comments: self.comments.clone(),
            courses: self.courses.clone(),
            users: self.users.clone(),
            notifier,
            storage: self.storage.clone(),
            settings: self.settings.clone(),
        }
    }

    pub async fn call(&self, req: TestRequest) -> ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(self.state()))
                .app_data(form_config())
                .app_data(query_config())
                .service(
                    web::scope("/courses/{org}/{course}/{run}/discussion")
                        .wrap_fn(|req, srv| {
                            if let Some(user) = test_user(&req) {
                                req.extensions_mut().insert(user);
                            }
                            srv.call(req)
                        })
                        .configure(discussion_routes),
                ),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }
}
