use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::client::{Followable, Thread, Votable, VoteValue};
use crate::course::cohort::group_id_for_comments_service;
use crate::middleware::auth::current_user;
use crate::middleware::permission::{ContentRef, ensure_permitted};
use crate::notification::model::{POST_UPVOTED, THREAD_FOLLOWED};
use crate::notification::publish_discussion_notification;
use crate::state::AppState;
use crate::thread::model::{OpenCloseForm, ThreadForm};
use crate::utils::content::{add_courseware_context, content_response, prepare_content, thread_permalink};
use crate::utils::error::CustomError;
use crate::utils::helpers::{form_flag, is_blank};
use crate::utils::model::{CommentablePath, ThreadPath, VotePath};

/// Title and body are both required before anything reaches the comment service.
fn require_title_and_body(form: &ThreadForm) -> Result<(String, String), CustomError> {
    if is_blank(form.title.as_deref()) {
        return Err(CustomError::ValidationError("Title can't be empty".to_string()));
    }
    if is_blank(form.body.as_deref()) {
        return Err(CustomError::ValidationError("Body can't be empty".to_string()));
    }
    Ok((
        form.title.clone().unwrap_or_default(),
        form.body.clone().unwrap_or_default(),
    ))
}

/// Starts a thread in a topic
/// POST /courses/{org}/{course}/{run}/discussion/{commentable_id}/threads/create
pub async fn create_thread(
    req: HttpRequest,
    path: web::Path<CommentablePath>,
    form: Option<web::Form<ThreadForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    // A missing or non-form body is treated as an empty form.
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    let permissions =
        ensure_permitted(&state, &user, &course_key, &course, ContentRef::None, "create_thread")
            .await?;

    log::debug!(
        "Creating new thread in {}, commentable {}",
        course_key,
        path.commentable_id
    );

    let (title, body) = require_title_and_body(&form)?;
    let anonymous = course.allow_anonymous && form_flag(form.anonymous.as_deref());
    let anonymous_to_peers =
        course.allow_anonymous_to_peers && form_flag(form.anonymous_to_peers.as_deref());
    let group_id = group_id_for_comments_service(
        &course,
        Some(&path.commentable_id),
        form.group_id.as_deref(),
        &permissions,
    )?;

    let thread = Thread {
        course_id: course_key.to_string(),
        commentable_id: path.commentable_id.clone(),
        title,
        body,
        user_id: user.id.clone(),
        username: Some(user.username.clone()),
        anonymous,
        anonymous_to_peers,
        thread_type: form
            .thread_type
            .clone()
            .filter(|kind| !kind.trim().is_empty())
            .unwrap_or_else(|| "discussion".to_string()),
        group_id,
        ..Default::default()
    };
    let thread = state.comments.save_thread(&thread).await?;

    if form_flag(form.auto_subscribe.as_deref()) {
        if let Some(thread_id) = &thread.id {
            state
                .comments
                .follow(&user.id, &Followable::Thread(thread_id.clone()))
                .await?;
        }
    }

    let mut content = thread.to_content();
    add_courseware_context(&mut content, &course);
    content_response(&req, &state, &user, &permissions, &course, content).await
}

/// Edits a thread
/// POST .../threads/{thread_id}/update
pub async fn update_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    form: Option<web::Form<ThreadForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    let permissions = ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "update_thread",
    )
    .await?;

    let (title, body) = require_title_and_body(&form)?;

    let mut thread = state.comments.find_thread(&path.thread_id).await?;
    thread.title = title;
    thread.body = body;
    if let Some(thread_type) = form.thread_type.as_deref().filter(|t| !t.trim().is_empty()) {
        thread.thread_type = thread_type.to_string();
    }
    if let Some(commentable_id) = form.commentable_id.as_deref() {
        if !course.discussion_category_ids().contains(&commentable_id) {
            return Err(CustomError::ValidationError("Topic doesn't exist".to_string()));
        }
        thread.commentable_id = commentable_id.to_string();
    }

    let thread = state.comments.save_thread(&thread).await?;
    content_response(&req, &state, &user, &permissions, &course, thread.to_content()).await
}

/// POST .../threads/{thread_id}/delete
pub async fn delete_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "delete_thread",
    )
    .await?;

    let thread = state.comments.delete_thread(&path.thread_id).await?;
    Ok(HttpResponse::Ok().json(prepare_content(&thread.to_content(), &course, false)))
}

/// Opens or closes a thread for new responses
/// POST .../threads/{thread_id}/close
pub async fn openclose_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    form: Option<web::Form<OpenCloseForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    let permissions = ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "openclose_thread",
    )
    .await?;

    let closed = form.is_some_and(|form| form_flag(form.closed.as_deref()));
    let mut thread = state.comments.find_thread(&path.thread_id).await?;
    thread.closed = closed;
    let thread = state.comments.save_thread(&thread).await?;

    let content = thread.to_content();
    Ok(HttpResponse::Ok().json(json!({
        "content": prepare_content(&content, &course, false),
        "ability": permissions.ability(&content),
    })))
}

/// POST .../threads/{content_id}/{upvote|downvote}
pub async fn vote_for_thread(
    req: HttpRequest,
    path: web::Path<VotePath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let value: VoteValue = path.value.parse().map_err(CustomError::BadRequestError)?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.content_id),
        "vote_for_thread",
    )
    .await?;

    let thread = state.comments.find_thread(&path.content_id).await?;
    let updated = state
        .comments
        .vote(&user.id, &Votable::Thread(path.content_id.clone()), value)
        .await?;

    if value == VoteValue::Up {
        publish_discussion_notification(
            state.notifier.as_deref(),
            POST_UPVOTED,
            &course.id,
            &thread,
            &user,
            thread_permalink(&thread),
        )
        .await;
    }

    Ok(HttpResponse::Ok().json(prepare_content(&updated, &course, false)))
}

/// POST .../threads/{thread_id}/unvote
pub async fn undo_vote_for_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "undo_vote_for_thread",
    )
    .await?;

    let updated = state
        .comments
        .unvote(&user.id, &Votable::Thread(path.thread_id.clone()))
        .await?;
    Ok(HttpResponse::Ok().json(prepare_content(&updated, &course, false)))
}

/// POST .../threads/{thread_id}/flagAbuse
pub async fn flag_abuse_for_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "flag_abuse_for_thread",
    )
    .await?;

    let updated = state
        .comments
        .flag_abuse(&user.id, &Votable::Thread(path.thread_id.clone()))
        .await?;
    Ok(HttpResponse::Ok().json(prepare_content(&updated, &course, false)))
}

/// Moderators clear every flag, everyone else only their own
/// POST .../threads/{thread_id}/unFlagAbuse
pub async fn un_flag_abuse_for_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    let permissions = ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "un_flag_abuse_for_thread",
    )
    .await?;

    let remove_all = permissions.has("openclose_thread");
    let updated = state
        .comments
        .unflag_abuse(&user.id, &Votable::Thread(path.thread_id.clone()), remove_all)
        .await?;
    Ok(HttpResponse::Ok().json(prepare_content(&updated, &course, false)))
}

/// POST .../threads/{thread_id}/pin
pub async fn pin_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "pin_thread",
    )
    .await?;

    let thread = state.comments.pin_thread(&user.id, &path.thread_id).await?;
    Ok(HttpResponse::Ok().json(prepare_content(&thread.to_content(), &course, false)))
}

/// POST .../threads/{thread_id}/unpin
pub async fn un_pin_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "un_pin_thread",
    )
    .await?;

    let thread = state.comments.unpin_thread(&user.id, &path.thread_id).await?;
    Ok(HttpResponse::Ok().json(prepare_content(&thread.to_content(), &course, false)))
}

/// POST .../threads/{thread_id}/follow
pub async fn follow_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "follow_thread",
    )
    .await?;

    let thread = state.comments.find_thread(&path.thread_id).await?;
    state
        .comments
        .follow(&user.id, &Followable::Thread(path.thread_id.clone()))
        .await?;

    publish_discussion_notification(
        state.notifier.as_deref(),
        THREAD_FOLLOWED,
        &course.id,
        &thread,
        &user,
        thread_permalink(&thread),
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({})))
}

/// POST .../threads/{thread_id}/unfollow
pub async fn unfollow_thread(
    req: HttpRequest,
    path: web::Path<ThreadPath>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;
    ensure_permitted(
        &state,
        &user,
        &course_key,
        &course,
        ContentRef::Thread(&path.thread_id),
        "unfollow_thread",
    )
    .await?;

    state
        .comments
        .unfollow(&user.id, &Followable::Thread(path.thread_id.clone()))
        .await?;
    Ok(HttpResponse::Ok().json(json!({})))
}

#[cfg(test)]
mod tests {
    use crate::client::Thread;
    use crate::course::model::{Cohort, InlineDiscussion};
    use crate::notification::model::{POST_UPVOTED, THREAD_FOLLOWED};
    use crate::testing::{COURSE_ID, COURSE_URL, TestApp, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    async fn post_form(app: &TestApp, user: &str, uri: &str, form: &[(&str, &str)]) -> (StatusCode, Value) {
        let resp = app
            .call(TestApp::post_form(user, &format!("{}{}", COURSE_URL, uri), form))
            .await;
        let status = resp.status();
        (status, test::read_body_json(resp).await)
    }

    fn thread_by(author: &str) -> Thread {
        Thread {
            course_id: COURSE_ID.into(),
            commentable_id: "general".into(),
            title: "Week 1".into(),
            body: "Where are the slides?".into(),
            user_id: author.into(),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn creates_threads() {
        let app = test_app();
        let (status, body) = post_form(
            &app,
            "5",
            "/general/threads/create",
            &[("title", "Hello"), ("body", "World"), ("auto_subscribe", "true")],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Hello");
        assert_eq!(body["thread_type"], "discussion");
        assert_eq!(body["pinned"], false);
        assert_eq!(body["user_id"], "5");
        let id = body["id"].as_str().unwrap();
        assert_eq!(
            app.comments.calls(),
            vec![format!("save_thread {}", id), format!("follow thread {} by 5", id)]
        );
    }

    #[actix_web::test]
    async fn empty_title_is_rejected_before_saving() {
        let app = test_app();
        let (status, body) = post_form(
            &app,
            "5",
            "/general/threads/create",
            &[("title", "  "), ("body", "")],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": ["Title can't be empty"] }));
        assert!(app.comments.calls().is_empty());
    }

    #[actix_web::test]
    async fn empty_body_is_rejected() {
        let app = test_app();
        let (status, body) =
            post_form(&app, "5", "/general/threads/create", &[("title", "Hi")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": ["Body can't be empty"] }));
    }

    #[actix_web::test]
    async fn posts_without_a_form_read_as_empty() {
        let app = test_app();
        let resp = app
            .call(TestApp::post("5", &format!("{}/general/threads/create", COURSE_URL)))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "errors": ["Title can't be empty"] }));
        assert!(app.comments.calls().is_empty());
    }

    #[actix_web::test]
    async fn update_rejects_blank_titles() {
        let app = test_app();
        let id = app.comments.put_thread(thread_by("5"));

        let (status, body) = post_form(
            &app,
            "5",
            &format!("/threads/{}/update", id),
            &[("title", "  "), ("body", "Still here")],
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": ["Title can't be empty"] }));
        assert!(!app.comments.calls().iter().any(|c| c.starts_with("save_thread")));
        assert_eq!(app.comments.thread(&id).unwrap().title, "Week 1");
    }

    #[actix_web::test]
    async fn anonymity_follows_course_settings() {
        let app = test_app();
        app.courses.edit_course(|course| course.allow_anonymous_to_peers = false);
        let (_, body) = post_form(
            &app,
            "5",
            "/general/threads/create",
            &[
                ("title", "Hi"),
                ("body", "There"),
                ("anonymous", "true"),
                ("anonymous_to_peers", "true"),
            ],
        )
        .await;

        assert_eq!(body["anonymous"], true);
        assert_eq!(body["anonymous_to_peers"], false);
        assert!(body.get("user_id").is_none());
    }

    #[actix_web::test]
    async fn inline_threads_carry_courseware_context() {
        let app = test_app();
        app.courses.edit_course(|course| {
            course.inline_discussions.push(InlineDiscussion {
                commentable_id: "unit-3".into(),
                title: "Week 3 / Recursion".into(),
                url: "/courses/org/cs101/2024/jump_to/unit-3".into(),
            })
        });
        let (_, body) = post_form(
            &app,
            "5",
            "/unit-3/threads/create",
            &[("title", "Hi"), ("body", "There")],
        )
        .await;
        assert_eq!(body["courseware_title"], "Week 3 / Recursion");
    }

    #[actix_web::test]
    async fn moderators_file_threads_under_a_cohort() {
        let app = test_app();
        app.courses.make_moderator("9");
        app.courses.edit_course(|course| {
            course.cohort_config.cohorted = true;
            course.cohorts.push(Cohort {
                id: 4,
                name: "Evening".into(),
                users: vec![],
            });
        });

        let (status, body) = post_form(
            &app,
            "9",
            "/unit-1/threads/create",
            &[("title", "Hi"), ("body", "There"), ("group_id", "4")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["group_id"], 4);
        assert_eq!(body["group_name"], "Evening");

        let (status, body) = post_form(
            &app,
            "9",
            "/unit-1/threads/create",
            &[("title", "Hi"), ("body", "There"), ("group_id", "77")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": ["Invalid cohort id"] }));
    }

    #[actix_web::test]
    async fn users_without_permission_are_refused() {
        let app = test_app();
        app.courses.revoke_all("5");
        let (status, body) = post_form(
            &app,
            "5",
            "/general/threads/create",
            &[("title", "Hi"), ("body", "There")],
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "errors": ["unauthorized"] }));
        assert!(app.comments.calls().is_empty());
    }

    #[actix_web::test]
    async fn ajax_callers_get_annotated_content() {
        let app = test_app();
        let req = TestApp::post_form(
            "5",
            &format!("{}/general/threads/create", COURSE_URL),
            &[("title", "Hi"), ("body", "There")],
        )
        .insert_header(("X-Requested-With", "XMLHttpRequest"));
        let resp = app.call(req).await;
        let body: Value = test::read_body_json(resp).await;

        assert_eq!(body["content"]["title"], "Hi");
        let info = &body["annotated_content_info"];
        assert_eq!(info["voted"], "");
        assert_eq!(info["ability"]["editable"], true);
        assert_eq!(info["ability"]["can_openclose"], false);
    }

    #[actix_web::test]
    async fn update_changes_only_what_was_sent() {
        let app = test_app();
        let mut thread = thread_by("5");
        thread.thread_type = "question".into();
        let id = app.comments.put_thread(thread);

        let (status, body) = post_form(
            &app,
            "5",
            &format!("/threads/{}/update", id),
            &[("title", "Week 1 slides"), ("body", "Found them")],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Week 1 slides");
        assert_eq!(body["thread_type"], "question");
        assert_eq!(body["commentable_id"], "general");
    }

    #[actix_web::test]
    async fn update_rejects_unknown_topics() {
        let app = test_app();
        let id = app.comments.put_thread(thread_by("5"));
        let (status, body) = post_form(
            &app,
            "5",
            &format!("/threads/{}/update", id),
            &[("title", "a"), ("body", "b"), ("commentable_id", "nowhere")],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": ["Topic doesn't exist"] }));
    }

    #[actix_web::test]
    async fn foreign_threads_need_edit_content() {
        let app = test_app();
        let id = app.comments.put_thread(thread_by("7"));
        let (status, _) = post_form(
            &app,
            "5",
            &format!("/threads/{}/update", id),
            &[("title", "a"), ("body", "b")],
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        app.courses.make_moderator("5");
        let (status, _) = post_form(
            &app,
            "5",
            &format!("/threads/{}/update", id),
            &[("title", "a"), ("body", "b")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_threads_are_404() {
        let app = test_app();
        let (status, body) = post_form(&app, "5", "/threads/nope/upvote", &[]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "errors": ["Thread not found"] }));
    }

    #[actix_web::test]
    async fn authors_delete_their_threads() {
        let app = test_app();
        let id = app.comments.put_thread(thread_by("5"));
        let (status, body) = post_form(&app, "5", &format!("/threads/{}/delete", id), &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());
        assert!(app.comments.thread(&id).is_none());
    }

    #[actix_web::test]
    async fn openclose_reports_ability() {
        let app = test_app();
        app.courses.make_moderator("9");
        let id = app.comments.put_thread(thread_by("5"));

        let (status, body) = post_form(
            &app,
            "9",
            &format!("/threads/{}/close", id),
            &[("closed", "true")],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"]["closed"], true);
        assert_eq!(body["ability"]["can_openclose"], true);
        assert!(app.comments.thread(&id).unwrap().closed);

        let (status, _) = post_form(&app, "5", &format!("/threads/{}/close", id), &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn closed_threads_cannot_be_voted_on() {
        let app = test_app();
        let mut thread = thread_by("7");
        thread.closed = true;
        let id = app.comments.put_thread(thread);
        let (status, _) = post_form(&app, "5", &format!("/threads/{}/upvote", id), &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn upvotes_notify_the_author() {
        let app = test_app();
        let id = app.comments.put_thread(thread_by("7"));

        let (status, _) = post_form(&app, "5", &format!("/threads/{}/upvote", id), &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert!(app.comments.calls().contains(&format!("vote threads/{} up by 5", id)));

        let sent = app.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "7");
        assert_eq!(sent[0].1.msg_type.name, POST_UPVOTED);
        assert_eq!(
            sent[0].1.payload.link_to_thread,
            format!("/courses/{}/discussion/forum/general/threads/{}", COURSE_ID, id)
        );

        post_form(&app, "5", &format!("/threads/{}/downvote", id), &[]).await;
        assert_eq!(app.notifier.sent().len(), 1);
    }

    #[actix_web::test]
    async fn own_votes_and_disabled_notifications_stay_quiet() {
        let mut app = test_app();
        let id = app.comments.put_thread(thread_by("5"));
        post_form(&app, "5", &format!("/threads/{}/upvote", id), &[]).await;
        assert!(app.notifier.sent().is_empty());

        app.notifications_enabled = false;
        post_form(&app, "6", &format!("/threads/{}/upvote", id), &[]).await;
        assert!(app.notifier.sent().is_empty());
    }

    #[actix_web::test]
    async fn unvote_and_flags() {
        let app = test_app();
        let id = app.comments.put_thread(thread_by("7"));

        post_form(&app, "5", &format!("/threads/{}/unvote", id), &[]).await;
        post_form(&app, "5", &format!("/threads/{}/flagAbuse", id), &[]).await;
        post_form(&app, "5", &format!("/threads/{}/unFlagAbuse", id), &[]).await;
        app.courses.make_moderator("9");
        post_form(&app, "9", &format!("/threads/{}/unFlagAbuse", id), &[]).await;

        assert_eq!(
            app.comments.calls(),
            vec![
                format!("unvote threads/{} by 5", id),
                format!("flag threads/{} by 5", id),
                format!("unflag threads/{} by 5 all=false", id),
                format!("unflag threads/{} by 9 all=true", id),
            ]
        );
    }

    #[actix_web::test]
    async fn pinning_needs_openclose() {
        let app = test_app();
        let id = app.comments.put_thread(thread_by("5"));

        let (status, _) = post_form(&app, "5", &format!("/threads/{}/pin", id), &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        app.courses.make_moderator("9");
        let (_, body) = post_form(&app, "9", &format!("/threads/{}/pin", id), &[]).await;
        assert_eq!(body["pinned"], true);
        let (_, body) = post_form(&app, "9", &format!("/threads/{}/unpin", id), &[]).await;
        assert_eq!(body["pinned"], false);
    }

    #[actix_web::test]
    async fn following_notifies_the_author() {
        let app = test_app();
        let id = app.comments.put_thread(thread_by("7"));

        let (status, body) = post_form(&app, "5", &format!("/threads/{}/follow", id), &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
        assert_eq!(app.notifier.sent()[0].1.msg_type.name, THREAD_FOLLOWED);

        let (_, body) = post_form(&app, "5", &format!("/threads/{}/unfollow", id), &[]).await;
        assert_eq!(body, json!({}));
        assert_eq!(
            app.comments.calls(),
            vec![
                format!("follow thread {} by 5", id),
                format!("unfollow thread {} by 5", id),
            ]
        );
    }
}
