use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::client::retrieve_user_or_new;

use crate::middleware::auth::current_user;
use crate::state::AppState;
use crate::user::model::{UserMatch, UsersQuery};
use crate::utils::error::CustomError;
use crate::utils::model::CoursePath;

/// Finds a forum participant by exact username
/// GET /courses/{org}/{course}/{run}/discussion/users?username=
///
/// At most one user is returned, and only when they have posted in the course.
pub async fn users(
    req: HttpRequest,
    path: web::Path<CoursePath>,
    query: web::Query<UsersQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    current_user(&req)?;
    let course_key = path.course_key()?;
    let course = state.load_course(&course_key).await?;

    let username = query.username.as_deref().ok_or_else(|| {
        CustomError::BadRequestError("username parameter is required".to_string())
    })?;

    let mut matches = Vec::new();
    if let Some(local_user) = state.users.find_by_username(username).await? {
        let user_id = local_user.id.to_hex();
        let forum_user =
            retrieve_user_or_new(state.comments.as_ref(), &user_id, Some(course.id.as_str()))
                .await?;
        if forum_user.threads_count + forum_user.comments_count > 0 {
            matches.push(UserMatch {
                id: user_id,
                username: local_user.username,
            });
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "users": matches })))
}
