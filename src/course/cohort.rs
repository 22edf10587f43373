use crate::course::model::Course;
use crate::middleware::permission::ForumPermissions;
use crate::utils::error::CustomError;

/// Permission letting moderators post on behalf of any cohort.
pub const SEE_ALL_COHORTS: &str = "see_all_cohorts";

pub fn is_commentable_cohorted(course: &Course, commentable_id: &str) -> bool {
    if !course.cohort_config.cohorted {
        return false;
    }
    let course_wide = course
        .discussion_topics
        .iter()
        .any(|topic| topic.id == commentable_id);
    if course_wide {
        course
            .cohort_config
            .cohorted_discussions
            .iter()
            .any(|id| id == commentable_id)
    } else {
        true
    }
}

/// Resolves the group id a new thread is filed under.
///
/// Moderators may name any cohort of the course through `requested_group_id`;
/// everyone else posts into their own cohort. A requested id that does not
/// parse or does not belong to the course fails the request.
pub fn group_id_for_comments_service(
    course: &Course,
    commentable_id: Option<&str>,
    requested_group_id: Option<&str>,
    permissions: &ForumPermissions,
) -> Result<Option<i64>, CustomError> {
    if let Some(commentable_id) = commentable_id {
        if !is_commentable_cohorted(course, commentable_id) {
            return Ok(None);
        }
    }

    if permissions.has(SEE_ALL_COHORTS) {
        let requested = match requested_group_id.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };
        let group_id: i64 = requested
            .parse()
            .map_err(|_| CustomError::BadRequestError("Invalid cohort id".to_string()))?;
        course
            .cohort_by_id(group_id)
            .map(|cohort| Some(cohort.id))
            .ok_or_else(|| CustomError::BadRequestError("Invalid cohort id".to_string()))
    } else {
        Ok(course
            .cohort_for_user(&permissions.user_id)
            .map(|cohort| cohort.id))
    }
}
