use serde::Deserialize;

/// Fields posted by the new thread and edit thread forms.
///
/// Everything arrives as form text; flags are `"true"`/`"false"`.
#[derive(Debug, Deserialize, Default)]
pub struct ThreadForm {
    pub title: Option<String>,
    pub body: Option<String>,
    pub thread_type: Option<String>,
    pub anonymous: Option<String>,
    pub anonymous_to_peers: Option<String>,
    pub group_id: Option<String>,
    pub auto_subscribe: Option<String>,
    /// Moves the thread to another topic on update.
    pub commentable_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OpenCloseForm {
    pub closed: Option<String>,
}
