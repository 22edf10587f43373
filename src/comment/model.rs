use serde::Deserialize;

/// Fields posted when replying to a thread or a response, or editing one.
#[derive(Debug, Deserialize, Default)]
pub struct CommentForm {
    pub body: Option<String>,
    pub anonymous: Option<String>,
    pub anonymous_to_peers: Option<String>,
    pub auto_subscribe: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct EndorseForm {
    pub endorsed: Option<String>,
}
