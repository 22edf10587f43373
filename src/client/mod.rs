pub mod error;
pub mod model;
pub mod service;

pub use error::{ClientError, ClientResult};
pub use model::{Comment, Commentable, Followable, ForumUser, Thread, Votable, VoteValue};
pub use service::{CommentClient, HttpCommentClient, retrieve_user_or_new};
