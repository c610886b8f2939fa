pub mod relay;
pub mod token;

pub use crate::domain::model::{FeedbackRequest, Group, HttpEvent, HttpResponse, InteractionRecord};
pub use crate::domain::ports::{ChatProvider, ChatRequest, InteractionLog};
pub use crate::utils::error::Result;
