//! Studio orchestration module.

pub mod core;

pub use self::core::{
    ConversationList, GENERATION_FAILED_MESSAGE, SendOutcome, Studio, TEMPLATE_READY_MESSAGE,
};
