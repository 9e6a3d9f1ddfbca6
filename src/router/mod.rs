//! Router Module
//!
//! Model selection and request translation.

pub mod attachment;
pub mod selection;

pub use attachment::ImageAttachment;
pub use selection::{
    ChatInput, ModelRouter, RoutedRequest, IMAGE_DESCRIPTION_MODEL, IMAGE_DESCRIPTION_PROMPT,
};
