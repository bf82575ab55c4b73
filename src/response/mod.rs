//! Reply enrichment layered on top of the classification decision.
mod empathy;
mod resources;

pub use empathy::{
    ComposedReply, GenerationError, ReplySource, ResponseComposer, ResponseGenerator,
    build_prompt, fallback_reply,
};
pub use resources::{ResourceBundle, ResourceSection};
