//! Completion, hover, and signature help over a published
//! [`AnalysisResult`].

mod context;
mod hover;
mod items;
mod signature;

pub use context::{CompletionContext, classify_completion_context};
pub use hover::{HoverInfo, hover};
pub use items::{CompletionItem, completion_items};
pub use signature::{SignatureHelp, signature_help};
