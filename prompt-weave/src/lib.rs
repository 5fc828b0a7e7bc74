//! Prompt construction for the frame.
//!
//! Prompts are assembled from plain text files, one candidate per line.
//! Lines may be weighted (`"5:a red fox"`) and may contain bracket groups
//! (`"a (red|5:grey) fox"`) that resolve to one alternative each time the
//! prompt is built. The same weighted choice drives which image provider is
//! used for a refresh.

mod error;
pub mod prompt;
pub mod select;
pub mod template;
pub mod weighted;

pub use crate::error::{Result, WeaveError as Error};
pub use crate::prompt::{
    build_normal_prompt, build_subject_artist_prompt, Prompt, PromptMode, PromptSources,
    PromptTemplate,
};
pub use crate::select::{choose, choose_with_fallback};
pub use crate::template::{parse_multiple_brackets, BracketPair, DEFAULT_BRACKETS};
