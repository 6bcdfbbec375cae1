pub mod common;
pub mod config;
pub mod outline;
pub mod pipeline;

pub use common::buffer::{ContentStream, FileContents};
pub use common::errors::StageError;
pub use outline::{outline_fn, CommandOutliner, OutlineOptions, OutlineStage, Outliner, StreamMode};
pub use pipeline::{Pipeline, SourceFile, Stage};
