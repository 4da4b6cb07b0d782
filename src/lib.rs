pub mod bot;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod subtitle;
pub mod translate;

pub use config::{Config, RunMode, SubtitleFormat};
pub use error::{Result, SubbotError};
pub use pipeline::{
    convert_file, print_summary, translate_document, translate_file, PipelineResult,
    PipelineStats, RequestWorkspace, TranslatedDocument,
};
