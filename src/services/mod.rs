// authorship-lens Core Services

pub mod text_processor;
pub mod config_store;
pub mod oracle;
pub mod file_reader;
pub mod detection;

pub use text_processor::*;
pub use config_store::*;
pub use oracle::*;
pub use file_reader::*;

// Re-export detection module functions
pub use detection::{
    Analyzer,
    Document,
    EMPTY_INPUT_MESSAGE,
    burstiness_score,
    lexical_diversity,
    repetition_score,
    sentence_stats,
    combine_score,
    classify_percent,
    to_percent,
    explain,
    flag_sentences,
};
