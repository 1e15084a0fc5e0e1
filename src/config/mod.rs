//! Configuration management for Fortell.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummaryPrompts};
pub use settings::{
    GeneralSettings, PromptSettings, Settings, SpeechSettings, SummarySettings,
    TranscriptionSettings,
};
