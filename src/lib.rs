//! Fortell - Spoken Podcast Summaries
//!
//! A CLI tool that turns a YouTube video into a podcast-style audio summary.
//!
//! The name "Fortell" comes from the Norwegian word for "tell."
//!
//! # Overview
//!
//! Fortell runs a linear four-stage pipeline:
//!
//! 1. Download the video's best audio-only stream as MP3
//! 2. Transcribe the full audio with a speech-recognition model
//! 3. Summarize the transcript in sequential parts with an LLM
//! 4. Synthesize the summary to speech and export one audio file
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `source` - Video ID extraction from URLs
//! - `audio` - Audio download and conversion
//! - `transcription` - Speech-to-text transcription
//! - `summary` - Multi-part summarization
//! - `speech` - Text-to-speech synthesis and export
//! - `pipeline` - Stage orchestration
//!
//! # Example
//!
//! ```rust,no_run
//! use fortell::config::Settings;
//! use fortell::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let result = pipeline.run("https://youtu.be/2SRVN9f25v4").await?;
//!     println!("Saved {}", result.output_path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod source;
pub mod speech;
pub mod summary;
pub mod transcription;

pub use error::{FortellError, Result};
