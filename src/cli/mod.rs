//! CLI module for Fortell.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Fortell - Spoken podcast summaries from YouTube videos
///
/// Downloads a video's audio, transcribes it, summarizes the transcript in
/// sequential parts, and reads the summary back as one audio file.
/// The name "Fortell" comes from the Norwegian word for "tell."
#[derive(Parser, Debug)]
#[command(name = "fortell")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline for a YouTube video
    Run {
        /// YouTube URL or bare video ID
        url: String,

        /// Number of sequential summary parts
        #[arg(short, long)]
        parts: Option<usize>,

        /// Directory for transcripts and the final audio
        #[arg(short, long)]
        output_dir: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,
}
