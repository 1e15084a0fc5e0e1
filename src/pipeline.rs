//! Pipeline orchestration.
//!
//! Runs the four stages in strict sequence: download audio, transcribe,
//! summarize, synthesize speech. Each stage's output feeds the next; a failure
//! anywhere other than per-chunk speech synthesis aborts the run.

use crate::audio::{AudioFetcher, YtDlpFetcher};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::source::VideoSource;
use crate::speech::{OpenAiSpeechEngine, SpeechEngine, SpeechSynthesizer};
use crate::summary::Summarizer;
use crate::transcription::{transcribe_audio, Transcriber, WhisperTranscriber};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    /// Video ID derived from the input URL.
    pub video_id: String,
    /// Path of the downloaded audio.
    pub audio_path: PathBuf,
    /// Path of the exported summary audio.
    pub output_path: PathBuf,
    /// The generated summary text.
    pub summary: String,
}

/// The main orchestrator for the Fortell pipeline.
pub struct Pipeline {
    settings: Settings,
    source: VideoSource,
    fetcher: Box<dyn AudioFetcher>,
    transcriber: Box<dyn Transcriber>,
    summarizer: Summarizer,
    synthesizer: SpeechSynthesizer,
}

impl Pipeline {
    /// Create a new pipeline with production collaborators.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcriber = Box::new(WhisperTranscriber::new(
            &settings.transcription.model,
            settings.transcription.language.as_deref(),
        ));

        let summarizer = Summarizer::new(
            &settings.summary.model,
            settings.summary.temperature,
            prompts,
        );

        let engine = Box::new(OpenAiSpeechEngine::new(
            &settings.speech.model,
            &settings.speech.voice,
        ));

        Ok(Self::with_components(
            settings,
            Box::new(YtDlpFetcher),
            transcriber,
            summarizer,
            engine,
        ))
    }

    /// Create a pipeline with substituted collaborators.
    pub fn with_components(
        settings: Settings,
        fetcher: Box<dyn AudioFetcher>,
        transcriber: Box<dyn Transcriber>,
        summarizer: Summarizer,
        engine: Box<dyn SpeechEngine>,
    ) -> Self {
        let chunk_chars = settings.speech.chunk_chars;
        Self {
            settings,
            source: VideoSource::new(),
            fetcher,
            transcriber,
            summarizer,
            synthesizer: SpeechSynthesizer::new(engine, chunk_chars),
        }
    }

    /// Run the full pipeline for one video URL.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn run(&self, url: &str) -> Result<PipelineResult> {
        let video_id = self.source.resolve(url)?;
        info!("Processing video {}", video_id);

        let output_dir = self.settings.output_dir();
        std::fs::create_dir_all(&output_dir)?;

        // Stage 1: acquisition
        let spinner = Output::spinner("Downloading audio...");
        let fetched = self
            .fetcher
            .fetch(url, &video_id, &self.settings.download_dir())
            .await;
        spinner.finish_and_clear();
        let audio_path = fetched?;

        // Stage 2: transcription (persists <video_id>_transcript.json)
        let spinner = Output::spinner("Transcribing full audio...");
        let transcribed =
            transcribe_audio(self.transcriber.as_ref(), &audio_path, &video_id, &output_dir)
                .await;
        spinner.finish_and_clear();
        let transcript_text = transcribed?;

        // Stage 3: summarization
        info!("Generating multi-part summary");
        let summary = self
            .summarizer
            .summarize(&transcript_text, self.settings.summary.target_parts)
            .await?;

        // Stage 4: speech synthesis
        info!("Generating summary voice audio");
        let output_path = output_dir.join(format!("{}_robot_summary.mp3", video_id));
        self.synthesizer
            .synthesize_summary(&summary, &output_path)
            .await?;

        Ok(PipelineResult {
            video_id,
            audio_path,
            output_path,
            summary,
        })
    }
}

/// Truncate text to a character-safe preview of at most `max_chars`.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}\n...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FortellError;
    use crate::summary::ChatCompleter;
    use crate::transcription::{Segment, Transcript};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubFetcher;

    #[async_trait]
    impl AudioFetcher for StubFetcher {
        async fn fetch(&self, _url: &str, video_id: &str, output_dir: &Path) -> Result<PathBuf> {
            std::fs::create_dir_all(output_dir)?;
            let path = output_dir.join(format!("{}.mp3", video_id));
            std::fs::write(&path, b"mp3")?;
            Ok(path)
        }
    }

    struct StubTranscriber(String);

    #[async_trait]
    impl Transcriber for StubTranscriber {
        async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript> {
            Ok(Transcript {
                text: self.0.clone(),
                segments: vec![Segment {
                    start: 0.0,
                    end: 1.0,
                    text: self.0.clone(),
                }],
                language: "en".to_string(),
            })
        }
    }

    struct SeqCompleter {
        responses: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatCompleter for SeqCompleter {
        async fn complete(&self, _system: &str, _user: &str, _temperature: f32) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.responses[call].to_string())
        }
    }

    struct StubEngine;

    #[async_trait]
    impl SpeechEngine for StubEngine {
        async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
            if text.is_empty() {
                return Err(FortellError::SpeechSynthesis("empty chunk".to_string()));
            }
            std::fs::write(output_path, format!("<{}>", text.chars().count()))?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_pipeline_threads_stages_end_to_end() {
        let download_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();

        let mut settings = Settings::default();
        settings.general.download_dir = download_dir.path().to_string_lossy().to_string();
        settings.general.output_dir = output_dir.path().to_string_lossy().to_string();
        settings.summary.target_parts = 3;

        let summarizer = Summarizer::with_completer(
            Box::new(SeqCompleter {
                responses: vec!["A", " B ", "C"],
                calls: AtomicUsize::new(0),
            }),
            0.5,
            Prompts::default(),
        );

        // 300 words -> step 100 -> exactly 3 completion requests
        let transcript_text = vec!["a"; 300].join(" ");
        let pipeline = Pipeline::with_components(
            settings,
            Box::new(StubFetcher),
            Box::new(StubTranscriber(transcript_text)),
            summarizer,
            Box::new(StubEngine),
        );

        let result = pipeline.run("https://youtu.be/2SRVN9f25v4").await.unwrap();

        // Video ID names every artifact
        assert_eq!(result.video_id, "2SRVN9f25v4");
        assert_eq!(
            result.audio_path,
            download_dir.path().join("2SRVN9f25v4.mp3")
        );
        assert!(output_dir
            .path()
            .join("2SRVN9f25v4_transcript.json")
            .exists());
        assert_eq!(
            result.output_path,
            output_dir.path().join("2SRVN9f25v4_robot_summary.mp3")
        );

        // Responses joined in order, trimmed, blank-line separated
        assert_eq!(result.summary, "A\n\nB\n\nC\n\n");

        // One synthesis chunk for a 9-char summary
        let audio = std::fs::read_to_string(&result.output_path).unwrap();
        assert_eq!(audio, "<9>");
    }

    #[tokio::test]
    async fn test_pipeline_rejects_unrecognizable_url() {
        let settings = Settings::default();
        let summarizer = Summarizer::with_completer(
            Box::new(SeqCompleter {
                responses: vec![],
                calls: AtomicUsize::new(0),
            }),
            0.5,
            Prompts::default(),
        );
        let pipeline = Pipeline::with_components(
            settings,
            Box::new(StubFetcher),
            Box::new(StubTranscriber(String::new())),
            summarizer,
            Box::new(StubEngine),
        );

        assert!(pipeline.run("https://example.com/watch").await.is_err());
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("hello", 500), "hello");
    }

    #[test]
    fn test_preview_truncates_at_char_boundary() {
        let text = "é".repeat(600);
        let p = preview(&text, 500);
        assert!(p.starts_with(&"é".repeat(500)));
        assert!(p.ends_with("..."));
    }
}
