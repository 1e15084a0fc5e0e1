//! Speech synthesis.
//!
//! The summary is synthesized in fixed-size character chunks because TTS
//! engines cap their input length. Each chunk goes through a temporary file
//! that is removed before the next iteration, success or not. A failed chunk
//! is logged and skipped; this is the only stage that tolerates partial
//! failure.

use crate::error::{FortellError, Result};
use crate::openai::create_client;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, Voice};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Default maximum characters per synthesis request.
pub const DEFAULT_CHUNK_CHARS: usize = 4000;

/// Split text into fixed-size character chunks, preserving order.
pub fn chunk_text(text: &str, chunk_chars: usize) -> Vec<String> {
    if chunk_chars == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_chars)
        .map(|c| c.iter().collect())
        .collect()
}

/// Trait for text-to-speech engines.
///
/// Implementations synthesize one bounded piece of text to an audio file;
/// batching and merging are the caller's concern.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Synthesize `text` to an MP3 file at `output_path`.
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()>;
}

/// OpenAI TTS-based speech engine.
pub struct OpenAiSpeechEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
}

impl OpenAiSpeechEngine {
    /// Create a new engine with the given model and voice names.
    pub fn new(model: &str, voice: &str) -> Self {
        let model = match model {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        };

        let voice = match voice {
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy,
        };

        Self {
            client: create_client(),
            model,
            voice,
        }
    }
}

#[async_trait]
impl SpeechEngine for OpenAiSpeechEngine {
    async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.model.clone())
            .voice(self.voice.clone())
            .build()
            .map_err(|e| FortellError::SpeechSynthesis(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| FortellError::OpenAI(format!("TTS API error: {}", e)))?;

        response
            .save(output_path)
            .await
            .map_err(|e| FortellError::SpeechSynthesis(format!("Failed to save audio: {}", e)))?;

        Ok(())
    }
}

/// Synthesizes a summary into one concatenated audio file.
pub struct SpeechSynthesizer {
    engine: Box<dyn SpeechEngine>,
    chunk_chars: usize,
}

impl SpeechSynthesizer {
    /// Create a new synthesizer around a speech engine.
    pub fn new(engine: Box<dyn SpeechEngine>, chunk_chars: usize) -> Self {
        Self {
            engine,
            chunk_chars,
        }
    }

    /// Synthesize `summary` and export the concatenated audio to `output_path`.
    ///
    /// Chunks are processed strictly in order. A chunk that fails to
    /// synthesize is logged and omitted from the output; the remaining chunks
    /// still contribute. If every chunk fails the exported file is empty.
    #[instrument(skip(self, summary), fields(chars = summary.len()))]
    pub async fn synthesize_summary(&self, summary: &str, output_path: &Path) -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        self.synthesize_with_temp_dir(summary, output_path, temp_dir.path())
            .await
    }

    /// Same as [`synthesize_summary`](Self::synthesize_summary) but with an
    /// explicit directory for the per-chunk temporary files.
    pub async fn synthesize_with_temp_dir(
        &self,
        summary: &str,
        output_path: &Path,
        temp_dir: &Path,
    ) -> Result<()> {
        let chunks = chunk_text(summary, self.chunk_chars);
        info!("Synthesizing {} speech chunks", chunks.len());

        let pb = ProgressBar::new(chunks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Speech    [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("█▓░"),
        );

        // MP3 frames with identical codec parameters concatenate cleanly, so
        // the accumulating buffer is a byte-level join of the chunk files.
        let mut final_audio: Vec<u8> = Vec::new();

        for (i, chunk) in chunks.iter().enumerate() {
            let temp_path = temp_dir.join(format!("temp_chunk_{}.mp3", i));

            match self.synthesize_chunk(chunk, &temp_path).await {
                Ok(bytes) => final_audio.extend_from_slice(&bytes),
                Err(e) => warn!("Failed to generate chunk {}: {}", i, e),
            }

            // The temp file never outlives its iteration
            if temp_path.exists() {
                std::fs::remove_file(&temp_path)?;
            }

            pb.inc(1);
        }

        pb.finish_and_clear();

        std::fs::write(output_path, &final_audio)?;
        info!("Summary audio saved to {}", output_path.display());

        Ok(())
    }

    /// Synthesize one chunk through its temp file and return the audio bytes.
    async fn synthesize_chunk(&self, chunk: &str, temp_path: &Path) -> Result<Vec<u8>> {
        self.engine.synthesize(chunk, temp_path).await?;
        let bytes = std::fs::read(temp_path)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine that writes a recognizable payload per call, failing on
    /// configured call indices.
    struct ScriptedEngine {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
    }

    impl ScriptedEngine {
        fn new(fail_on: Vec<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl SpeechEngine for ScriptedEngine {
        async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.contains(&call) {
                return Err(FortellError::SpeechSynthesis(format!(
                    "scripted failure on chunk {}",
                    call
                )));
            }
            let payload = format!("[{}:{}]", call, text.chars().count());
            std::fs::write(output_path, payload.as_bytes())?;
            Ok(())
        }
    }

    #[test]
    fn test_chunk_text_exact_boundary() {
        let text = "x".repeat(8000);
        let chunks = chunk_text(&text, 4000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 4000);
        assert_eq!(chunks[1].chars().count(), 4000);
    }

    #[test]
    fn test_chunk_text_with_remainder() {
        let text = "x".repeat(4500);
        let chunks = chunk_text(&text, 4000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 4000);
        assert_eq!(chunks[1].chars().count(), 500);
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("", 4000).is_empty());
    }

    #[test]
    fn test_chunk_text_preserves_order() {
        let text = "abcdef";
        let chunks = chunk_text(text, 2);
        assert_eq!(chunks, vec!["ab", "cd", "ef"]);
    }

    #[tokio::test]
    async fn test_all_chunks_concatenated_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp3");

        let synthesizer = SpeechSynthesizer::new(Box::new(ScriptedEngine::new(vec![])), 4000);
        let summary = "a".repeat(4500);
        synthesizer
            .synthesize_with_temp_dir(&summary, &output, temp.path())
            .await
            .unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(content, "[0:4000][1:500]");
    }

    #[tokio::test]
    async fn test_failed_chunk_is_skipped_and_temp_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp3");

        // Chunk 1 fails; chunks 0 and 2 still contribute, in order
        let synthesizer = SpeechSynthesizer::new(Box::new(ScriptedEngine::new(vec![1])), 4000);
        let summary = "a".repeat(9000);
        synthesizer
            .synthesize_with_temp_dir(&summary, &output, temp.path())
            .await
            .unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(content, "[0:4000][2:1000]");

        // No temp files remain, failed or not
        let leftovers: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_all_chunks_failing_exports_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp3");

        let synthesizer = SpeechSynthesizer::new(Box::new(ScriptedEngine::new(vec![0, 1])), 4000);
        let summary = "a".repeat(4500);
        synthesizer
            .synthesize_with_temp_dir(&summary, &output, temp.path())
            .await
            .unwrap();

        assert!(output.exists());
        assert_eq!(std::fs::metadata(&output).unwrap().len(), 0);
    }
}
