//! Speech-to-text transcription.
//!
//! The audio file is transcribed in a single call; the model handles long-form
//! audio internally, so there is no chunking at this stage. The full structured
//! result is persisted as a side artifact next to the transcript text the rest
//! of the pipeline consumes.

use crate::error::{FortellError, Result};
use crate::openai::create_client;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// A single transcript segment with timestamp information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Transcribed text content.
    pub text: String,
}

/// A complete transcript: full text plus timestamped segments and language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Full transcript text.
    pub text: String,
    /// Individual segments with timestamps.
    pub segments: Vec<Segment>,
    /// Detected language.
    pub language: String,
}

impl Transcript {
    /// Persist the transcript as indented JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into text, segments, and detected language.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: Option<String>,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber.
    ///
    /// `model` selects the accuracy/speed tier; `language` is an optional hint
    /// passed through to the model.
    pub fn new(model: &str, language: Option<&str>) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            language: language.map(|s| s.to_string()),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        info!("Transcribing full audio with {}", self.model);

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| FortellError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| FortellError::OpenAI(format!("Whisper API error: {}", e)))?;

        let segments: Vec<Segment> = response
            .segments
            .map(|segs| {
                segs.iter()
                    .map(|s| Segment {
                        start: s.start as f64,
                        end: s.end as f64,
                        text: s.text.trim().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_else(|| {
                // Fallback: single segment covering the full duration
                vec![Segment {
                    start: 0.0,
                    end: response.duration as f64,
                    text: response.text.trim().to_string(),
                }]
            });

        debug!("Transcribed {} segments", segments.len());

        Ok(Transcript {
            text: response.text,
            segments,
            language: response.language,
        })
    }
}

/// Transcribe an audio file and persist the structured result.
///
/// Writes `<video_id>_transcript.json` into `output_dir` and returns the full
/// transcript text for downstream stages. The JSON file is a side artifact;
/// nothing reads it back in-process.
pub async fn transcribe_audio(
    transcriber: &dyn Transcriber,
    audio_path: &Path,
    video_id: &str,
    output_dir: &Path,
) -> Result<String> {
    let transcript = transcriber.transcribe(audio_path).await?;

    let transcript_path = output_dir.join(format!("{}_transcript.json", video_id));
    transcript.save(&transcript_path)?;
    info!("Transcript saved to {}", transcript_path.display());

    Ok(transcript.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTranscriber(Transcript);

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript> {
            Ok(self.0.clone())
        }
    }

    fn sample_transcript() -> Transcript {
        Transcript {
            text: "hello world".to_string(),
            segments: vec![
                Segment { start: 0.0, end: 1.5, text: "hello".to_string() },
                Segment { start: 1.5, end: 3.0, text: "world".to_string() },
            ],
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_transcript_json_schema() {
        let transcript = sample_transcript();
        let json = serde_json::to_string_pretty(&transcript).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["text"], "hello world");
        assert_eq!(value["language"], "en");
        assert_eq!(value["segments"].as_array().unwrap().len(), 2);
        assert_eq!(value["segments"][0]["start"], 0.0);
        assert_eq!(value["segments"][1]["text"], "world");
    }

    #[tokio::test]
    async fn test_transcribe_audio_persists_and_returns_text() {
        let dir = tempfile::tempdir().unwrap();
        let transcriber = FixedTranscriber(sample_transcript());

        let text = transcribe_audio(
            &transcriber,
            Path::new("unused.mp3"),
            "abc123def45",
            dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(text, "hello world");

        let transcript_path = dir.path().join("abc123def45_transcript.json");
        assert!(transcript_path.exists());

        // Persisted file is indented JSON with the expected fields
        let content = std::fs::read_to_string(&transcript_path).unwrap();
        assert!(content.contains("\n  \"text\""));
        let parsed: Transcript = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.language, "en");
    }
}
