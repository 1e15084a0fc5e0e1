//! Run command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{preview, Pipeline};
use anyhow::Result;

/// How many characters of the summary to show on the console.
const SUMMARY_PREVIEW_CHARS: usize = 500;

/// Run the full pipeline command.
pub async fn run_pipeline(
    url: &str,
    parts: Option<usize>,
    output_dir: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Run) {
        Output::error(&format!("{}", e));
        Output::info("Run 'fortell doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    // CLI overrides
    if let Some(parts) = parts {
        settings.summary.target_parts = parts;
    }
    if let Some(dir) = output_dir {
        settings.general.output_dir = dir;
    }

    Output::info(&format!("Processing: {}", url));

    let pipeline = Pipeline::new(settings)?;

    match pipeline.run(url).await {
        Ok(result) => {
            Output::header("Summary");
            println!("{}", preview(&result.summary, SUMMARY_PREVIEW_CHARS));
            println!();
            Output::success(&format!(
                "Full summary audio saved to: {}",
                result.output_path.display()
            ));
            Output::kv("Video ID", &result.video_id);
            Output::kv("Source audio", &result.audio_path.display().to_string());
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to process: {}", e));
            Err(e.into())
        }
    }
}
