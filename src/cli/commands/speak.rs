//! Speak command implementation.

use crate::assist::Assistant;
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use anyhow::Result;

/// Run the speak command.
pub async fn run_speak(text: &str, output: &str, settings: Settings) -> Result<()> {
    let credentials = Credentials::resolve(&settings.credentials);
    let assistant = Assistant::from_settings(&settings, &credentials)?;

    let spinner = Output::spinner("Generating speech...");
    let audio = assistant.speak(text).await;
    spinner.finish_and_clear();
    let audio = audio?;

    tokio::fs::write(output, &audio).await?;
    Output::success(&format!("Wrote {} bytes to {}", audio.len(), output));
    Ok(())
}
