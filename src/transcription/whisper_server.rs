//! whisper.cpp server transcription (SRT response).

use super::srt::parse_srt;
use super::{RawTranscript, Transcriber};
use crate::client::http_client;
use crate::config::{TranscriptionBackend, TranscriptionSettings};
use crate::error::{status_error, Result};
use crate::media::mime_type;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};

/// Local inference on long files can take a while.
const INFERENCE_TIMEOUT: Duration = Duration::from_secs(3600);

pub struct WhisperServerTranscriber {
    client: reqwest::Client,
    url: String,
}

impl WhisperServerTranscriber {
    pub fn new(settings: &TranscriptionSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings.request_timeout())?,
            url: settings.whisper_server_url.clone(),
        })
    }

    async fn form(path: &Path) -> Result<Form> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(ReaderStream::new(file)), len)
            .file_name(file_name)
            .mime_str(mime_type(path))?;

        Ok(Form::new()
            .part("file", part)
            .text("temperature", "0.0")
            .text("temperature_inc", "0.2")
            .text("response_format", "srt"))
    }
}

#[async_trait]
impl Transcriber for WhisperServerTranscriber {
    #[instrument(skip(self), fields(path = %media_path.display()))]
    async fn transcribe(&self, media_path: &Path) -> Result<RawTranscript> {
        let response = self
            .client
            .post(&self.url)
            .timeout(INFERENCE_TIMEOUT)
            .multipart(Self::form(media_path).await?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error("whisper", status, &body));
        }
        debug!("whisper returned {} bytes of SRT", body.len());

        let utterances = parse_srt(&body);
        info!("whisper returned {} captions", utterances.len());
        Ok(RawTranscript {
            utterances,
            timing_approximate: true,
        })
    }

    fn backend(&self) -> TranscriptionBackend {
        TranscriptionBackend::Whisper
    }
}
