//! AssemblyAI transcription with speaker labels.

use super::poll::{poll_until_done, JobStatus};
use super::{RawTranscript, RawUtterance, Transcriber};
use crate::client::http_client;
use crate::config::{TranscriptionBackend, TranscriptionSettings};
use crate::error::{status_error, Result, TekstError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};

/// Upper bound for a single upload.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(3600);

/// Upper bound for a job to finish once submitted.
const MAX_JOB_WAIT: Duration = Duration::from_secs(3 * 3600);

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptJob {
    id: String,
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    utterances: Option<Vec<RawUtterance>>,
}

impl TranscriptJob {
    fn into_status(self) -> JobStatus<Vec<RawUtterance>> {
        match self.status.as_str() {
            "completed" => JobStatus::Completed(self.utterances.unwrap_or_default()),
            "error" => JobStatus::Failed(
                self.error
                    .unwrap_or_else(|| format!("transcript {} failed", self.id)),
            ),
            _ => JobStatus::Pending(self.status),
        }
    }
}

pub struct AssemblyAiTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
}

impl AssemblyAiTranscriber {
    pub fn new(settings: &TranscriptionSettings, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: http_client(settings.request_timeout())?,
            base_url: settings.assemblyai_base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            poll_interval: settings.poll_interval(),
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error("assemblyai", status, &body))
    }

    async fn parse<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| TekstError::MalformedBackendResponse(format!("assemblyai: {}", e)))
    }

    /// Stream the file to the upload endpoint and return its private URL.
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn upload(&self, path: &Path) -> Result<String> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        debug!("Uploading {} bytes", len);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .header("authorization", &self.api_key)
            .header(reqwest::header::CONTENT_LENGTH, len)
            .timeout(UPLOAD_TIMEOUT)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let upload: UploadResponse = Self::parse(response).await?;
        Ok(upload.upload_url)
    }

    async fn submit(&self, audio_url: &str) -> Result<TranscriptJob> {
        let response = self
            .client
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&json!({ "audio_url": audio_url, "speaker_labels": true }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn fetch(&self, id: &str) -> Result<TranscriptJob> {
        let response = self
            .client
            .get(format!("{}/transcript/{}", self.base_url, id))
            .header("authorization", &self.api_key)
            .send()
            .await?;
        Self::parse(response).await
    }
}

#[async_trait]
impl Transcriber for AssemblyAiTranscriber {
    #[instrument(skip(self), fields(path = %media_path.display()))]
    async fn transcribe(&self, media_path: &Path) -> Result<RawTranscript> {
        let audio_url = self.upload(media_path).await?;
        let job = self.submit(&audio_url).await?;
        info!("Submitted AssemblyAI transcript {}", job.id);

        let id = job.id.as_str();
        let utterances = poll_until_done("assemblyai", self.poll_interval, MAX_JOB_WAIT, || async move {
            Ok::<_, TekstError>(self.fetch(id).await?.into_status())
        })
        .await?;

        info!("AssemblyAI returned {} utterances", utterances.len());
        Ok(RawTranscript {
            utterances,
            timing_approximate: false,
        })
    }

    fn backend(&self) -> TranscriptionBackend {
        TranscriptionBackend::AssemblyAi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(body: &str) -> TranscriptJob {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_job_states() {
        assert_eq!(
            job(r#"{"id":"t1","status":"queued"}"#).into_status(),
            JobStatus::Pending("queued".into())
        );
        assert_eq!(
            job(r#"{"id":"t1","status":"error","error":"file does not appear to contain audio"}"#)
                .into_status(),
            JobStatus::Failed("file does not appear to contain audio".into())
        );
    }

    #[test]
    fn test_completed_job_carries_utterances() {
        let completed = job(
            r#"{"id":"t1","status":"completed","text":"Hi. Bye.","utterances":[
                {"speaker":"A","start":10,"end":500,"text":"Hi.","confidence":0.9,
                 "words":[{"text":"Hi.","start":10,"end":500,"speaker":"A"}]},
                {"speaker":"B","start":600,"end":900,"text":"Bye.","words":[]}]}"#,
        );
        match completed.into_status() {
            JobStatus::Completed(utterances) => {
                assert_eq!(utterances.len(), 2);
                assert_eq!(utterances[1].speaker.as_deref(), Some("B"));
                assert_eq!(utterances[0].words[0].end_ms, Some(500));
            }
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_completed_without_utterances_is_empty() {
        let completed = job(r#"{"id":"t1","status":"completed","utterances":null}"#);
        assert_eq!(completed.into_status(), JobStatus::Completed(Vec::new()));
    }
}
