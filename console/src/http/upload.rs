//! Bundle upload with progress

use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tracing::{debug, error, info};

use crate::deploy::naming::AppName;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::http::progress::{ProgressSender, ProgressTracker};
use crate::http::response::interpret_deploy;
use crate::models::bundle::StagedFile;
use crate::models::deploy::{DeployOptions, DeployResult};

/// Message for uploads that never got a response
const CONNECTIVITY_FAILURE: &str = "network error, the publishing service could not be reached";

impl HttpClient {
    /// Upload a bundle to `POST /api/apps/{name}/deploy`
    ///
    /// Resolves exactly once. Progress is reported on `progress` as the file
    /// part is handed to the transport.
    pub async fn deploy_bundle(
        &self,
        name: &AppName,
        bundle: &StagedFile,
        options: DeployOptions,
        progress: ProgressSender,
    ) -> Result<DeployResult, ConsoleError> {
        let url = self.endpoint(&["api", "apps", name.as_str(), "deploy"])?;
        let total = bundle.size_bytes;
        let chunks = bundle.source.chunks(self.chunk_size).await?;

        let tracker = Arc::new(ProgressTracker::new(progress, total));
        let part = Part::stream_with_length(Self::tracked_body(chunks, tracker.clone()), total)
            .file_name(bundle.name.clone())
            .mime_str("application/zip")?;
        let form = Form::new()
            .part("file", part)
            .text("clean", options.clean_field());

        debug!("POST {} ({} bytes, clean={})", url, total, options.clean);
        tracker.start();

        let response = match self.client.post(url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Upload of {} failed without a response: {}", bundle.name, e);
                return Err(ConsoleError::UploadTransportFailure(
                    CONNECTIVITY_FAILURE.to_string(),
                ));
            }
        };
        tracker.finish();

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                error!("Unable to read deploy response body ({}): {}", status, e);
                Default::default()
            }
        };

        let outcome = interpret_deploy(status, &body);
        match &outcome {
            Ok(result) => info!("Deployed {}: {} files at {}", name, result.uploaded, result.url),
            Err(e) => error!("Deploy of {} failed ({}): {}", name, status, e),
        }
        outcome
    }

    /// Count each chunk as sent when the transport pulls it
    fn tracked_body(
        chunks: BoxStream<'static, std::io::Result<Bytes>>,
        tracker: Arc<ProgressTracker>,
    ) -> Body {
        let body = chunks.map(move |chunk| {
            if let Ok(chunk) = &chunk {
                tracker.advance(chunk.len() as u64);
            }
            chunk
        });

        Body::wrap_stream(body)
    }
}
