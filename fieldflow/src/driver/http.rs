//! Reqwest-backed operation submitter.

use async_trait::async_trait;

use crate::core::{Operation, OperationOutcome, OperationResponse};

use super::OperationSubmitter;

/// Submits operations as HTTP GET requests.
///
/// Transport errors become `Failure` outcomes; any received response,
/// success or not, becomes a `Success` outcome and is classified by the
/// engine. Retry and timeout policy belong to the configured client.
#[derive(Debug, Clone, Default)]
pub struct HttpSubmitter {
    client: reqwest::Client,
}

impl HttpSubmitter {
    /// Creates a submitter with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a submitter over a preconfigured client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationSubmitter for HttpSubmitter {
    async fn submit(&self, operation: &Operation) -> OperationOutcome {
        let mut request = self.client.get(&operation.url).query(&operation.query);
        for (key, value) in &operation.headers {
            request = request.header(key, value);
        }
        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => OperationOutcome::Success(OperationResponse {
                        status,
                        body,
                        url: operation.url.clone(),
                    }),
                    Err(e) => OperationOutcome::Failure(format!("reading response body: {e}")),
                }
            }
            Err(e) => OperationOutcome::Failure(e.to_string()),
        }
    }
}
