//! HTTP client for the remote template service.
//!
//! One `POST {base_url}/ai/templates` per call, JSON in and out. No retries:
//! a failed call is reported once and the caller decides what to do.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::studio::core::config::ServiceConfig;
use crate::studio::core::errors::StudioResult;
use crate::studio::core::template::Template;
use crate::studio::generation::error::TemplateServiceError;

/// Boxed future type for generator calls.
pub type GenerationFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Body of a generation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Requesting account.
    pub user_id: i64,
    /// What the user asked for.
    pub request_content: String,
    /// Earlier messages joined by newlines, or the empty-context sentinel.
    pub conversation_context: String,
}

/// Anything that can turn a request into a template.
pub trait TemplateGenerator: Send + Sync {
    /// Generate a template for `request`.
    ///
    /// # Errors
    /// Returns an error if the template could not be produced.
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> GenerationFuture<'a, Result<Template, TemplateServiceError>>;
}

/// reqwest-based [`TemplateGenerator`].
pub struct HttpTemplateClient {
    client: Client,
    endpoint: Url,
}

impl HttpTemplateClient {
    /// Build a client from the service configuration.
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is invalid or the client cannot be built.
    pub fn new(config: &ServiceConfig) -> StudioResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint()?,
        })
    }

    /// The URL requests are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_request(&self, request: &GenerationRequest) -> Result<Template, TemplateServiceError> {
        debug!(
            "Requesting template from {} ({} context chars)",
            self.endpoint,
            request.conversation_context.chars().count()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TemplateServiceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let template: Template = serde_json::from_slice(&body)?;
        debug!("Template service answered: {}", template.log_summary());
        Ok(template)
    }
}

impl TemplateGenerator for HttpTemplateClient {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> GenerationFuture<'a, Result<Template, TemplateServiceError>> {
        Box::pin(self.post_request(request))
    }
}
