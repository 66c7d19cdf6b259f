//! Template generation with a failure policy applied.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::studio::core::config::{FailurePolicy, ServiceConfig};
use crate::studio::core::errors::StudioResult;
use crate::studio::core::template::Template;
use crate::studio::generation::client::{GenerationRequest, HttpTemplateClient, TemplateGenerator};
use crate::studio::generation::error::TemplateServiceError;
use crate::studio::generation::fallback::fallback_template;

/// Result of one generation attempt.
#[derive(Debug)]
pub enum GenerationOutcome {
    /// The service produced the template.
    Generated(Template),
    /// The service failed and a local template was substituted.
    Fallback {
        /// The substituted template.
        template: Template,
        /// Why the service call failed.
        reason: TemplateServiceError,
    },
    /// The service failed and the policy reports it.
    Failed(TemplateServiceError),
}

impl GenerationOutcome {
    /// The template to attach, if any.
    #[must_use]
    pub fn into_template(self) -> Option<Template> {
        match self {
            Self::Generated(template) | Self::Fallback { template, .. } => Some(template),
            Self::Failed(_) => None,
        }
    }
}

/// Calls a [`TemplateGenerator`] at most once per request and applies the [`FailurePolicy`].
#[derive(Clone)]
pub struct TemplateService {
    generator: Arc<dyn TemplateGenerator>,
    policy: FailurePolicy,
    fallback_delay: Duration,
    timeout: Duration,
    user_id: i64,
}

impl TemplateService {
    /// Wrap an arbitrary generator.
    #[must_use]
    pub fn new(generator: Arc<dyn TemplateGenerator>, config: &ServiceConfig) -> Self {
        Self {
            generator,
            policy: config.failure_policy,
            fallback_delay: config.fallback_delay(),
            timeout: config.timeout,
            user_id: config.user_id,
        }
    }

    /// Service backed by the HTTP client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn http(config: &ServiceConfig) -> StudioResult<Self> {
        let client = HttpTemplateClient::new(config)?;
        debug!("Template requests go to {}", client.endpoint());
        Ok(Self::new(Arc::new(client), config))
    }

    /// Account id sent with requests.
    #[must_use]
    pub const fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Generate a template.
    ///
    /// Under [`FailurePolicy::Fallback`] this never yields
    /// [`GenerationOutcome::Failed`]: after the configured delay a locally
    /// built template is returned instead.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        match self.generator.generate(request).await {
            Ok(template) => {
                info!("Template generated: {}", template.log_summary());
                GenerationOutcome::Generated(template)
            }
            Err(reason) if reason.is_timeout() => {
                warn!("Template service timed out after {:?}", self.timeout);
                self.recover(request, reason).await
            }
            Err(reason) => {
                warn!("Template service call failed: {reason}");
                self.recover(request, reason).await
            }
        }
    }

    async fn recover(
        &self,
        request: &GenerationRequest,
        reason: TemplateServiceError,
    ) -> GenerationOutcome {
        match self.policy {
            FailurePolicy::Fallback => {
                info!("Using fallback template");
                if !self.fallback_delay.is_zero() {
                    tokio::time::sleep(self.fallback_delay).await;
                }
                let template = fallback_template(&request.request_content, request.user_id);
                GenerationOutcome::Fallback { template, reason }
            }
            FailurePolicy::Surface => GenerationOutcome::Failed(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::generation::client::GenerationFuture;
    use crate::studio::generation::fallback::{CAFE_TITLE, GENERIC_TITLE};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGenerator {
        template: Option<Template>,
        calls: AtomicUsize,
    }

    impl TemplateGenerator for StubGenerator {
        fn generate<'a>(
            &'a self,
            _request: &'a GenerationRequest,
        ) -> GenerationFuture<'a, Result<Template, TemplateServiceError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self
                .template
                .clone()
                .ok_or(TemplateServiceError::Status(503));
            Box::pin(async move { result })
        }
    }

    fn request(content: &str) -> GenerationRequest {
        GenerationRequest {
            user_id: 123,
            request_content: content.to_string(),
            conversation_context: "hi".to_string(),
        }
    }

    fn service(template: Option<Template>, policy: FailurePolicy) -> (Arc<StubGenerator>, TemplateService) {
        let stub = Arc::new(StubGenerator {
            template,
            calls: AtomicUsize::new(0),
        });
        let config = ServiceConfig {
            failure_policy: policy,
            fallback_delay_ms: 0,
            ..ServiceConfig::default()
        };
        (stub.clone(), TemplateService::new(stub, &config))
    }

    #[tokio::test]
    async fn test_success_returns_remote_template_verbatim() {
        let remote = fallback_template("remote", 9);
        let (stub, service) = service(Some(remote.clone()), FailurePolicy::Fallback);

        let outcome = service.generate(&request("카페")).await;
        assert!(matches!(&outcome, GenerationOutcome::Generated(t) if *t == remote));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_without_retry() {
        let (stub, service) = service(None, FailurePolicy::Fallback);

        let outcome = service.generate(&request("카페 주문 완료 알림 만들어줘")).await;
        match outcome {
            GenerationOutcome::Fallback { template, reason } => {
                assert_eq!(template.title, CAFE_TITLE);
                assert!(matches!(reason, TemplateServiceError::Status(503)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_surface_policy_reports_failure() {
        let (_, service) = service(None, FailurePolicy::Surface);
        let outcome = service.generate(&request("anything")).await;
        assert!(matches!(
            outcome,
            GenerationOutcome::Failed(TemplateServiceError::Status(503))
        ));
    }

    struct TimeoutGenerator;

    impl TemplateGenerator for TimeoutGenerator {
        fn generate<'a>(
            &'a self,
            _request: &'a GenerationRequest,
        ) -> GenerationFuture<'a, Result<Template, TemplateServiceError>> {
            Box::pin(async { Err(TemplateServiceError::Timeout) })
        }
    }

    #[tokio::test]
    async fn test_timeout_follows_failure_policy() {
        let config = ServiceConfig {
            failure_policy: FailurePolicy::Surface,
            fallback_delay_ms: 0,
            ..ServiceConfig::default()
        };
        let service = TemplateService::new(Arc::new(TimeoutGenerator), &config);
        let outcome = service.generate(&request("배송")).await;
        assert!(matches!(&outcome, GenerationOutcome::Failed(reason) if reason.is_timeout()));

        let config = ServiceConfig {
            failure_policy: FailurePolicy::Fallback,
            ..config
        };
        let service = TemplateService::new(Arc::new(TimeoutGenerator), &config);
        match service.generate(&request("배송")).await {
            GenerationOutcome::Fallback { reason, .. } => assert!(reason.is_timeout()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_waits_for_configured_delay() {
        let stub = Arc::new(StubGenerator {
            template: None,
            calls: AtomicUsize::new(0),
        });
        let service = TemplateService::new(stub, &ServiceConfig::default());

        let started = tokio::time::Instant::now();
        let outcome = service.generate(&request("hello")).await;
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(outcome.into_template().unwrap().title, GENERIC_TITLE);
    }
}
