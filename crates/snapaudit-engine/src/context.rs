//! Per-invocation context

use snapaudit_core::errors::ExError;
use snapaudit_core_types::{RequestContext, RequestId, TraceId};

/// Correlation data for one engine invocation
#[derive(Debug, Clone, Default)]
pub struct EngineContext {
    pub request: RequestContext,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an identifier from the caller (bot update id, job run id)
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request: RequestContext::with_request_id(request_id),
        }
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.request = self.request.with_trace_id(trace_id);
        self
    }

    /// Attach this context's correlation ids to an error
    pub fn annotate(&self, err: ExError) -> ExError {
        let err = err.with_request_id(self.request.request_id.clone());
        match &self.request.trace_id {
            Some(trace_id) => err.with_trace_id(trace_id.clone()),
            None => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapaudit_core::errors::ExErrorKind;

    #[test]
    fn test_annotate_sets_correlation_ids() {
        let ctx = EngineContext::with_request_id(RequestId::from_string("job-1".to_string()))
            .with_trace_id(TraceId::from_string("t-1".to_string()));
        let err = ctx.annotate(ExError::new(ExErrorKind::NotFound));
        assert_eq!(err.request_id().map(|r| r.as_str()), Some("job-1"));
        assert_eq!(err.trace_id().map(|t| t.as_str()), Some("t-1"));
    }
}
