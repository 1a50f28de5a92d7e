use snapaudit_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using AuditError
pub type Result<T> = std::result::Result<T, AuditError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (bot handlers, admin
/// routes, sync jobs) can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    NotFound,
    Deleted,
    AlreadyExists,
    ConstraintViolation,

    // Write path
    /// Another writer changed the live record between read and commit.
    /// Retryable: the caller should re-read and re-apply.
    Concurrency,
    /// The transaction could not commit. The caller must restart the whole
    /// operation from a fresh read, never just the commit.
    Persistence,

    // Integration/IO
    Serialization,
    Config,
    Io,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Deleted => "ERR_DELETED",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus enough context
/// (operation, subject, correlation ids) to debug a failed apply from logs.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the stable identifier of the subject the operation targeted
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Whether the caller may retry the whole operation from a fresh read
    pub fn is_retryable(&self) -> bool {
        self.kind == ExErrorKind::Concurrency
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (subject_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised while building or validating audited changes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    /// No live record exists and the caller did not ask for create-on-first-use
    #[error("Live record not found: {kind}/{subject_id}")]
    LiveRecordNotFound { kind: String, subject_id: String },

    /// The live record is soft-deleted; only a restore may touch it
    #[error("Live record was deleted: {kind}/{subject_id}")]
    LiveRecordDeleted { kind: String, subject_id: String },

    /// The live record moved on since the caller read it
    #[error("Version conflict on {subject_id}: expected {expected}, found {actual:?}")]
    VersionConflict {
        subject_id: String,
        expected: i64,
        actual: Option<i64>,
    },

    #[error("Invalid subject id: {reason}")]
    InvalidSubjectId { reason: String },

    #[error("Unknown change tag: {tag}")]
    UnknownChangeTag { tag: String },

    #[error("Unknown account status: {status}")]
    UnknownAccountStatus { status: String },

    /// An external profile payload could not be interpreted
    #[error("Invalid user DTO: {reason}")]
    InvalidUserDto { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<AuditError> for ExError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::LiveRecordNotFound { kind, subject_id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(subject_id)
                    .with_message(format!("No live {} record", kind))
            }

            AuditError::LiveRecordDeleted { kind, subject_id } => {
                ExError::new(ExErrorKind::Deleted)
                    .with_entity_id(subject_id)
                    .with_message(format!("Live {} record is soft-deleted", kind))
            }

            AuditError::VersionConflict {
                subject_id,
                expected,
                actual,
            } => ExError::new(ExErrorKind::Concurrency)
                .with_entity_id(subject_id)
                .with_message(match actual {
                    Some(actual) => format!("Expected version {}, found {}", expected, actual),
                    None => format!("Expected version {}, record vanished", expected),
                }),

            AuditError::InvalidSubjectId { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid subject id: {}", reason)),

            AuditError::UnknownChangeTag { tag } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Unknown change tag: {}", tag)),

            AuditError::UnknownAccountStatus { status } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_message(format!("Unknown account status: {}", status))
            }

            AuditError::InvalidUserDto { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_user_dto")
                .with_message(reason),

            AuditError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Serialization {
            message: err.to_string(),
        }
    }
}
