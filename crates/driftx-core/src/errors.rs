use driftx_core_types::RunId;
use thiserror::Error;

/// Result type alias using DriftXError
pub type Result<T> = std::result::Result<T, DriftXError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure that aborts a digest, generate or check run maps to exactly
/// one kind. Each kind carries a stable code usable for programmatic
/// handling, tests, and CLI output. Per-entry drift is not an error and has
/// no kind; it is reported through `CheckStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Digest Core
    UnsupportedAlgorithm,
    /// A non-cryptographic algorithm was requested without explicit opt-in
    AlgorithmNotPermitted,
    /// A byte source could not be fully consumed; no partial digest exists
    SourceRead,
    InvalidEncoding,

    // Manifest Engine
    DuplicateId,
    ManifestNotFound,
    ManifestParse,

    // Input
    InvalidInput,
    Config,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    /// Another writer holds the manifest location
    Concurrency,
    Cancelled,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnsupportedAlgorithm => "ERR_UNSUPPORTED_ALGORITHM",
            ExErrorKind::AlgorithmNotPermitted => "ERR_ALGORITHM_NOT_PERMITTED",
            ExErrorKind::SourceRead => "ERR_SOURCE_READ",
            ExErrorKind::InvalidEncoding => "ERR_INVALID_ENCODING",
            ExErrorKind::DuplicateId => "ERR_DUPLICATE_ID",
            ExErrorKind::ManifestNotFound => "ERR_MANIFEST_NOT_FOUND",
            ExErrorKind::ManifestParse => "ERR_MANIFEST_PARSE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether this kind aborts a whole run before any report can be built
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ExErrorKind::ManifestNotFound
                | ExErrorKind::ManifestParse
                | ExErrorKind::UnsupportedAlgorithm
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus optional
/// context (operation, artifact, path, manifest line, run) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    artifact_id: Option<String>,
    path: Option<String>,
    line: Option<usize>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            artifact_id: None,
            path: None,
            line: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add artifact ID context
    pub fn with_artifact_id(mut self, id: impl Into<String>) -> Self {
        self.artifact_id = Some(id.into());
        self
    }

    /// Add filesystem path or store location context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add manifest line context
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
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
        if let Some(artifact_id) = &self.artifact_id {
            write!(f, " (artifact_id: {})", artifact_id)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(line) = self.line {
            write!(f, " (line: {})", line)?;
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

/// Domain error taxonomy for digesting and manifest handling
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriftXError {
    // ===== Digest Core =====
    /// Algorithm token is not one of the known digest families
    #[error("Unsupported digest algorithm: {token}")]
    UnsupportedAlgorithm { token: String },

    /// CRC32 (or another integrity-only algorithm) requested without opt-in
    #[error("Algorithm {algorithm} is not cryptographic and was not explicitly permitted")]
    AlgorithmNotPermitted { algorithm: String },

    /// The byte source failed before it was fully consumed
    #[error("Failed to read source {origin}: {message}")]
    SourceRead { origin: String, message: String },

    /// Encoded digest text could not be decoded
    #[error("Invalid {encoding} digest encoding: {reason}")]
    InvalidEncoding { encoding: String, reason: String },

    /// Decoded digest width does not match the algorithm
    #[error("Digest length mismatch for {algorithm}: expected {expected} bytes, got {actual}")]
    DigestLength {
        algorithm: String,
        expected: usize,
        actual: usize,
    },

    // ===== Manifest =====
    /// An id was added twice without replace intent
    #[error("Duplicate artifact id: {id}")]
    DuplicateId { id: String },

    /// Artifact id cannot be represented in the manifest format
    #[error("Invalid artifact id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    /// No manifest exists at the given location
    #[error("Manifest not found: {location}")]
    ManifestNotFound { location: String },

    /// Persisted manifest is corrupt or unreadable
    #[error("Manifest parse error at line {line}: {reason}")]
    ManifestParse { line: usize, reason: String },

    /// Persisted manifest names an algorithm this build does not know
    #[error("Unsupported digest algorithm '{token}' at manifest line {line}")]
    ManifestUnsupportedAlgorithm { token: String, line: usize },

    // ===== General =====
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Convert DriftXError to ExError
///
/// Maps the domain error taxonomy to the canonical error kinds while
/// preserving the structured context fields.
impl From<DriftXError> for ExError {
    fn from(err: DriftXError) -> Self {
        match err {
            DriftXError::UnsupportedAlgorithm { token } => {
                ExError::new(ExErrorKind::UnsupportedAlgorithm)
                    .with_message(format!("Unsupported digest algorithm: {}", token))
            }

            DriftXError::AlgorithmNotPermitted { algorithm } => {
                ExError::new(ExErrorKind::AlgorithmNotPermitted).with_message(format!(
                    "{} is not cryptographic; enable allow_non_cryptographic to use it",
                    algorithm
                ))
            }

            DriftXError::SourceRead { origin, message } => ExError::new(ExErrorKind::SourceRead)
                .with_path(origin)
                .with_message(message),

            DriftXError::InvalidEncoding { encoding, reason } => {
                ExError::new(ExErrorKind::InvalidEncoding)
                    .with_message(format!("Invalid {} encoding: {}", encoding, reason))
            }

            DriftXError::DigestLength {
                algorithm,
                expected,
                actual,
            } => ExError::new(ExErrorKind::InvalidEncoding).with_message(format!(
                "{} digest must be {} bytes, got {}",
                algorithm, expected, actual
            )),

            DriftXError::DuplicateId { id } => ExError::new(ExErrorKind::DuplicateId)
                .with_artifact_id(id)
                .with_message("Artifact id appears more than once"),

            DriftXError::InvalidId { id, reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_artifact_id(id)
                .with_message(format!("Invalid artifact id: {}", reason)),

            DriftXError::ManifestNotFound { location } => {
                ExError::new(ExErrorKind::ManifestNotFound)
                    .with_path(location)
                    .with_message("No manifest at location")
            }

            DriftXError::ManifestParse { line, reason } => {
                ExError::new(ExErrorKind::ManifestParse)
                    .with_line(line)
                    .with_message(reason)
            }

            DriftXError::ManifestUnsupportedAlgorithm { token, line } => {
                ExError::new(ExErrorKind::UnsupportedAlgorithm)
                    .with_line(line)
                    .with_message(format!("Unsupported digest algorithm: {}", token))
            }

            DriftXError::InvalidInput { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }

            DriftXError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            DriftXError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to DriftXError
impl From<serde_json::Error> for DriftXError {
    fn from(err: serde_json::Error) -> Self {
        DriftXError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_kinds() {
        assert!(ExErrorKind::ManifestNotFound.is_precondition());
        assert!(ExErrorKind::ManifestParse.is_precondition());
        assert!(ExErrorKind::UnsupportedAlgorithm.is_precondition());
        assert!(!ExErrorKind::SourceRead.is_precondition());
        assert!(!ExErrorKind::DuplicateId.is_precondition());
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = ExError::new(ExErrorKind::ManifestParse)
            .with_op("load_manifest")
            .with_line(3)
            .with_message("expected 4 fields");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_MANIFEST_PARSE]"));
        assert!(rendered.contains("load_manifest"));
        assert!(rendered.contains("(line: 3)"));
    }

    #[test]
    fn test_source_chain() {
        let inner = ExError::new(ExErrorKind::Io).with_message("disk full");
        let outer = ExError::new(ExErrorKind::Persistence).with_source(inner);
        let source = std::error::Error::source(&outer).expect("source should be set");
        assert!(source.to_string().contains("disk full"));
        assert_eq!(outer.source_error().map(|e| e.kind()), Some(ExErrorKind::Io));
    }

    #[test]
    fn test_manifest_unsupported_algorithm_maps_to_unsupported_kind() {
        let err: ExError = DriftXError::ManifestUnsupportedAlgorithm {
            token: "whirlpool".to_string(),
            line: 2,
        }
        .into();
        assert_eq!(err.kind(), ExErrorKind::UnsupportedAlgorithm);
        assert_eq!(err.line(), Some(2));
    }
}
