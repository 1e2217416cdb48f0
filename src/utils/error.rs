use thiserror::Error;

#[derive(Error, Debug)]
pub enum StubError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid version {version:?}: {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Invalid runtime name {name:?}: {reason}")]
    InvalidRuntimeName { name: String, reason: String },

    #[error("Line needs {needed} bytes but the buffer holds {capacity}")]
    LineOverflow { needed: usize, capacity: usize },

    #[error("No version tag found in {path}")]
    TagNotFound { path: String },

    #[error("Malformed version tag in {path}: {reason}")]
    MalformedTag { path: String, reason: String },

    #[error("Member {member:?} not found in {archive}")]
    MemberNotFound { archive: String, member: String },

    #[error("Stub version {stub} does not match runtime version {runtime}")]
    VersionMismatch { stub: String, runtime: String },
}

pub type Result<T> = std::result::Result<T, StubError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Validation,
    Archive,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StubError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StubError::MissingConfigError { .. }
            | StubError::InvalidConfigValueError { .. }
            | StubError::ConfigValidationError { .. } => ErrorCategory::Config,
            StubError::InvalidVersion { .. }
            | StubError::InvalidRuntimeName { .. }
            | StubError::TagNotFound { .. }
            | StubError::MalformedTag { .. }
            | StubError::VersionMismatch { .. } => ErrorCategory::Validation,
            StubError::ZipError(_) | StubError::MemberNotFound { .. } => ErrorCategory::Archive,
            StubError::LineOverflow { .. } | StubError::SerializationError(_) => {
                ErrorCategory::Output
            }
            StubError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Version guards can be retried with the right stub or --force.
            StubError::VersionMismatch { .. }
            | StubError::TagNotFound { .. }
            | StubError::MalformedTag { .. } => ErrorSeverity::Medium,
            StubError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            StubError::ZipError(_) => {
                "Check that the archive is a valid zip file and not truncated".to_string()
            }
            StubError::IoError(_) => {
                "Check that the path exists and the directory is writable".to_string()
            }
            StubError::SerializationError(_) => {
                "Re-run without --json to see the plain report".to_string()
            }
            StubError::MissingConfigError { field } => {
                format!("Add `{field}` to the manifest or pass the matching command line flag")
            }
            StubError::InvalidConfigValueError { field, .. } => {
                format!("Fix the `{field}` value in the manifest or on the command line")
            }
            StubError::ConfigValidationError { .. } => {
                "Check the manifest against the documented format".to_string()
            }
            StubError::InvalidVersion { .. } => {
                "Use a dotted numeric version, optionally with a +N build suffix (e.g. 2.7.9+1)"
                    .to_string()
            }
            StubError::InvalidRuntimeName { .. } => {
                "Runtime archives are named implementation-version-platform-abi.runtime"
                    .to_string()
            }
            StubError::LineOverflow { capacity, .. } => {
                format!("Rebuild the stub with a version shorter than {capacity} bytes")
            }
            StubError::TagNotFound { .. } => {
                "Only stubs built by this tool carry a version tag; pass --force to install \
                 anything else"
                    .to_string()
            }
            StubError::MalformedTag { .. } => {
                "Rebuild the stub; its version tag is damaged".to_string()
            }
            StubError::MemberNotFound { member, .. } => {
                format!("Pass --executable with the member to replace instead of {member:?}")
            }
            StubError::VersionMismatch { runtime, .. } => {
                format!(
                    "Rebuild the stub with PYSTUB_VERSION={runtime}, or pass --force to install \
                     it anyway"
                )
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StubError::ZipError(e) => format!("Archive operation failed: {e}"),
            StubError::IoError(e) => format!("File operation failed: {e}"),
            StubError::SerializationError(e) => format!("Could not format the report: {e}"),
            other => other.to_string(),
        }
    }
}
