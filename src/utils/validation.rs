use crate::domain::model::VersionSpec;
use crate::utils::error::{Result, StubError};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(StubError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(StubError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StubError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_member_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;

    // Replaced members sit at the archive root, like python.exe does.
    if name.contains('/') || name.contains('\\') {
        return Err(StubError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Member name cannot contain path separators".to_string(),
        });
    }

    if name.contains('\0') {
        return Err(StubError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Member name contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_runtime_extension(field_name: &str, path: &str) -> Result<()> {
    if !path.ends_with(".runtime") {
        return Err(StubError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Expected a .runtime archive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_version_string(field_name: &str, value: &str) -> Result<()> {
    VersionSpec::from_string(value).map_err(|e| StubError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
