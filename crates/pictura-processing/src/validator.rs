/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {name} is {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        name: String,
        size: usize,
        max: usize,
    },

    #[error("Too many files: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },
}

/// Request-level limits plus the declared MIME allowlist.
///
/// Size and count violations reject the whole request. A disallowed declared
/// type only fails the item that carries it.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    max_files: usize,
    allowed_content_types: Vec<String>,
}

/// Types that say nothing about the payload; the codec sniffs these instead.
const OPAQUE_CONTENT_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream"];

impl UploadValidator {
    pub fn new(max_file_size: usize, max_files: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            max_files,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn validate_file_size(&self, name: &str, size: usize) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                name: name.to_string(),
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    pub fn validate_file_count(&self, count: usize) -> Result<(), ValidationError> {
        if count > self.max_files {
            return Err(ValidationError::TooManyFiles {
                count,
                max: self.max_files,
            });
        }
        Ok(())
    }

    /// Parameters such as `; charset=` are ignored.
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if normalized.is_empty() || OPAQUE_CONTENT_TYPES.contains(&normalized.as_str()) {
            return Ok(());
        }

        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> UploadValidator {
        UploadValidator::new(
            1024 * 1024, // 1MB
            3,
            vec!["image/jpeg".to_string(), "image/PNG".to_string()],
        )
    }

    #[test]
    fn test_validate_file_size() {
        let validator = test_validator();
        assert!(validator.validate_file_size("a.png", 512 * 1024).is_ok());
        assert!(validator.validate_file_size("a.png", 0).is_ok());
        assert!(matches!(
            validator.validate_file_size("a.png", 2 * 1024 * 1024),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_file_count() {
        let validator = test_validator();
        assert!(validator.validate_file_count(3).is_ok());
        assert!(matches!(
            validator.validate_file_count(4),
            Err(ValidationError::TooManyFiles { count: 4, max: 3 })
        ));
    }

    #[test]
    fn test_validate_content_type() {
        let validator = test_validator();
        assert!(validator.validate_content_type("image/jpeg").is_ok());
        assert!(validator.validate_content_type("IMAGE/PNG").is_ok()); // case insensitive
        assert!(validator
            .validate_content_type("image/png; charset=binary")
            .is_ok());
        assert!(validator.validate_content_type("application/pdf").is_err());
        assert!(validator.validate_content_type("image/gif").is_err());
    }

    #[test]
    fn test_opaque_content_types_defer_to_sniffing() {
        let validator = test_validator();
        assert!(validator
            .validate_content_type("application/octet-stream")
            .is_ok());
        assert!(validator.validate_content_type("").is_ok());
    }
}
