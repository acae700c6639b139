use thiserror::Error;

/// Failures raised while materializing a configuration generation.
///
/// Every variant carries enough context to name the directive that caused it,
/// since the loader logs the message verbatim before discarding the load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Trying to register a type named '{0}' while one already exists")]
    DuplicateName(String),

    #[error("Unable to find the {kind} named '{name}' referenced in {context}")]
    UnresolvedReference {
        kind: &'static str,
        name: String,
        context: String,
    },

    #[error("Invalid value in '{context}': {message}")]
    Validation { context: String, message: String },

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl DomainError {
    pub fn validation(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn unresolved(kind: &'static str, name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            kind,
            name: name.into(),
            context: context.into(),
        }
    }

    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_message_names_entity() {
        let err = DomainError::DuplicateName("blocked".to_string());
        assert_eq!(
            err.to_string(),
            "Trying to register a type named 'blocked' while one already exists"
        );
    }

    #[test]
    fn test_unresolved_reference_message() {
        let err = DomainError::unresolved("key-value store", "kvs1", "kvs-lookup selector");
        assert!(err.to_string().contains("key-value store named 'kvs1'"));
        assert!(err.to_string().contains("kvs-lookup selector"));
    }
}
