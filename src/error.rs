pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("invalid JSON: {context}")]
    Json {
        #[source]
        source: serde_json::Error,
        context: String,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("{delegate} delegate failed: {message}")]
    Delegate {
        delegate: &'static str,
        message: String,
    },
}

impl From<std::io::Error> for AppError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            context: "I/O operation failed".to_string(),
        }
    }
}

impl AppError {
    pub fn io_with_context(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    pub fn json_with_context(source: serde_json::Error, context: impl Into<String>) -> Self {
        Self::Json {
            source,
            context: context.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    pub fn delegate(delegate: &'static str, message: impl Into<String>) -> Self {
        Self::Delegate {
            delegate,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn delegate_error_names_the_failing_collaborator() {
        let err = AppError::delegate("tree", "cursor out of range");
        assert!(matches!(err, AppError::Delegate { delegate: "tree", .. }));
        assert_eq!(err.to_string(), "tree delegate failed: cursor out of range");
    }

    #[test]
    fn json_error_keeps_context_and_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").expect_err("must fail");
        let err = AppError::json_with_context(source, "stdin");
        assert_eq!(err.to_string(), "invalid JSON: stdin");
        assert!(std::error::Error::source(&err).is_some());
    }
}
