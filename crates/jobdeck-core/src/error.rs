use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobdeckError {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl JobdeckError {
    /// Short error code string, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            JobdeckError::Config(_) => "CONFIG_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, JobdeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_code_and_message() {
        let err = JobdeckError::Config("missing field `port`".into());
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert_eq!(err.to_string(), "Configuration error: missing field `port`");
    }
}
