use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_format - {0}")]
    InvalidFormat(String),
    #[error("out_of_range - no task at position {index} (list has {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("storage_error - {0}")]
    Storage(String),
    #[error("notify_error - {0}")]
    Notify(String),
}

impl AppError {
    pub fn invalid_format<M: Into<String>>(message: M) -> Self {
        Self::InvalidFormat(message.into())
    }

    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn storage<M: Into<String>>(message: M) -> Self {
        Self::Storage(message.into())
    }

    pub fn notify<M: Into<String>>(message: M) -> Self {
        Self::Notify(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Storage(_) => "storage_error",
            Self::Notify(_) => "notify_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::OutOfRange { index, len } => {
                format!("no task at position {index} (list has {len})")
            }
            Self::InvalidFormat(message)
            | Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Storage(message)
            | Self::Notify(message) => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn display_prefixes_code() {
        let err = AppError::invalid_format("expected value at line 1 column 2");
        assert_eq!(
            err.to_string(),
            "invalid_format - expected value at line 1 column 2"
        );
    }

    #[test]
    fn out_of_range_reports_index_and_len() {
        let err = AppError::out_of_range(4, 2);
        assert_eq!(err.code(), "out_of_range");
        assert_eq!(err.message(), "no task at position 4 (list has 2)");
        assert_eq!(err.to_string(), format!("out_of_range - {}", err.message()));
    }
}
