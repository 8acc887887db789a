use thiserror::Error;

/// Errors surfaced by the Kodik client.
///
/// Every transport or API failure is re-expressed as one of these kinds; only
/// failures without a mapping rule travel through [`KodikError::Other`].
#[derive(Error, Debug)]
pub enum KodikError {
    /// The API rejected the configured token.
    #[error("{0}")]
    InvalidToken(String),

    /// The requested material (or any material for a query) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The API could not be reached or answered with something unusable.
    #[error("{0}")]
    UnexpectedResponse(String),

    /// The search query was empty.
    #[error("{0}")]
    EmptyQuery(String),

    /// The search query was too short to be sent.
    ///
    /// Kept under its historical name; it signals a short query, not a large response.
    #[error("{0}")]
    TooLargeResponse(String),

    /// A required call argument was missing or malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// The source configuration cannot produce a request URL.
    #[error("invalid Kodik source configuration: {0}")]
    InvalidSource(String),

    /// The token cache failed to answer or to record a validation.
    #[error("token cache error: {0}")]
    Cache(#[source] anyhow::Error),

    /// A transport failure with no mapping rule, propagated as-is.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Category of a [`KodikError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidToken,
    NotFound,
    UnexpectedResponse,
    EmptyQuery,
    TooLargeResponse,
    InvalidArgument,
    InvalidSource,
    Cache,
    Other,
}

impl KodikError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KodikError::InvalidToken(_) => ErrorKind::InvalidToken,
            KodikError::NotFound(_) => ErrorKind::NotFound,
            KodikError::UnexpectedResponse(_) => ErrorKind::UnexpectedResponse,
            KodikError::EmptyQuery(_) => ErrorKind::EmptyQuery,
            KodikError::TooLargeResponse(_) => ErrorKind::TooLargeResponse,
            KodikError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            KodikError::InvalidSource(_) => ErrorKind::InvalidSource,
            KodikError::Cache(_) => ErrorKind::Cache,
            KodikError::Other(_) => ErrorKind::Other,
        }
    }

    pub(crate) fn unexpected(message: impl Into<String>) -> Self {
        KodikError::UnexpectedResponse(message.into())
    }
}

pub type Result<T> = std::result::Result<T, KodikError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_carried_message() {
        let err = KodikError::NotFound("requested material not found".to_string());
        assert_eq!(err.to_string(), "requested material not found");
        let err = KodikError::InvalidSource("empty host".to_string());
        assert_eq!(err.to_string(), "invalid Kodik source configuration: empty host");
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(KodikError::EmptyQuery(String::new()).kind(), ErrorKind::EmptyQuery);
        assert_eq!(KodikError::unexpected("x").kind(), ErrorKind::UnexpectedResponse);
        assert_eq!(KodikError::from(anyhow::anyhow!("boom")).kind(), ErrorKind::Other);
    }

    #[test]
    fn other_is_transparent() {
        let err = KodikError::from(anyhow::anyhow!("socket closed mid-body"));
        assert_eq!(err.to_string(), "socket closed mid-body");
    }
}
