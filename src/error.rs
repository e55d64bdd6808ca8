use thiserror::Error;

/// Application-level failure carrying the process exit code.
///
/// Exit codes: `2` for usage/config/I-O problems, `4` for runtime and
/// terminal failures.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure of a market-data provider call.
///
/// Cloneable so a failed fetch can be memoized like a successful one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider call timed out")]
    Timeout,
    #[error("provider rate limit reached")]
    RateLimited,
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error("provider returned HTTP status {0}")]
    Status(u16),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::new(4, err.to_string())
    }
}

/// Rejected user input (symbol, lookback window).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error("symbol '{0}' contains unsupported characters")]
    InvalidSymbol(String),
    #[error("lookback window must be at least one day")]
    ZeroLookback,
    #[error("invalid lookback window '{0}'")]
    InvalidLookback(String),
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::new(2, err.to_string())
    }
}
