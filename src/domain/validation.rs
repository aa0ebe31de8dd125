use std::fmt;

/// Coarse error category shared by [`ValidationError`] and [`crate::SatimError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required value was never set.
    MissingData,
    /// The input has a malformed or disallowed shape.
    InvalidArgument,
    /// The input is well-formed but fails a domain rule.
    UnexpectedValue,
    /// The gateway rejected the merchant credentials.
    InvalidCredentials,
    /// The gateway (or the HTTP layer in front of it) answered with an error.
    UnexpectedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NotAnObject,
    UnexpectedKeys { keys: Vec<String> },
    MissingKeys { keys: Vec<&'static str> },
    NotAString { field: &'static str },
    Empty { field: &'static str },
    NegativeAmount { actual: i64 },
    AmountTooLarge { max: u64, actual: i64 },
    RefundAmountNotPositive { actual: i64 },
    UnsupportedCurrency { input: String },
    UnsupportedLanguage { input: String },
    InvalidUrl { field: &'static str, input: String },
    InvalidOrderNumber { input: String },
    MissingOrderId,
    DescriptionTooLong { max: usize, actual: usize },
    SessionTimeoutOutOfRange { min: u32, max: u32, actual: u32 },
    InvalidFieldKey { key: String },
}

impl ValidationError {
    /// Category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingKeys { .. } => ErrorKind::MissingData,
            Self::NotAnObject
            | Self::UnexpectedKeys { .. }
            | Self::NotAString { .. }
            | Self::RefundAmountNotPositive { .. }
            | Self::InvalidUrl { .. }
            | Self::MissingOrderId
            | Self::InvalidFieldKey { .. } => ErrorKind::InvalidArgument,
            Self::Empty { .. }
            | Self::NegativeAmount { .. }
            | Self::AmountTooLarge { .. }
            | Self::UnsupportedCurrency { .. }
            | Self::UnsupportedLanguage { .. }
            | Self::InvalidOrderNumber { .. }
            | Self::DescriptionTooLong { .. }
            | Self::SessionTimeoutOutOfRange { .. } => ErrorKind::UnexpectedValue,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "credentials must be a JSON object"),
            Self::UnexpectedKeys { keys } => {
                write!(f, "unexpected keys found: {}", keys.join(", "))
            }
            Self::MissingKeys { keys } => {
                write!(f, "missing required data: {}", keys.join(", "))
            }
            Self::NotAString { field } => write!(f, "the value for {field} must be a string"),
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::NegativeAmount { actual } => {
                write!(f, "amount must be positive: {actual}")
            }
            Self::AmountTooLarge { max, actual } => {
                write!(f, "amount too large: {actual} (max {max})")
            }
            Self::RefundAmountNotPositive { actual } => {
                write!(f, "refund amount must be a positive integer: {actual}")
            }
            Self::UnsupportedCurrency { input } => write!(
                f,
                "invalid currency {input:?}: allowed currencies are [DZD, USD, EUR]"
            ),
            Self::UnsupportedLanguage { input } => {
                write!(f, "invalid language {input:?}: must be FR, AR, or EN")
            }
            Self::InvalidUrl { field, input } => {
                write!(f, "invalid {field}: {input:?} is not an absolute URL")
            }
            Self::InvalidOrderNumber { input } => {
                write!(f, "order number must be exactly 10 digits: {input:?}")
            }
            Self::MissingOrderId => write!(f, "order id is required"),
            Self::DescriptionTooLong { max, actual } => {
                write!(f, "description too long: {actual} characters (max {max})")
            }
            Self::SessionTimeoutOutOfRange { min, max, actual } => write!(
                f,
                "session timeout out of range: {actual} (expected {min}..={max} seconds)"
            ),
            Self::InvalidFieldKey { key } => write!(
                f,
                "user defined field key must be a non-numeric string: {key:?}"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
