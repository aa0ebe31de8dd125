//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::PaymentConfig;
pub use response::{
    DEFAULT_FAILURE_MESSAGE, DEFAULT_SUCCESS_MESSAGE, FieldValue, GatewayResponse, Operation,
    REFUNDED_MESSAGE, REJECTED_MESSAGE, ResponseLookupError, Responses, canonical_key,
};
pub use validation::{ErrorKind, ValidationError};
pub use value::{
    Amount, Credentials, Currency, Description, Language, OrderId, OrderNumber, Password,
    RedirectUrl, SessionTimeout, TerminalId, Username,
};

pub(crate) use response::normalize_keys;
