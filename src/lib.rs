//! Typed Rust client for the SATIM (CIB / Edahabia) payment gateway.
//!
//! The crate is split the usual way: a domain layer of validated types and
//! gateway responses, a transport layer for wire-format quirks, and a small
//! client layer that sends one request per operation and remembers the answers.
//!
//! ```rust,no_run
//! use satim::{Credentials, SatimClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), satim::SatimError> {
//!     let mut client = SatimClient::new(Credentials::new("merchant", "secret", "E010XXXXXX")?)?;
//!     client
//!         .test_mode(true)
//!         .config_mut()
//!         .amount(2500)?
//!         .language("en")?
//!         .return_url("https://shop.example/payment/return")?;
//!
//!     client.register().await?;
//!     println!("pay at {}", client.form_url()?);
//!
//!     let order_id = client.order_id()?.unwrap_or_default().to_owned();
//!     client.status(&order_id).await?;
//!     if client.is_successful()? {
//!         println!("{}", client.success_message()?);
//!     } else {
//!         println!("{}", client.error_message()?);
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    BoxError, BoxFuture, DEFAULT_PRODUCTION_URL, DEFAULT_SANDBOX_URL, HttpResponse,
    HttpTransport, SatimClient, SatimClientBuilder, SatimError,
};
pub use domain::{
    Amount, Credentials, Currency, Description, ErrorKind, FieldValue, GatewayResponse, Language,
    Operation, OrderId, OrderNumber, Password, PaymentConfig, RedirectUrl, ResponseLookupError,
    Responses, SessionTimeout, TerminalId, Username, ValidationError,
};
