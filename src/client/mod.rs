//! Client layer: orchestrates transport calls and maps transport ↔ domain.

mod http;

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

pub use http::{BoxError, BoxFuture, HttpResponse, HttpTransport};

use crate::domain::{
    Amount, Credentials, ErrorKind, GatewayResponse, OrderId, Operation, PaymentConfig,
    ResponseLookupError, Responses, ValidationError,
};
use http::ReqwestTransport;

/// Production gateway base URL.
pub const DEFAULT_PRODUCTION_URL: &str = "https://cib.satim.dz/payment/rest";
/// Sandbox gateway base URL, used in test mode.
pub const DEFAULT_SANDBOX_URL: &str = "https://test.satim.dz/payment/rest";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const INVALID_CREDENTIALS_CODE: &str = "5";
const SUCCESS_CODE: &str = "0";

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SatimClient`].
///
/// Use [`SatimError::kind`] to branch on the broad category. This error preserves:
/// - validation failures raised by setters and operation preconditions,
/// - gateway-level failures (`errorCode` other than success),
/// - HTTP-level failures (non-2xx status, decode and transport failures).
pub enum SatimError {
    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A value required by the operation was never set.
    #[error("missing data: {0}")]
    MissingData(String),

    /// The gateway rejected the merchant credentials (`errorCode` 5).
    #[error("invalid username or password or terminal ID: {error_message}")]
    InvalidCredentials { error_message: String },

    /// The gateway answered an operation with a non-success `errorCode`.
    #[error("{operation} failed {{errorCode: {error_code}, errorMessage: {error_message}}}")]
    Api {
        operation: Operation,
        error_code: String,
        error_message: String,
    },

    /// Non-successful HTTP status code returned by the server (3xx, 4xx, 5xx).
    #[error("API error: HTTP {status} returned for {url}")]
    HttpStatus {
        url: String,
        status: u16,
        body: Option<String>,
    },

    /// Response body could not be parsed as a gateway JSON object.
    #[error("invalid response from the gateway: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("network error occurred: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
}

impl SatimError {
    /// Broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(err) => err.kind(),
            Self::MissingData(_) => ErrorKind::MissingData,
            Self::InvalidCredentials { .. } => ErrorKind::InvalidCredentials,
            Self::Api { .. }
            | Self::HttpStatus { .. }
            | Self::Parse(_)
            | Self::Transport(_) => ErrorKind::UnexpectedResponse,
        }
    }
}

impl From<ResponseLookupError> for SatimError {
    fn from(value: ResponseLookupError) -> Self {
        Self::MissingData(value.to_string())
    }
}

#[derive(Clone)]
/// Builder for [`SatimClient`].
///
/// Use this when you need to customize the gateway URLs, the request timeout,
/// the user-agent, or the HTTP transport itself.
pub struct SatimClientBuilder {
    credentials: Credentials,
    production_url: String,
    sandbox_url: String,
    request_timeout: Duration,
    user_agent: Option<String>,
    test_mode: bool,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl SatimClientBuilder {
    /// Create a builder with the default gateway URLs and a 10 second timeout.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            production_url: DEFAULT_PRODUCTION_URL.to_owned(),
            sandbox_url: DEFAULT_SANDBOX_URL.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: None,
            test_mode: false,
            transport: None,
        }
    }

    /// Override the production base URL (endpoint paths are appended to it).
    pub fn production_url(mut self, url: impl Into<String>) -> Self {
        self.production_url = url.into();
        self
    }

    /// Override the sandbox base URL used in test mode.
    pub fn sandbox_url(mut self, url: impl Into<String>) -> Self {
        self.sandbox_url = url.into();
        self
    }

    /// Set the HTTP timeout applied to each request. Ignored with a custom transport.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header. Ignored with a custom transport.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Start in test mode (sandbox gateway).
    pub fn test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    /// Use a caller-provided transport instead of the built-in reqwest one.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build a [`SatimClient`].
    pub fn build(self) -> Result<SatimClient, SatimError> {
        let http: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(self.request_timeout, self.user_agent)
                    .map_err(|err| SatimError::Transport(Box::new(err)))?,
            ),
        };

        let mut config = PaymentConfig::new(self.credentials);
        config.test_mode(self.test_mode);

        Ok(SatimClient {
            config,
            production_url: self.production_url,
            sandbox_url: self.sandbox_url,
            http,
            responses: Responses::default(),
        })
    }
}

#[derive(Clone)]
/// High-level SATIM client for one payment session.
///
/// Holds the [`PaymentConfig`], sends operations through an [`HttpTransport`], and
/// keeps the last response of each operation. Getters such as
/// [`SatimClient::is_successful`] read the response of the current context, which
/// is the operation invoked most recently (or picked with
/// [`SatimClient::select_context`]).
///
/// ```rust,no_run
/// use satim::{Credentials, SatimClient};
///
/// # async fn run() -> Result<(), satim::SatimError> {
/// let mut client = SatimClient::new(Credentials::new("user", "pass", "E010XXXXXX")?)?;
/// client
///     .config_mut()
///     .amount(2500)?
///     .return_url("https://shop.example/payment/return")?;
/// let form_url = client.register().await?.form_url().map(str::to_owned);
/// println!("redirect the customer to {form_url:?}");
/// # Ok(())
/// # }
/// ```
pub struct SatimClient {
    config: PaymentConfig,
    production_url: String,
    sandbox_url: String,
    http: Arc<dyn HttpTransport>,
    responses: Responses,
}

impl SatimClient {
    /// Create a client with the default reqwest transport and gateway URLs.
    ///
    /// For more customization, use [`SatimClient::builder`].
    pub fn new(credentials: Credentials) -> Result<Self, SatimError> {
        Self::builder(credentials).build()
    }

    /// Create a client that sends every request through `transport`.
    pub fn with_transport(credentials: Credentials, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: PaymentConfig::new(credentials),
            production_url: DEFAULT_PRODUCTION_URL.to_owned(),
            sandbox_url: DEFAULT_SANDBOX_URL.to_owned(),
            http: transport,
            responses: Responses::default(),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> SatimClientBuilder {
        SatimClientBuilder::new(credentials)
    }

    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    /// Mutable access to the payment parameters, for chained setters.
    pub fn config_mut(&mut self) -> &mut PaymentConfig {
        &mut self.config
    }

    /// Switch between the sandbox and production gateway for later requests.
    ///
    /// Only the base URL changes; the transport (including one injected by the
    /// caller) is kept as is.
    pub fn test_mode(&mut self, enabled: bool) -> &mut Self {
        self.config.test_mode(enabled);
        self
    }

    /// Base URL the next request will be sent to.
    pub fn base_url(&self) -> &str {
        if self.config.is_test_mode() {
            &self.sandbox_url
        } else {
            &self.production_url
        }
    }

    /// Register the order and obtain the hosted payment page URL.
    ///
    /// Requires a return URL and a non-zero amount; generates a random order
    /// number when none was set (readable afterwards from [`SatimClient::config`]).
    ///
    /// Errors:
    /// - [`SatimError::MissingData`] when the return URL or the amount is missing,
    /// - [`SatimError::Api`] when the gateway answers with a non-zero `errorCode`,
    /// - any error listed on [`SatimError`] for the HTTP exchange.
    #[instrument(skip(self))]
    pub async fn register(&mut self) -> Result<&GatewayResponse, SatimError> {
        let return_url = self.config.return_url_value().cloned().ok_or_else(|| {
            SatimError::MissingData("return URL missing; call return_url() to set it".to_owned())
        })?;
        let order_number = self.config.ensure_order_number().clone();
        let amount = self
            .config
            .amount_value()
            .filter(|amount| !amount.is_zero())
            .ok_or_else(|| {
                SatimError::MissingData("amount missing; call amount() to set it".to_owned())
            })?;

        let params =
            crate::transport::encode_register_form(&self.config, &order_number, amount, &return_url);
        let response = self.send(Operation::Register, params).await?;

        if response.error_code() != Some(SUCCESS_CODE) {
            let error_code = response.error_code().unwrap_or("missing").to_owned();
            let error_message = response
                .gateway_error_message()
                .unwrap_or("Unknown error")
                .to_owned();
            tracing::warn!(%error_code, %error_message, "gateway refused registration");
            return Err(SatimError::Api {
                operation: Operation::Register,
                error_code,
                error_message,
            });
        }

        Ok(self.record(Operation::Register, response))
    }

    /// Confirm (deposit) a registered order.
    #[instrument(skip(self))]
    pub async fn confirm(&mut self, order_id: &str) -> Result<&GatewayResponse, SatimError> {
        let order_id = OrderId::new(order_id)?;
        self.order_operation(Operation::Confirm, &order_id, None).await
    }

    /// Fetch the current status of an order.
    #[instrument(skip(self))]
    pub async fn status(&mut self, order_id: &str) -> Result<&GatewayResponse, SatimError> {
        let order_id = OrderId::new(order_id)?;
        self.order_operation(Operation::Status, &order_id, None).await
    }

    /// Refund `amount` (major units) of a paid order.
    ///
    /// The response is stored under the refund context and also returned.
    #[instrument(skip(self))]
    pub async fn refund(
        &mut self,
        order_id: &str,
        amount: i64,
    ) -> Result<&GatewayResponse, SatimError> {
        let order_id = OrderId::new(order_id)?;
        if amount <= 0 {
            return Err(ValidationError::RefundAmountNotPositive { actual: amount }.into());
        }
        let amount = Amount::new(amount)?;
        self.order_operation(Operation::Refund, &order_id, Some(amount))
            .await
    }

    async fn order_operation(
        &mut self,
        operation: Operation,
        order_id: &OrderId,
        refund_amount: Option<Amount>,
    ) -> Result<&GatewayResponse, SatimError> {
        let params = crate::transport::encode_order_form(
            self.config.credentials(),
            order_id,
            self.config.language_value(),
            refund_amount,
        );
        let response = self.send(operation, params).await?;
        Ok(self.record(operation, response))
    }

    async fn send(
        &self,
        operation: Operation,
        params: Vec<(String, String)>,
    ) -> Result<GatewayResponse, SatimError> {
        let url = format!("{}{}", self.base_url(), operation.endpoint());
        tracing::debug!(
            %operation,
            %url,
            test_mode = self.config.is_test_mode(),
            "sending gateway request"
        );

        let response = self
            .http
            .post_form(&url, params)
            .await
            .map_err(SatimError::Transport)?;

        if !(200..=299).contains(&response.status) {
            tracing::warn!(%operation, status = response.status, "gateway returned HTTP error");
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(SatimError::HttpStatus {
                url,
                status: response.status,
                body,
            });
        }

        let parsed = crate::transport::decode_gateway_response(&response.body)
            .map_err(|err| SatimError::Parse(Box::new(err)))?;

        check_gateway_error(&parsed)?;
        Ok(parsed)
    }

    fn record(&mut self, operation: Operation, response: GatewayResponse) -> &GatewayResponse {
        tracing::info!(%operation, "gateway response recorded");
        self.responses.record(operation, response)
    }

    /// All stored responses and the current context.
    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    /// Make `operation` the current context, e.g. to read the registration
    /// response again after a status check.
    pub fn select_context(&mut self, operation: Operation) -> &mut Self {
        self.responses.select(operation);
        self
    }

    /// Response of the current context.
    pub fn response(&self) -> Result<&GatewayResponse, SatimError> {
        Ok(self.responses.current()?)
    }

    pub fn is_successful(&self) -> Result<bool, SatimError> {
        Ok(self.response()?.is_successful())
    }

    pub fn is_rejected(&self) -> Result<bool, SatimError> {
        Ok(self.response()?.is_rejected())
    }

    pub fn is_refunded(&self) -> Result<bool, SatimError> {
        Ok(self.response()?.is_refunded())
    }

    pub fn is_failed(&self) -> Result<bool, SatimError> {
        Ok(self.response()?.is_failed())
    }

    pub fn is_cancelled(&self) -> Result<bool, SatimError> {
        Ok(self.response()?.is_cancelled())
    }

    pub fn is_expired(&self) -> Result<bool, SatimError> {
        Ok(self.response()?.is_expired())
    }

    pub fn success_message(&self) -> Result<&str, SatimError> {
        Ok(self.response()?.success_message())
    }

    pub fn error_message(&self) -> Result<&str, SatimError> {
        Ok(self.response()?.error_message())
    }

    pub fn order_id(&self) -> Result<Option<&str>, SatimError> {
        Ok(self.response()?.order_id())
    }

    pub fn ip_address(&self) -> Result<Option<&str>, SatimError> {
        Ok(self.response()?.ip_address())
    }

    pub fn card_holder_name(&self) -> Result<Option<&str>, SatimError> {
        Ok(self.response()?.card_holder_name())
    }

    pub fn card_expiry(&self) -> Result<Option<&str>, SatimError> {
        Ok(self.response()?.card_expiry())
    }

    pub fn card_pan(&self) -> Result<Option<&str>, SatimError> {
        Ok(self.response()?.card_pan())
    }

    pub fn approval_code(&self) -> Result<Option<&str>, SatimError> {
        Ok(self.response()?.approval_code())
    }

    /// Hosted payment page URL from the current response.
    ///
    /// Unlike the other extractors, a missing URL is an error.
    pub fn form_url(&self) -> Result<&str, SatimError> {
        self.response()?.form_url().ok_or_else(|| {
            SatimError::MissingData(
                "no payment form URL found; call register() first to obtain it".to_owned(),
            )
        })
    }
}

// `errorCode` 5 means rejected credentials on every endpoint.
fn check_gateway_error(response: &GatewayResponse) -> Result<(), SatimError> {
    if response.error_code() != Some(INVALID_CREDENTIALS_CODE) {
        return Ok(());
    }
    tracing::warn!("gateway rejected the merchant credentials");
    Err(SatimError::InvalidCredentials {
        error_message: response
            .gateway_error_message()
            .unwrap_or("Unknown error")
            .to_owned(),
    })
}
