use std::collections::BTreeMap;
use std::fmt;

/// Message returned by [`GatewayResponse::error_message`] for rejected payments.
pub const REJECTED_MESSAGE: &str =
    "« Votre transaction a été rejetée/ Your transaction was rejected/ تم رفض معاملتك »";
pub const REFUNDED_MESSAGE: &str = "Payment was refunded";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Payment was successful";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Payment failed";

/// Gateway operations that produce a stored response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Register,
    Confirm,
    Status,
    Refund,
}

impl Operation {
    /// Path appended to the gateway base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Register => "/register.do",
            Self::Confirm => "/confirmOrder.do",
            Self::Status => "/getOrderStatus.do",
            Self::Refund => "/refund.do",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Confirm => "confirm",
            Self::Status => "status",
            Self::Refund => "refund",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value of a decoded gateway response.
///
/// Numbers and booleans keep their JSON token text (`2` becomes `"2"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Object(BTreeMap<String, FieldValue>),
    List(Vec<FieldValue>),
    Null,
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(normalize_keys(iter))
    }
}

/// Canonical (lowerCamelCase) spelling of a gateway key: `ErrorCode` becomes `errorCode`.
pub fn canonical_key(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build a map with canonical keys.
///
/// When two spellings of one key arrive, the one already in canonical form wins.
pub(crate) fn normalize_keys<K, V>(
    entries: impl IntoIterator<Item = (K, V)>,
) -> BTreeMap<String, FieldValue>
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    let mut map = BTreeMap::new();
    for (key, value) in entries {
        let key = key.into();
        let canonical = canonical_key(&key);
        if canonical == key {
            map.insert(canonical, value.into());
        } else {
            map.entry(canonical).or_insert_with(|| value.into());
        }
    }
    map
}

/// Decoded gateway response with normalized keys.
///
/// All predicates and extractors are pure reads; they never touch the network.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GatewayResponse {
    fields: BTreeMap<String, FieldValue>,
}

impl GatewayResponse {
    pub(crate) fn from_fields(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    /// Raw field lookup; `key` is normalized the same way incoming keys are.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(&canonical_key(key))
    }

    /// Scalar field as text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn error_code(&self) -> Option<&str> {
        self.text("errorCode")
    }

    pub fn gateway_error_message(&self) -> Option<&str> {
        self.text("errorMessage")
    }

    pub fn order_status(&self) -> Option<&str> {
        self.text("orderStatus")
    }

    pub fn action_code(&self) -> Option<&str> {
        self.text("actionCode")
    }

    /// `OrderStatus` is `2` (deposited) or `0` (registered, not paid).
    pub fn is_successful(&self) -> bool {
        matches!(self.order_status(), Some("2" | "0"))
    }

    pub fn is_refunded(&self) -> bool {
        self.order_status() == Some("4")
    }

    /// Declined by the bank.
    ///
    /// A refunded status is never reported as rejected. A successful status only
    /// overrides the `OrderStatus` 3 signal.
    pub fn is_rejected(&self) -> bool {
        if self.is_refunded() {
            return false;
        }
        self.message_mentions(&["declined", "rejected"])
            || self.action_code() == Some("2003")
            || (self.order_status() == Some("3") && !self.is_successful())
    }

    pub fn is_failed(&self) -> bool {
        !self.is_successful() && !self.is_refunded()
    }

    /// Cancelled by the cardholder. An `errorCode` of `0` rules this out.
    pub fn is_cancelled(&self) -> bool {
        if self.error_code() == Some("0") {
            return false;
        }
        self.message_mentions(&["cancelled", "canceled"]) || self.action_code() == Some("10")
    }

    /// Payment session timed out before the cardholder paid.
    pub fn is_expired(&self) -> bool {
        self.action_code() == Some("-2007")
    }

    pub fn success_message(&self) -> &str {
        if !self.is_successful() {
            return self.error_message();
        }
        self.description_text().unwrap_or(DEFAULT_SUCCESS_MESSAGE)
    }

    pub fn error_message(&self) -> &str {
        if self.is_rejected() {
            return REJECTED_MESSAGE;
        }
        if self.is_refunded() {
            return REFUNDED_MESSAGE;
        }
        self.description_text().unwrap_or(DEFAULT_FAILURE_MESSAGE)
    }

    pub fn order_id(&self) -> Option<&str> {
        self.text("orderId")
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.text("ip")
    }

    pub fn card_holder_name(&self) -> Option<&str> {
        self.text("cardholderName")
    }

    pub fn card_expiry(&self) -> Option<&str> {
        self.text("expiration")
    }

    /// Masked card number (`Pan`).
    pub fn card_pan(&self) -> Option<&str> {
        self.text("pan")
    }

    pub fn approval_code(&self) -> Option<&str> {
        self.text("approvalCode")
    }

    /// Hosted payment page URL returned by registration.
    pub fn form_url(&self) -> Option<&str> {
        self.text("formUrl")
    }

    // params.respCode_desc, then actionCodeDescription; only absent or null values fall through.
    fn description_text(&self) -> Option<&str> {
        self.get("params")
            .and_then(FieldValue::as_object)
            .and_then(|params| params.get("respCode_desc"))
            .and_then(FieldValue::as_text)
            .or_else(|| self.text("actionCodeDescription"))
    }

    fn message_mentions(&self, needles: &[&str]) -> bool {
        let Some(message) = self.gateway_error_message() else {
            return false;
        };
        let message = message.to_lowercase();
        needles.iter().any(|needle| message.contains(needle))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for GatewayResponse {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_fields(normalize_keys(iter))
    }
}

/// Why a stored response could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseLookupError {
    /// No operation has been invoked or selected yet.
    NoContext,
    /// The selected operation has not produced a response.
    EmptySlot(Operation),
}

impl fmt::Display for ResponseLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContext => write!(
                f,
                "no response data found; call one of the operations first to obtain the response data"
            ),
            Self::EmptySlot(operation) => write!(
                f,
                "no payment data found; call {operation}() first to obtain the response data"
            ),
        }
    }
}

impl std::error::Error for ResponseLookupError {}

/// Per-operation response slots plus the current context.
#[derive(Debug, Clone, Default)]
pub struct Responses {
    current: Option<Operation>,
    slots: BTreeMap<Operation, GatewayResponse>,
}

impl Responses {
    /// Store `response` for `operation` and make it the current context.
    pub(crate) fn record(&mut self, operation: Operation, response: GatewayResponse) -> &GatewayResponse {
        self.current = Some(operation);
        let slot = self.slots.entry(operation).or_default();
        *slot = response;
        slot
    }

    /// Point the context at another operation, whether or not it has a response.
    pub(crate) fn select(&mut self, operation: Operation) {
        self.current = Some(operation);
    }

    pub fn context(&self) -> Option<Operation> {
        self.current
    }

    pub fn get(&self, operation: Operation) -> Option<&GatewayResponse> {
        self.slots.get(&operation)
    }

    /// Response for the current context.
    pub fn current(&self) -> Result<&GatewayResponse, ResponseLookupError> {
        let operation = self.current.ok_or(ResponseLookupError::NoContext)?;
        self.slots
            .get(&operation)
            .ok_or(ResponseLookupError::EmptySlot(operation))
    }
}
