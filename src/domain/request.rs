use std::collections::BTreeMap;

use crate::domain::validation::ValidationError;
use crate::domain::value::{
    Amount, Credentials, Currency, Description, Language, OrderNumber, RedirectUrl,
    SessionTimeout, validate_field_key,
};

/// Payment parameters accumulated before an operation is invoked.
///
/// Setters validate eagerly and return `&mut Self` so calls can be chained:
///
/// ```rust
/// use satim::{Credentials, PaymentConfig};
///
/// # fn main() -> Result<(), satim::ValidationError> {
/// let mut config = PaymentConfig::new(Credentials::new("user", "pass", "123456")?);
/// config
///     .amount(1000)?
///     .currency("DZD")?
///     .return_url("https://shop.example/payment/return")?
///     .language("en")?;
/// assert_eq!(config.currency_code(), "012");
/// # Ok(())
/// # }
/// ```
///
/// Whether `return_url` and `amount` are present, and the order number itself,
/// are only settled at registration time.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    credentials: Credentials,
    amount: Option<Amount>,
    currency: Currency,
    language: Language,
    return_url: Option<RedirectUrl>,
    fail_url: Option<RedirectUrl>,
    order_number: Option<OrderNumber>,
    description: Option<Description>,
    session_timeout: Option<SessionTimeout>,
    user_defined_fields: BTreeMap<String, String>,
    test_mode: bool,
}

impl PaymentConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            amount: None,
            currency: Currency::default(),
            language: Language::default(),
            return_url: None,
            fail_url: None,
            order_number: None,
            description: None,
            session_timeout: None,
            user_defined_fields: BTreeMap::new(),
            test_mode: false,
        }
    }

    /// Set the amount in major currency units.
    pub fn amount(&mut self, amount: i64) -> Result<&mut Self, ValidationError> {
        self.amount = Some(Amount::new(amount)?);
        Ok(self)
    }

    /// Set the currency from its alphabetic code (`DZD`, `USD` or `EUR`).
    pub fn currency(&mut self, code: &str) -> Result<&mut Self, ValidationError> {
        self.currency = code.parse()?;
        Ok(self)
    }

    /// Set the payment page language (`FR`, `AR` or `EN`, any case).
    pub fn language(&mut self, code: &str) -> Result<&mut Self, ValidationError> {
        self.language = code.parse()?;
        Ok(self)
    }

    pub fn return_url(&mut self, url: &str) -> Result<&mut Self, ValidationError> {
        self.return_url = Some(RedirectUrl::parse(RedirectUrl::RETURN_FIELD, url)?);
        Ok(self)
    }

    /// Set the failure redirect. Defaults to the return URL when never set.
    pub fn fail_url(&mut self, url: &str) -> Result<&mut Self, ValidationError> {
        self.fail_url = Some(RedirectUrl::parse(RedirectUrl::FAIL_FIELD, url)?);
        Ok(self)
    }

    /// Set the merchant order number (exactly 10 digits).
    pub fn order_number(&mut self, number: impl Into<String>) -> Result<&mut Self, ValidationError> {
        self.order_number = Some(OrderNumber::new(number)?);
        Ok(self)
    }

    pub fn description(&mut self, text: impl Into<String>) -> Result<&mut Self, ValidationError> {
        self.description = Some(Description::new(text)?);
        Ok(self)
    }

    /// Set the hosted payment session lifetime in seconds.
    pub fn timeout(&mut self, seconds: u32) -> Result<&mut Self, ValidationError> {
        self.session_timeout = Some(SessionTimeout::new(seconds)?);
        Ok(self)
    }

    /// Add one entry to the `jsonParams` object sent at registration.
    ///
    /// A `force_terminal_id` key replaces the terminal id taken from the credentials.
    pub fn user_defined_field(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, ValidationError> {
        let key = key.into();
        validate_field_key(&key)?;
        self.user_defined_fields.insert(key, value.into());
        Ok(self)
    }

    /// Add several `jsonParams` entries.
    ///
    /// Stops at the first invalid key; entries before it stay applied.
    pub fn user_defined_fields<K, V>(
        &mut self,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<&mut Self, ValidationError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in fields {
            self.user_defined_field(key, value)?;
        }
        Ok(self)
    }

    /// Target the sandbox (`true`) or production (`false`) gateway.
    pub fn test_mode(&mut self, enabled: bool) -> &mut Self {
        self.test_mode = enabled;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn amount_value(&self) -> Option<Amount> {
        self.amount
    }

    pub fn currency_value(&self) -> Currency {
        self.currency
    }

    /// Numeric ISO code of the configured currency, as sent on the wire.
    pub fn currency_code(&self) -> &'static str {
        self.currency.numeric_code()
    }

    pub fn language_value(&self) -> Language {
        self.language
    }

    pub fn return_url_value(&self) -> Option<&RedirectUrl> {
        self.return_url.as_ref()
    }

    /// Failure redirect, falling back to the return URL.
    pub fn effective_fail_url(&self) -> Option<&RedirectUrl> {
        self.fail_url.as_ref().or(self.return_url.as_ref())
    }

    pub fn order_number_value(&self) -> Option<&OrderNumber> {
        self.order_number.as_ref()
    }

    pub fn description_value(&self) -> Option<&Description> {
        self.description.as_ref()
    }

    pub fn session_timeout_value(&self) -> Option<SessionTimeout> {
        self.session_timeout
    }

    pub fn user_defined_fields_value(&self) -> &BTreeMap<String, String> {
        &self.user_defined_fields
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    /// Return the order number, generating and storing a random one if unset.
    pub(crate) fn ensure_order_number(&mut self) -> &OrderNumber {
        self.order_number.get_or_insert_with(OrderNumber::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaymentConfig {
        PaymentConfig::new(Credentials::new("user", "pass", "123456").unwrap())
    }

    #[test]
    fn defaults_match_gateway_expectations() {
        let config = config();
        assert_eq!(config.currency_code(), "012");
        assert_eq!(config.language_value(), Language::Fr);
        assert!(config.amount_value().is_none());
        assert!(config.return_url_value().is_none());
        assert!(!config.is_test_mode());
    }

    #[test]
    fn setters_chain_and_store_validated_values() {
        let mut config = config();
        config
            .amount(1000)
            .unwrap()
            .currency("USD")
            .unwrap()
            .language("ar")
            .unwrap()
            .return_url("https://shop.example/ok")
            .unwrap()
            .order_number("1234567890")
            .unwrap()
            .timeout(3600)
            .unwrap()
            .test_mode(true);

        assert_eq!(config.amount_value().map(Amount::value), Some(1000));
        assert_eq!(config.currency_code(), "840");
        assert_eq!(config.language_value().as_str(), "AR");
        assert_eq!(
            config.order_number_value().map(OrderNumber::as_str),
            Some("1234567890")
        );
        assert_eq!(config.session_timeout_value().map(SessionTimeout::seconds), Some(3600));
        assert!(config.is_test_mode());
    }

    #[test]
    fn invalid_inputs_leave_previous_values_untouched() {
        let mut config = config();
        config.currency("EUR").unwrap();
        assert!(config.currency("GBP").is_err());
        assert_eq!(config.currency_code(), "978");

        assert!(config.amount(-5).is_err());
        assert!(config.amount_value().is_none());

        assert!(config.return_url("invalid_url").is_err());
        assert!(config.order_number("123").is_err());
        assert!(config.timeout(10).is_err());
        assert!(config.language("de").is_err());
    }

    #[test]
    fn fail_url_falls_back_to_return_url() {
        let mut config = config();
        config.return_url("https://shop.example/ok").unwrap();
        assert_eq!(
            config.effective_fail_url().map(RedirectUrl::as_str),
            Some("https://shop.example/ok")
        );

        config.fail_url("https://shop.example/ko").unwrap();
        assert_eq!(
            config.effective_fail_url().map(RedirectUrl::as_str),
            Some("https://shop.example/ko")
        );
    }

    #[test]
    fn user_defined_fields_stop_at_first_invalid_key() {
        let mut config = config();
        let err = config
            .user_defined_fields([("first", "1"), ("42", "bad"), ("third", "3")])
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidFieldKey {
                key: "42".to_owned()
            }
        );

        let fields = config.user_defined_fields_value();
        assert_eq!(fields.get("first").map(String::as_str), Some("1"));
        assert!(!fields.contains_key("third"));
    }

    #[test]
    fn ensure_order_number_generates_once() {
        let mut config = config();
        let generated = config.ensure_order_number().clone();
        assert_eq!(generated.as_str().len(), OrderNumber::DIGITS);
        assert_eq!(config.ensure_order_number(), &generated);
    }
}
