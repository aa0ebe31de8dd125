use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde_json::Value;

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SATIM merchant login (`userName`).
///
/// Invariant: non-empty after trimming.
pub struct Username(String);

impl Username {
    /// Form field name used by SATIM (`userName`).
    pub const FIELD: &'static str = "userName";

    /// Create a validated [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated login.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// SATIM merchant password.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    /// Form field name used by SATIM (`password`).
    pub const FIELD: &'static str = "password";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Terminal id assigned to the merchant by SATIM.
///
/// Sent inside `jsonParams` as `force_terminal_id`.
pub struct TerminalId(String);

impl TerminalId {
    /// Key used inside `jsonParams`.
    pub const FIELD: &'static str = "force_terminal_id";

    /// Create a validated [`TerminalId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "terminal_id",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated terminal id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Merchant credentials, fixed for the lifetime of a client.
pub struct Credentials {
    username: Username,
    password: Password,
    terminal_id: TerminalId,
}

impl Credentials {
    const KEYS: [&'static str; 3] = ["username", "password", "terminal_id"];

    /// Build credentials from already-typed values.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        terminal_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
            terminal_id: TerminalId::new(terminal_id)?,
        })
    }

    /// Build credentials from a loosely-typed JSON object such as a loaded config file.
    ///
    /// Checks run in this order: unexpected keys, missing keys, then per key the
    /// value type (must be a string) and emptiness.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let Some(map) = value.as_object() else {
            return Err(ValidationError::NotAnObject);
        };

        let unexpected = map
            .keys()
            .filter(|key| !Self::KEYS.contains(&key.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        if !unexpected.is_empty() {
            return Err(ValidationError::UnexpectedKeys { keys: unexpected });
        }

        let missing = Self::KEYS
            .into_iter()
            .filter(|key| !map.contains_key(*key))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ValidationError::MissingKeys { keys: missing });
        }

        // Emptiness rules live in the newtypes.
        let text = |key: &'static str| {
            map.get(key)
                .and_then(Value::as_str)
                .ok_or(ValidationError::NotAString { field: key })
        };

        Ok(Self {
            username: Username::new(text("username")?)?,
            password: Password::new(text("password")?)?,
            terminal_id: TerminalId::new(text("terminal_id")?)?,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn terminal_id(&self) -> &TerminalId {
        &self.terminal_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Payment amount in major currency units.
///
/// Invariant: non-negative and small enough to be expressed in minor units.
pub struct Amount(u64);

impl Amount {
    /// Form field name used by SATIM (`amount`).
    pub const FIELD: &'static str = "amount";

    /// Largest accepted amount; its minor-unit form still fits in `u64`.
    pub const MAX: u64 = u64::MAX / 100;

    /// Create a validated amount.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        let Ok(unsigned) = u64::try_from(value) else {
            return Err(ValidationError::NegativeAmount { actual: value });
        };
        if unsigned > Self::MAX {
            return Err(ValidationError::AmountTooLarge {
                max: Self::MAX,
                actual: value,
            });
        }
        Ok(Self(unsigned))
    }

    /// Amount in major units, as set.
    pub fn value(self) -> u64 {
        self.0
    }

    /// Amount in minor units (×100), as sent on the wire.
    pub fn minor_units(self) -> u64 {
        self.0 * 100
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Currencies accepted by SATIM.
pub enum Currency {
    #[default]
    Dzd,
    Usd,
    Eur,
}

impl Currency {
    /// Form field name used by SATIM (`currency`).
    pub const FIELD: &'static str = "currency";

    /// ISO 4217 numeric code sent on the wire.
    pub fn numeric_code(self) -> &'static str {
        match self {
            Self::Dzd => "012",
            Self::Usd => "840",
            Self::Eur => "978",
        }
    }

    /// ISO 4217 alphabetic code.
    pub fn alpha_code(self) -> &'static str {
        match self {
            Self::Dzd => "DZD",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "DZD" => Ok(Self::Dzd),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            _ => Err(ValidationError::UnsupportedCurrency {
                input: input.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Language of the hosted payment page.
pub enum Language {
    #[default]
    Fr,
    Ar,
    En,
}

impl Language {
    /// Form field name used by SATIM (`language`).
    pub const FIELD: &'static str = "language";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fr => "FR",
            Self::Ar => "AR",
            Self::En => "EN",
        }
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    /// Parse a language code, ignoring ASCII case.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_uppercase().as_str() {
            "FR" => Ok(Self::Fr),
            "AR" => Ok(Self::Ar),
            "EN" => Ok(Self::En),
            _ => Err(ValidationError::UnsupportedLanguage {
                input: input.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Absolute redirect URL (`returnUrl` / `failUrl`).
///
/// Invariant: has a scheme and a host.
pub struct RedirectUrl(url::Url);

impl RedirectUrl {
    /// Form field name of the success redirect.
    pub const RETURN_FIELD: &'static str = "returnUrl";
    /// Form field name of the failure redirect.
    pub const FAIL_FIELD: &'static str = "failUrl";

    /// Parse `input`; `field` names the setting in the error.
    pub fn parse(field: &'static str, input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidUrl {
            field,
            input: input.to_owned(),
        };
        let parsed = url::Url::parse(input.trim()).map_err(|_| invalid())?;
        if parsed.cannot_be_a_base() || !parsed.has_host() {
            return Err(invalid());
        }
        Ok(Self(parsed))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &url::Url {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Merchant-assigned order number (`orderNumber`).
///
/// Invariant: exactly 10 ASCII digits.
pub struct OrderNumber(String);

impl OrderNumber {
    /// Form field name used by SATIM (`orderNumber`).
    pub const FIELD: &'static str = "orderNumber";

    /// Required number of digits.
    pub const DIGITS: usize = 10;

    /// Create a validated order number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.len() != Self::DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidOrderNumber { input: value });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Random order number without a leading zero.
    pub fn random() -> Self {
        let value = rand::rng().random_range(1_000_000_000_u64..=9_999_999_999);
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Gateway-assigned order id (`orderId`) returned by registration.
///
/// Invariant: non-empty after trimming.
pub struct OrderId(String);

impl OrderId {
    /// Form field name used by SATIM (`orderId`).
    pub const FIELD: &'static str = "orderId";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingOrderId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Free-form order description (`description`).
///
/// Invariant: at most [`Description::MAX_CHARS`] characters.
pub struct Description(String);

impl Description {
    /// Form field name used by SATIM (`description`).
    pub const FIELD: &'static str = "description";

    pub const MAX_CHARS: usize = 598;

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let chars = value.chars().count();
        if chars > Self::MAX_CHARS {
            return Err(ValidationError::DescriptionTooLong {
                max: Self::MAX_CHARS,
                actual: chars,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Lifetime of the hosted payment session in seconds (`sessionTimeoutSecs`).
///
/// Invariant: `600..=86400`.
pub struct SessionTimeout(u32);

impl SessionTimeout {
    /// Form field name used by SATIM (`sessionTimeoutSecs`).
    pub const FIELD: &'static str = "sessionTimeoutSecs";

    /// Ten minutes.
    pub const MIN: u32 = 600;
    /// Twenty-four hours.
    pub const MAX: u32 = 86_400;

    pub fn new(seconds: u32) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&seconds) {
            return Err(ValidationError::SessionTimeoutOutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: seconds,
            });
        }
        Ok(Self(seconds))
    }

    pub fn seconds(self) -> u32 {
        self.0
    }
}

/// Reject keys that are empty or read as a number (`"123"`, `"1.5"`, `"1e3"`).
pub(crate) fn validate_field_key(key: &str) -> Result<(), ValidationError> {
    let trimmed = key.trim();
    let numeric = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && trimmed.parse::<f64>().is_ok();
    if trimmed.is_empty() || numeric {
        return Err(ValidationError::InvalidFieldKey {
            key: key.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn credential_newtypes_trim_or_validate() {
        let credentials = Credentials::new(" merchant ", " secret ", " 123456 ").unwrap();
        assert_eq!(credentials.username().as_str(), "merchant");
        assert_eq!(credentials.password().as_str(), " secret ");
        assert_eq!(credentials.terminal_id().as_str(), "123456");

        assert_eq!(
            Credentials::new("", "secret", "123456").unwrap_err(),
            ValidationError::Empty { field: "username" }
        );
        assert!(Password::new("").is_err());
        assert!(TerminalId::new("   ").is_err());
    }

    #[test]
    fn password_debug_is_redacted() {
        let password = Password::new("hunter2").unwrap();
        assert_eq!(format!("{password:?}"), "Password(***)");
    }

    #[test]
    fn credentials_from_value_checks_unexpected_keys_first() {
        let err = Credentials::from_value(&json!({ "username": 1, "extra": "x" })).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnexpectedKeys {
                keys: vec!["extra".to_owned()]
            }
        );
    }

    #[test]
    fn credentials_from_value_lists_missing_keys() {
        let err = Credentials::from_value(&json!({})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingKeys {
                keys: vec!["username", "password", "terminal_id"]
            }
        );
        assert_eq!(err.to_string(), "missing required data: username, password, terminal_id");
    }

    #[test]
    fn credentials_from_value_checks_type_then_emptiness() {
        let err = Credentials::from_value(&json!({
            "username": 42,
            "password": "",
            "terminal_id": "123456"
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::NotAString { field: "username" });

        let err = Credentials::from_value(&json!({
            "username": "",
            "password": "pass",
            "terminal_id": "123456"
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "username" });

        let ok = Credentials::from_value(&json!({
            "username": "user",
            "password": "pass",
            "terminal_id": "123456"
        }))
        .unwrap();
        assert_eq!(ok.username().as_str(), "user");
    }

    #[test]
    fn credentials_from_value_matches_typed_emptiness_rules() {
        let raw = json!({
            "username": "user",
            "password": "   ",
            "terminal_id": "123456"
        });
        let from_value = Credentials::from_value(&raw).unwrap();
        let typed = Credentials::new("user", "   ", "123456").unwrap();
        assert_eq!(from_value, typed);

        let err = Credentials::from_value(&json!({
            "username": "user",
            "password": "pass",
            "terminal_id": "  "
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "terminal_id" });
    }

    #[test]
    fn credentials_from_value_rejects_non_objects() {
        let err = Credentials::from_value(&json!(["user", "pass", "123456"])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject);
        assert_eq!(err.kind(), crate::domain::ErrorKind::InvalidArgument);
    }

    #[test]
    fn amount_rejects_negative_and_keeps_value() {
        assert_eq!(
            Amount::new(-1).unwrap_err(),
            ValidationError::NegativeAmount { actual: -1 }
        );
        assert_eq!(Amount::new(0).unwrap().value(), 0);
        let amount = Amount::new(1000).unwrap();
        assert_eq!(amount.value(), 1000);
        assert_eq!(amount.minor_units(), 100_000);
        assert!(Amount::new(i64::MAX).is_err());
    }

    #[test]
    fn currency_maps_to_numeric_code() {
        assert_eq!("USD".parse::<Currency>().unwrap().numeric_code(), "840");
        assert_eq!("EUR".parse::<Currency>().unwrap().numeric_code(), "978");
        assert_eq!(Currency::default().numeric_code(), "012");
        let err = "GBP".parse::<Currency>().unwrap_err();
        assert!(err.to_string().contains("[DZD, USD, EUR]"));
    }

    #[test]
    fn language_is_case_insensitive() {
        assert_eq!("ar".parse::<Language>().unwrap(), Language::Ar);
        assert_eq!("En".parse::<Language>().unwrap().as_str(), "EN");
        assert!("DE".parse::<Language>().is_err());
    }

    #[test]
    fn redirect_url_requires_absolute_url() {
        let url = RedirectUrl::parse(RedirectUrl::RETURN_FIELD, "https://shop.example/ok").unwrap();
        assert_eq!(url.as_str(), "https://shop.example/ok");
        assert!(RedirectUrl::parse(RedirectUrl::RETURN_FIELD, "invalid_url").is_err());
        assert!(RedirectUrl::parse(RedirectUrl::FAIL_FIELD, "/relative/path").is_err());
        assert!(RedirectUrl::parse(RedirectUrl::FAIL_FIELD, "mailto:a@b.c").is_err());
    }

    #[test]
    fn order_number_requires_ten_digits() {
        assert_eq!(OrderNumber::new("1234567890").unwrap().as_str(), "1234567890");
        assert!(OrderNumber::new("123").is_err());
        assert!(OrderNumber::new("12345678901").is_err());
        assert!(OrderNumber::new("12345abcde").is_err());
    }

    #[test]
    fn random_order_number_is_valid() {
        for _ in 0..32 {
            let number = OrderNumber::random();
            assert!(OrderNumber::new(number.as_str()).is_ok());
        }
    }

    #[test]
    fn description_and_timeout_bounds() {
        assert!(Description::new("a".repeat(Description::MAX_CHARS)).is_ok());
        assert!(Description::new("a".repeat(Description::MAX_CHARS + 1)).is_err());

        assert!(SessionTimeout::new(SessionTimeout::MIN).is_ok());
        assert!(SessionTimeout::new(SessionTimeout::MAX).is_ok());
        assert!(SessionTimeout::new(599).is_err());
        assert!(SessionTimeout::new(86_401).is_err());
    }

    #[test]
    fn field_keys_must_not_look_numeric() {
        assert!(validate_field_key("customer_ref").is_ok());
        assert!(validate_field_key("e").is_ok());
        assert!(validate_field_key("123").is_err());
        assert!(validate_field_key("1.5").is_err());
        assert!(validate_field_key("").is_err());
    }
}
