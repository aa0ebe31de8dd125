use serde_json::{Map, Value};

use crate::domain::{
    Amount, Currency, Description, Language, OrderNumber, Password, PaymentConfig, RedirectUrl,
    SessionTimeout, TerminalId, Username,
};

/// Form field carrying the JSON-encoded extra parameters.
pub const JSON_PARAMS_FIELD: &str = "jsonParams";

/// Build the `/register.do` form.
///
/// `amount` and `return_url` are passed separately because their presence is
/// checked by the caller right before sending.
pub fn encode_register_form(
    config: &PaymentConfig,
    order_number: &OrderNumber,
    amount: Amount,
    return_url: &RedirectUrl,
) -> Vec<(String, String)> {
    let credentials = config.credentials();
    let fail_url = config.effective_fail_url().unwrap_or(return_url);

    let mut params = vec![
        (
            Username::FIELD.to_owned(),
            credentials.username().as_str().to_owned(),
        ),
        (
            Password::FIELD.to_owned(),
            credentials.password().as_str().to_owned(),
        ),
        (
            OrderNumber::FIELD.to_owned(),
            order_number.as_str().to_owned(),
        ),
        (Amount::FIELD.to_owned(), amount.minor_units().to_string()),
        (
            Currency::FIELD.to_owned(),
            config.currency_code().to_owned(),
        ),
        (
            RedirectUrl::RETURN_FIELD.to_owned(),
            return_url.as_str().to_owned(),
        ),
        (
            RedirectUrl::FAIL_FIELD.to_owned(),
            fail_url.as_str().to_owned(),
        ),
        (
            Language::FIELD.to_owned(),
            config.language_value().as_str().to_owned(),
        ),
        (JSON_PARAMS_FIELD.to_owned(), encode_json_params(config)),
    ];

    if let Some(description) = config.description_value() {
        params.push((
            Description::FIELD.to_owned(),
            description.as_str().to_owned(),
        ));
    }
    if let Some(timeout) = config.session_timeout_value() {
        params.push((SessionTimeout::FIELD.to_owned(), timeout.seconds().to_string()));
    }

    params
}

// `force_terminal_id` plus user fields, serialized with sorted keys; a user
// field with the same key wins.
fn encode_json_params(config: &PaymentConfig) -> String {
    let mut object = Map::new();
    object.insert(
        TerminalId::FIELD.to_owned(),
        Value::from(config.credentials().terminal_id().as_str()),
    );
    for (key, value) in config.user_defined_fields_value() {
        object.insert(key.clone(), Value::from(value.as_str()));
    }
    Value::Object(object).to_string()
}

#[cfg(test)]
mod tests {
    use crate::domain::Credentials;

    use super::*;

    fn config() -> PaymentConfig {
        let mut config = PaymentConfig::new(Credentials::new("user", "pass", "123456").unwrap());
        config
            .amount(1000)
            .unwrap()
            .return_url("https://shop.example/ok")
            .unwrap();
        config
    }

    fn encode(config: &PaymentConfig) -> Vec<(String, String)> {
        let order_number = OrderNumber::new("1234567890").unwrap();
        let amount = config.amount_value().unwrap();
        let return_url = config.return_url_value().unwrap();
        encode_register_form(config, &order_number, amount, return_url)
    }

    fn json_params(params: &[(String, String)]) -> Value {
        let raw = params
            .iter()
            .find(|(key, _)| key == JSON_PARAMS_FIELD)
            .map(|(_, value)| value.as_str())
            .unwrap();
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn encode_register_form_params() {
        let params = encode(&config());

        assert_eq!(
            params,
            vec![
                ("userName".to_owned(), "user".to_owned()),
                ("password".to_owned(), "pass".to_owned()),
                ("orderNumber".to_owned(), "1234567890".to_owned()),
                ("amount".to_owned(), "100000".to_owned()),
                ("currency".to_owned(), "012".to_owned()),
                ("returnUrl".to_owned(), "https://shop.example/ok".to_owned()),
                ("failUrl".to_owned(), "https://shop.example/ok".to_owned()),
                ("language".to_owned(), "FR".to_owned()),
                (
                    "jsonParams".to_owned(),
                    r#"{"force_terminal_id":"123456"}"#.to_owned()
                ),
            ]
        );
    }

    #[test]
    fn optional_fields_are_appended_when_set() {
        let mut config = config();
        config
            .description("Order #42")
            .unwrap()
            .timeout(3600)
            .unwrap()
            .fail_url("https://shop.example/ko")
            .unwrap();

        let params = encode(&config);
        assert!(params.contains(&("description".to_owned(), "Order #42".to_owned())));
        assert!(params.contains(&("sessionTimeoutSecs".to_owned(), "3600".to_owned())));
        assert!(params.contains(&("failUrl".to_owned(), "https://shop.example/ko".to_owned())));
    }

    #[test]
    fn json_params_merge_user_fields() {
        let mut config = config();
        config.user_defined_fields([("k1", "v1")]).unwrap();

        let object = json_params(&encode(&config));
        assert_eq!(object["force_terminal_id"], "123456");
        assert_eq!(object["k1"], "v1");
    }

    #[test]
    fn json_params_keep_terminal_id_next_to_sorted_user_fields() {
        let mut config = config();
        config
            .user_defined_fields([("custom", "x"), ("zone", "y")])
            .unwrap();

        let params = encode(&config);
        let raw = params
            .iter()
            .find(|(key, _)| key == JSON_PARAMS_FIELD)
            .map(|(_, value)| value.as_str())
            .unwrap();
        assert_eq!(
            raw,
            r#"{"custom":"x","force_terminal_id":"123456","zone":"y"}"#
        );
    }

    #[test]
    fn user_field_overrides_force_terminal_id() {
        let mut config = config();
        config
            .user_defined_fields([("force_terminal_id", "OVERWRITTEN"), ("custom", "x")])
            .unwrap();

        let object = json_params(&encode(&config));
        assert_eq!(object["force_terminal_id"], "OVERWRITTEN");
        assert_eq!(object["custom"], "x");
    }
}
