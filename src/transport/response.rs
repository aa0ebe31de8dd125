use std::collections::BTreeMap;

use super::value::TransportValue;
use crate::domain::{GatewayResponse, normalize_keys};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response from the gateway: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a gateway JSON body into a [`GatewayResponse`] with canonical keys.
pub fn decode_gateway_response(json: &str) -> Result<GatewayResponse, TransportError> {
    let parsed: BTreeMap<String, TransportValue> = serde_json::from_str(json)?;
    Ok(GatewayResponse::from_fields(normalize_keys(
        parsed
            .into_iter()
            .map(|(key, value)| (key, value.into_field())),
    )))
}

#[cfg(test)]
mod tests {
    use crate::domain::FieldValue;

    use super::*;

    #[test]
    fn decode_register_response() {
        let json = r#"
        {
          "orderId": "9f2b6c1e-7a3b-4c9d-8e0f-123456789abc",
          "formUrl": "https://test.satim.dz/payment/merchants/merchant1/main.html?mdOrder=9f2b",
          "errorCode": "0"
        }
        "#;

        let response = decode_gateway_response(json).unwrap();
        assert_eq!(response.error_code(), Some("0"));
        assert_eq!(
            response.order_id(),
            Some("9f2b6c1e-7a3b-4c9d-8e0f-123456789abc")
        );
        assert!(response.form_url().unwrap().contains("mdOrder=9f2b"));
    }

    #[test]
    fn decode_status_response_normalizes_casing_and_numbers() {
        let json = r#"
        {
          "expiration": "202701",
          "cardholderName": "JOHN DOE",
          "depositAmount": 100000,
          "currency": "012",
          "approvalCode": "123456",
          "authCode": 2,
          "ErrorCode": "0",
          "ErrorMessage": "Success",
          "OrderStatus": 2,
          "OrderNumber": "1234567890",
          "Pan": "628058**1011",
          "Amount": 100000,
          "Ip": "105.101.1.1",
          "params": {
            "respCode_desc": "Votre paiement a été accepté",
            "respCode": "00"
          },
          "actionCode": 0,
          "actionCodeDescription": "Votre paiement a été accepté"
        }
        "#;

        let response = decode_gateway_response(json).unwrap();
        assert_eq!(response.error_code(), Some("0"));
        assert_eq!(response.order_status(), Some("2"));
        assert_eq!(response.action_code(), Some("0"));
        assert_eq!(response.card_pan(), Some("628058**1011"));
        assert_eq!(response.ip_address(), Some("105.101.1.1"));
        assert_eq!(response.text("amount"), Some("100000"));
        assert!(response.is_successful());
        assert_eq!(response.success_message(), "Votre paiement a été accepté");

        let params = response.get("params").and_then(FieldValue::as_object).unwrap();
        assert_eq!(params.get("respCode").and_then(FieldValue::as_text), Some("00"));
    }

    #[test]
    fn decode_rejects_non_object_bodies() {
        assert!(matches!(
            decode_gateway_response("<html>maintenance</html>"),
            Err(TransportError::Json(_))
        ));
        assert!(decode_gateway_response("[1, 2]").is_err());
    }
}
