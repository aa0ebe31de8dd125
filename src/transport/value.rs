use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::Error as DeError;
use serde_json::value::RawValue;

use crate::domain::{FieldValue, normalize_keys};

/// Response value as sent by SATIM, where scalars may be JSON strings or numbers.
///
/// For numbers and booleans the raw JSON token is preserved (`2` stays `"2"`,
/// `10.00` stays `"10.00"`). Object keys are normalized on the way in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportValue(FieldValue);

impl TransportValue {
    pub fn into_field(self) -> FieldValue {
        self.0
    }
}

impl<'de> Deserialize<'de> for TransportValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: Box<RawValue> = Deserialize::deserialize(deserializer)?;
        let token = raw.get();

        let value = match token.as_bytes().first().copied() {
            Some(b'"') => {
                FieldValue::Text(serde_json::from_str::<String>(token).map_err(D::Error::custom)?)
            }
            Some(b'{') => {
                let map = serde_json::from_str::<BTreeMap<String, TransportValue>>(token)
                    .map_err(D::Error::custom)?;
                FieldValue::Object(normalize_keys(
                    map.into_iter().map(|(key, value)| (key, value.into_field())),
                ))
            }
            Some(b'[') => {
                let items = serde_json::from_str::<Vec<TransportValue>>(token)
                    .map_err(D::Error::custom)?;
                FieldValue::List(items.into_iter().map(TransportValue::into_field).collect())
            }
            Some(b'n') => FieldValue::Null,
            Some(b'-' | b'0'..=b'9' | b't' | b'f') => FieldValue::Text(token.to_owned()),
            _ => return Err(D::Error::custom("unexpected JSON token in gateway response")),
        };
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_keep_their_token_text() {
        let value: TransportValue = serde_json::from_str("10.00").unwrap();
        assert_eq!(value.into_field(), FieldValue::Text("10.00".to_owned()));

        let value: TransportValue = serde_json::from_str("-2007").unwrap();
        assert_eq!(value.into_field(), FieldValue::Text("-2007".to_owned()));
    }

    #[test]
    fn nested_objects_are_normalized() {
        let value: TransportValue =
            serde_json::from_str(r#"{"RespCode": "00", "respCode_desc": "OK"}"#).unwrap();
        let field = value.into_field();
        let map = field.as_object().unwrap();
        assert_eq!(map.get("respCode").and_then(FieldValue::as_text), Some("00"));
        assert_eq!(map.get("respCode_desc").and_then(FieldValue::as_text), Some("OK"));
    }

    #[test]
    fn lists_null_and_booleans() {
        let value: TransportValue = serde_json::from_str(r#"[true, null, "x"]"#).unwrap();
        assert_eq!(
            value.into_field(),
            FieldValue::List(vec![
                FieldValue::Text("true".to_owned()),
                FieldValue::Null,
                FieldValue::Text("x".to_owned()),
            ])
        );
    }
}
