use crate::domain::{Amount, Credentials, Language, OrderId, Password, Username};

/// Build the form shared by `/confirmOrder.do`, `/getOrderStatus.do` and `/refund.do`.
///
/// `refund_amount` is only set for refunds.
pub fn encode_order_form(
    credentials: &Credentials,
    order_id: &OrderId,
    language: Language,
    refund_amount: Option<Amount>,
) -> Vec<(String, String)> {
    let mut params = vec![
        (
            Username::FIELD.to_owned(),
            credentials.username().as_str().to_owned(),
        ),
        (
            Password::FIELD.to_owned(),
            credentials.password().as_str().to_owned(),
        ),
        (OrderId::FIELD.to_owned(), order_id.as_str().to_owned()),
    ];
    if let Some(amount) = refund_amount {
        params.push((Amount::FIELD.to_owned(), amount.minor_units().to_string()));
    }
    params.push((Language::FIELD.to_owned(), language.as_str().to_owned()));
    params
}
