//! Transport layer: wire-format details (form encoding and response decoding).

mod order;
mod register;
mod response;
mod value;

pub use order::encode_order_form;
pub use register::encode_register_form;
pub use response::decode_gateway_response;
