use std::io;

use satim::{Credentials, SatimClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Same shape as a JSON config file: {"username", "password", "terminal_id"}.
    let config = std::env::var("SATIM_CREDENTIALS_JSON").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SATIM_CREDENTIALS_JSON environment variable is required",
        )
    })?;
    let credentials = Credentials::from_value(&serde_json::from_str::<serde_json::Value>(&config)?)?;

    let order_id = std::env::var("SATIM_ORDER_ID").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SATIM_ORDER_ID environment variable is required",
        )
    })?;
    let amount: i64 = std::env::var("SATIM_REFUND_AMOUNT")
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "SATIM_REFUND_AMOUNT environment variable is required",
            )
        })?
        .parse()?;

    let mut client = SatimClient::new(credentials)?;
    client.test_mode(std::env::var("SATIM_PRODUCTION").is_err());
    let response = client.refund(&order_id, amount).await?;

    println!("refund response: {:?}", response.fields());

    Ok(())
}
