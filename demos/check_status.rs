use std::io;

use satim::{Credentials, SatimClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let env = |name: &str| {
        std::env::var(name).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{name} environment variable is required"),
            )
        })
    };
    let credentials = Credentials::new(
        env("SATIM_USERNAME")?,
        env("SATIM_PASSWORD")?,
        env("SATIM_TERMINAL_ID")?,
    )?;
    let order_id = env("SATIM_ORDER_ID")?;

    let mut client = SatimClient::new(credentials)?;
    client.test_mode(std::env::var("SATIM_PRODUCTION").is_err());
    client.status(&order_id).await?;

    println!(
        "successful: {}, rejected: {}, refunded: {}, cancelled: {}, expired: {}",
        client.is_successful()?,
        client.is_rejected()?,
        client.is_refunded()?,
        client.is_cancelled()?,
        client.is_expired()?
    );
    if client.is_successful()? {
        println!(
            "{} (approval code: {:?}, card: {:?}, holder: {:?})",
            client.success_message()?,
            client.approval_code()?,
            client.card_pan()?,
            client.card_holder_name()?
        );
    } else {
        println!("{}", client.error_message()?);
    }

    Ok(())
}
