use std::io;

use satim::{Credentials, SatimClient};
use tracing_subscriber::EnvFilter;

fn required_env(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let credentials = Credentials::new(
        required_env("SATIM_USERNAME")?,
        required_env("SATIM_PASSWORD")?,
        required_env("SATIM_TERMINAL_ID")?,
    )?;
    let return_url = required_env("SATIM_RETURN_URL")?;
    let amount: i64 = std::env::var("SATIM_AMOUNT")
        .unwrap_or_else(|_| "1000".to_owned())
        .parse()?;

    let mut client = SatimClient::new(credentials)?;
    client.test_mode(std::env::var("SATIM_PRODUCTION").is_err());
    client
        .config_mut()
        .amount(amount)?
        .return_url(&return_url)?
        .language("en")?
        .description("Demo order")?;
    if let Ok(fail_url) = std::env::var("SATIM_FAIL_URL") {
        client.config_mut().fail_url(&fail_url)?;
    }

    client.register().await?;

    println!(
        "order number: {:?}, order id: {:?}, form url: {}",
        client.config().order_number_value(),
        client.order_id()?,
        client.form_url()?
    );

    Ok(())
}
