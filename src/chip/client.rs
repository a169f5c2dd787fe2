use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Builds the HTTP client used to talk to the chip-tool bridge. Commands
/// can take a while when chip-tool retries on the radio, so the timeout is
/// configurable rather than reqwest's default.
pub fn new_client(timeout: Duration) -> Result<Client, ChipClientError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(client)
}

#[derive(Error, Debug)]
pub enum ChipClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
}
