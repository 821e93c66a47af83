use std::{
    fs::File,
    io::{
        BufWriter,
        Write,
    },
    path::Path,
    thread,
    time::Duration,
};

use log::warn;
use reqwest::{
    blocking::{
        Client,
        RequestBuilder,
        Response,
    },
    header::{
        ACCEPT_ENCODING,
        USER_AGENT,
    },
};

use crate::core::KotoError;

const MAX_ATTEMPTS: usize = 3;
const USER_AGENT_VALUE: &str = concat!("kotodeck/", env!("CARGO_PKG_VERSION"), " (+reqwest)");

pub fn http_client() -> Result<Client, KotoError> {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|e| KotoError::Custom(format!("HTTP client build failed: {e}")))
}

/// Sends the request built by `build`, retrying transport failures with a
/// linear backoff. HTTP error statuses are returned to the caller as-is.
pub fn send_with_retry<F>(build: F) -> Result<Response, KotoError>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempts: usize = 0;
    loop {
        attempts += 1;

        match build().header(USER_AGENT, USER_AGENT_VALUE).send() {
            Ok(resp) => return Ok(resp),
            Err(e) if attempts < MAX_ATTEMPTS => {
                warn!("HTTP attempt {} of {} failed: {}", attempts, MAX_ATTEMPTS, e);
                thread::sleep(Duration::from_secs(2 * attempts as u64));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

pub fn download_to_file(client: &Client, url: &str, path: &Path) -> Result<(), KotoError> {
    let mut resp = send_with_retry(|| client.get(url).header(ACCEPT_ENCODING, "identity"))?;
    ensure_success(&resp)?;

    let mut writer = BufWriter::new(File::create(path)?);
    let copied = resp
        .copy_to(&mut writer)
        .map_err(|e| KotoError::Custom(format!("Failed to copy response body from {}: {}", url, e)))?;
    if copied == 0 {
        return Err(KotoError::Custom(format!("Empty response body from {}", url)));
    }
    writer.flush()?;
    Ok(())
}

pub fn ensure_success(resp: &Response) -> Result<(), KotoError> {
    if !resp.status().is_success() {
        return Err(KotoError::Custom(format!(
            "HTTP error {} from {}",
            resp.status(),
            resp.url()
        )));
    }
    Ok(())
}
