use std::time::Duration;

use log::{error, info};
use reqwest::blocking::Client;

use crate::error::{EtaError, Result};

pub const PORT: u16 = 8080;
pub const API_VERSION_PATH: &str = "/user/api";
pub const MENU_PATH: &str = "/user/menu";
pub const VARIABLE_PATH: &str = "/user/var";

pub const SUPPORTED_API_VERSIONS: &[&str] = &["1.2", "1.1", "1.0"];

pub(crate) fn base_url(host: &str) -> String {
    format!("http://{}:{}", host, PORT)
}

pub(crate) fn variable_url(base_url: &str, uri: &str) -> String {
    format!("{}{}{}", base_url, VARIABLE_PATH, uri)
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub url: String,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends GET requests to the heating controller. [`HttpTransport`] is used
/// unless another implementation is passed to
/// [`crate::EtaClientBuilder::transport`].
pub trait Transport {
    fn get(&self, url: &str) -> Result<Response>;
}

/// Blocking [`reqwest`] based transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Without a timeout requests wait indefinitely, overriding reqwest's
    /// 30 second default of the blocking client.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport { client, timeout })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text()?;
        Ok(Response { status, url, body })
    }
}

/// Sends a GET request and returns the body. Any status outside of 2xx is
/// an error carrying status, url and body.
pub(crate) fn request(transport: &dyn Transport, url: &str) -> Result<String> {
    let response = transport.get(url)?;
    info!("[eta api] GET {} status: {}", response.url, response.status);

    if !response.is_success() {
        error!(
            "Error on communication. ({}, {}) {}",
            response.status, response.url, response.body
        );
        return Err(EtaError::ApiRequest {
            status: response.status,
            url: response.url,
            body: response.body,
        });
    }
    Ok(response.body)
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
