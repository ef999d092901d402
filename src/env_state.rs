//! # gaia3d environment state
//!
//! This module defines [`crate::env_state::Gaia3dEnv`], the object owning the
//! network side of the pipeline:
//!
//! - A persistent **HTTP client** ([`reqwest::Client`]) with a default request timeout,
//!   which a single request may override.
//! - A **single-threaded tokio runtime** used to drive the client with `block_on`.
//!
//! The rest of the crate is synchronous. Every network interaction (catalog query,
//! three.js download) goes through this object, one request at a time.
//!
//! ## Structure
//!
//! ```text
//! Gaia3dEnv
//! ├── http_client (reqwest::Client)
//! └── runtime     (tokio current_thread runtime)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use gaia3d::env_state::Gaia3dEnv;
//!
//! let env = Gaia3dEnv::new(Duration::from_secs(30)).unwrap();
//! let response = env.get_from_url("https://gea.esac.esa.int/tap-server/tap/availability").unwrap();
//! println!("{} -> {} bytes", response.status, response.body.len());
//! ```
use std::time::Duration;

use serde::Serialize;

use crate::gaia3d_errors::Gaia3dError;

/// Status code and body of a completed HTTP exchange.
///
/// A non-success status is **not** turned into an error here: the caller decides,
/// since remote services often explain their failures in the body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network environment passed to the components that talk to remote services.
///
/// # Fields
///
/// * `http_client` - reqwest client carrying the timeout and user agent
/// * `runtime` - current-thread runtime, the pipeline never runs two requests at once
#[derive(Debug)]
pub struct Gaia3dEnv {
    http_client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl Gaia3dEnv {
    /// Create a new environment.
    ///
    /// Arguments
    /// ---------
    /// * `timeout`: default timeout of every request (connect + transfer)
    ///
    /// Return
    /// ------
    /// * The environment, or an error if the runtime or the TLS backend cannot be initialised
    pub fn new(timeout: Duration) -> Result<Self, Gaia3dError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gaia3d/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Gaia3dEnv {
            http_client,
            runtime,
        })
    }

    /// Send a form-encoded `POST` request and read the whole body as text.
    ///
    /// Arguments
    /// ---------
    /// * `url`: target of the request
    /// * `form`: fields sent as `application/x-www-form-urlencoded`
    /// * `timeout`: limit for this request, replacing the client's default
    pub fn post_form<F>(
        &self,
        url: &str,
        form: &F,
        timeout: Duration,
    ) -> Result<HttpResponse, Gaia3dError>
    where
        F: Serialize + ?Sized,
    {
        log::debug!("POST {url} (timeout {timeout:?})");
        self.runtime.block_on(async {
            let response = self
                .http_client
                .post(url)
                .timeout(timeout)
                .form(form)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }

    /// Send a `GET` request and read the whole body as text.
    pub fn get_from_url(&self, url: &str) -> Result<HttpResponse, Gaia3dError> {
        log::debug!("GET {url}");
        self.runtime.block_on(async {
            let response = self.http_client.get(url).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}
