// Copyright (C) 2025 Micah R Ledbetter
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! This library posts statuses to a Mastodon-compatible server.
//!
//! The client only needs the two calls the application uses: checking
//! that the access token works, and publishing one status.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// The publisher error.
#[derive(Error, Debug)]
pub enum Error {
    /// The server url could not be parsed.
    #[error("bad server url: {0}")]
    BadUrl(#[from] url::ParseError),

    /// The server request failed.
    #[error("publisher request failed: {0}")]
    Request(#[from] Box<ureq::Error>),

    /// The server response could not be decoded.
    #[error("publisher response decode failed: {0}")]
    Decode(#[from] std::io::Error),
}

/// The credentials of the status server, built once at the boundary.
#[derive(Clone)]
pub struct Credentials {
    /// The server base url, e.g. `https://botsin.space`.
    pub server_url: String,
    /// The bearer token of the posting account.
    pub access_token: String,
}

/// The account returned by a successful credential check.
#[derive(Deserialize, Debug)]
pub struct Account {
    /// The account handle.
    pub acct: String,
}

/// The status returned by a successful post.
#[derive(Deserialize, Debug)]
pub struct Status {
    /// The server-assigned status id.
    pub id: String,
    /// The public url of the status, when the server provides one.
    pub url: Option<String>,
}

/// The status server client.
pub struct Client {
    agent: ureq::Agent,
    base: Url,
    token: String,
}

impl Client {
    /// Create a client from the boundary credentials.
    pub fn new(agent: ureq::Agent, credentials: &Credentials) -> Result<Client, Error> {
        let base = Url::parse(&credentials.server_url)?;
        Ok(Client {
            agent,
            base,
            token: credentials.access_token.clone(),
        })
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Check that the access token works.
    pub fn verify_credentials(&self) -> Result<Account, Error> {
        let url = self.base.join("/api/v1/accounts/verify_credentials")?;
        let response = self
            .agent
            .get(url.as_str())
            .set("Authorization", &self.authorization())
            .call()
            .map_err(Box::new)?;
        Ok(response.into_json()?)
    }

    /// Publish one status.
    pub fn post_status(&self, text: &str) -> Result<Status, Error> {
        let url = self.base.join("/api/v1/statuses")?;
        tracing::debug!(url = url.as_str(), "Posting the status");
        let response = self
            .agent
            .post(url.as_str())
            .set("Authorization", &self.authorization())
            .send_form(&[("status", text)])
            .map_err(Box::new)?;
        Ok(response.into_json()?)
    }
}
