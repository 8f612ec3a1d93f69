// Copyright (C) 2025 Micah R Ledbetter
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! This library resolves the canonical Wikipedia page url for a curid.
//!
//! A plain `http://en.wikipedia.org/?curid=<CURID>` link would work, but
//! it does not redirect to the nice url containing the page name, so the
//! client asks the MediaWiki query api for the `fullurl` instead.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

/// The resolver error.
#[derive(Error, Debug)]
pub enum Error {
    /// The api request failed.
    #[error("wikipedia request failed: {0}")]
    Request(#[from] Box<ureq::Error>),

    /// The api response could not be decoded.
    #[error("wikipedia response decode failed: {0}")]
    Decode(#[from] std::io::Error),

    /// The api response does not contain a url for the page.
    #[error("wikipedia page {0} has no url")]
    MissingPage(String),
}

#[derive(Deserialize)]
struct QueryResponse {
    query: Query,
}

#[derive(Deserialize)]
struct Query {
    pages: HashMap<String, Page>,
}

#[derive(Deserialize)]
struct Page {
    fullurl: Option<String>,
}

/// The Wikipedia api client.
pub struct Client {
    agent: ureq::Agent,
    api_base: String,
}

impl Client {
    /// Create a client for the english Wikipedia.
    pub fn new(agent: ureq::Agent) -> Client {
        Client::with_base(agent, "https://en.wikipedia.org")
    }

    /// Create a client for another api base, e.g. a test server.
    pub fn with_base(agent: ureq::Agent, api_base: &str) -> Client {
        Client {
            agent,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve the page url for a curid.
    pub fn page_url(&self, curid: &str) -> Result<String, Error> {
        let url = format!(
            "{}/w/api.php?action=query&prop=info&pageids={}&inprop=url&format=json",
            self.api_base, curid
        );
        tracing::debug!(url = url.as_str(), "Fetching the wikipedia page info");
        let response = self.agent.get(&url).call().map_err(Box::new)?;
        let decoded: QueryResponse = response.into_json()?;
        decoded
            .query
            .pages
            .get(curid)
            .and_then(|page| page.fullurl.clone())
            .ok_or_else(|| Error::MissingPage(curid.to_string()))
    }
}
