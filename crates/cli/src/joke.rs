// Copyright (C) 2025 Micah R Ledbetter
// SPDX-License-Identifier: Apache-2.0

//! This module draws random Pantheon names until one is suitable for
//! joke-making, then quotifies it with its Wikipedia url attached.

use thiserror::Error;

/// Only names born in the US are drawn, like the original joke.
const JOKE_COUNTRY: &str = "US";

#[derive(Error, Debug)]
pub enum JokeError {
    #[error("the store has no {0} records")]
    EmptyCountry(String),

    #[error("no suitable record found after {0} draws")]
    NoSuitableRecord(usize),

    #[error("reference url resolution failed: {0}")]
    Resolve(String),

    #[error(transparent)]
    Store(#[from] pantheon::StoreError),

    #[error(transparent)]
    Quotify(#[from] quotify::Error),
}

/// The collaborator that turns a curid into a reference url. A trait so
/// tests can stub the network away.
pub trait ReferenceResolver {
    fn resolve(&self, curid: &str) -> Result<String, JokeError>;
}

pub struct WikipediaResolver(pub wikipedia::Client);

impl ReferenceResolver for WikipediaResolver {
    fn resolve(&self, curid: &str) -> Result<String, JokeError> {
        self.0
            .page_url(curid)
            .map_err(|e| JokeError::Resolve(e.to_string()))
    }
}

/// Redraw random records until the name splits into exactly two tokens.
///
/// Without a `max_draws` cap this keeps drawing forever when the dataset
/// holds no two-token name for the country; the cap turns that hang into
/// a [JokeError::NoSuitableRecord]. A store with no matching country row
/// at all fails immediately instead of spinning.
pub fn pick_random_suitable(
    rt: &tokio::runtime::Runtime,
    db: &pantheon::Db,
    resolver: &impl ReferenceResolver,
    emoji: bool,
    max_draws: Option<usize>,
) -> Result<String, JokeError> {
    let mut draws = 0;
    let record = loop {
        draws += 1;
        if let Some(max) = max_draws {
            if draws > max {
                return Err(JokeError::NoSuitableRecord(max));
            }
        }
        let record = rt
            .block_on(db.random_by_country(JOKE_COUNTRY))?
            .ok_or_else(|| JokeError::EmptyCountry(JOKE_COUNTRY.to_string()))?;
        if record.name.split(' ').count() == 2 {
            break record;
        }
        tracing::debug!(name = record.name.as_str(), "Discarding an unsuitable name");
    };
    let reference_url = resolver.resolve(&record.curid)?;
    Ok(quotify::quotify(&record.name, emoji, &reference_url)?)
}
