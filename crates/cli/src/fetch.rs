// Copyright (C) 2025 Micah R Ledbetter
// SPDX-License-Identifier: Apache-2.0

//! This module downloads the Pantheon tsv dataset.

use anyhow::{Context, Result};
use std::path::Path;

pub fn download(agent: &ureq::Agent, url: &str, dest: &Path) -> Result<()> {
    tracing::info!(url, dest = ?dest, "Downloading the dataset");
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let response = agent
        .get(url)
        .call()
        .with_context(|| format!("Fetching {}", url))?;
    let mut inp = response.into_reader();
    let mut out =
        std::fs::File::create(dest).with_context(|| format!("Creating {:?}", dest))?;
    std::io::copy(&mut inp, &mut out).context("Writing the dataset")?;
    Ok(())
}
