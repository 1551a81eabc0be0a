// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("could not serialize holdings: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not allocate a free holding id")]
    IdSpaceExhausted,
    #[error("random source unavailable: {0}")]
    Random(String),
}

/// Failures of the CAS preview/import flow. All of them leave the session where it was.
#[derive(Debug, Error)]
pub enum CasError {
    #[error("Select a CAS PDF first")]
    NoFileSelected,
    #[error("Preview the statement first (no backend is configured)")]
    NoPreview,
    #[error("An import step is already running")]
    Busy,
    #[error("Preview failed: {0}")]
    Preview(String),
    #[error("Could not read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Upload error: {0}")]
    Network(String),
    #[error("Parsing failed: {0}")]
    Rejected(String),
    #[error("Upload error: unexpected response body: {0}")]
    Decode(String),
    #[error("No preview entry #{index} (have {available})")]
    NoSuchEntry { index: usize, available: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for CasError {
    fn from(e: reqwest::Error) -> Self {
        CasError::Network(e.to_string())
    }
}
