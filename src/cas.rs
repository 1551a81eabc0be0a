// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Consolidated Account Statement (CAS) import.
//!
//! A session walks `Idle -> FileSelected -> Previewing -> PreviewReady -> Importing -> Idle`.
//! Previews come from a local mock; the import itself goes to an external
//! parser when one is configured and falls back to the preview otherwise.
//! Any failure puts the session back where it was.

use crate::error::CasError;
use crate::models::{Category, Holding, amount_from_value};
use crate::store::random_id;
use reqwest::blocking::{Client, multipart::Form};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MOCK_DELAY: Duration = Duration::from_millis(700);

/// Category given to imported entries that carry none of their own.
pub const IMPORT_CATEGORY: Category = Category::MutualFunds;

/// One scheme as reported by a parser. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folio: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invested: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
}

fn first_amount(candidates: [Option<&Value>; 2]) -> Decimal {
    candidates
        .into_iter()
        .flatten()
        .map(amount_from_value)
        .find(|d| !d.is_zero())
        .unwrap_or(Decimal::ZERO)
}

impl CasEntry {
    pub fn display_name(&self) -> &str {
        self.scheme
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("Unknown")
    }

    pub fn current_amount(&self) -> Decimal {
        first_amount([self.current_value.as_ref(), self.current.as_ref()])
    }

    pub fn invested_amount(&self) -> Decimal {
        first_amount([self.invested.as_ref(), None])
    }

    pub fn folio_label(&self) -> String {
        match &self.folio {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
            .as_deref()
            .and_then(Category::from_label)
            .unwrap_or(IMPORT_CATEGORY)
    }

    pub fn to_holding(&self) -> Result<Holding, CasError> {
        Ok(Holding {
            id: random_id()?,
            name: self.display_name().to_string(),
            category: self.category(),
            invested: self.invested_amount(),
            current: self.current_amount(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CasFile {
    pub path: PathBuf,
    pub password: Option<String>,
}

/// Something that turns a statement into entries.
pub trait CasParser {
    fn parse(&self, file: &CasFile) -> Result<Vec<CasEntry>, CasError>;
}

/// Local stand-in that answers after a fixed delay with two canned schemes.
#[derive(Debug, Clone)]
pub struct MockParser {
    pub delay: Duration,
}

impl Default for MockParser {
    fn default() -> Self {
        Self { delay: MOCK_DELAY }
    }
}

impl MockParser {
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }
}

impl CasParser for MockParser {
    fn parse(&self, _file: &CasFile) -> Result<Vec<CasEntry>, CasError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let canned = [
            ("HDFC Midcap Opportunities", "1234567", 125_000),
            ("SBI Bluechip Fund", "7654321", 86_000),
        ];
        Ok(canned
            .into_iter()
            .map(|(scheme, folio, value)| CasEntry {
                scheme: Some(scheme.to_string()),
                folio: Some(Value::from(folio)),
                current_value: Some(Value::from(value)),
                ..CasEntry::default()
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<Vec<CasEntry>>,
    #[serde(default)]
    message: Option<String>,
}

/// External parser reached at `POST {base}/parse_cas`.
pub struct RemoteParser {
    client: Client,
    base_url: String,
}

impl RemoteParser {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/parse_cas", self.base_url)
    }
}

impl CasParser for RemoteParser {
    fn parse(&self, file: &CasFile) -> Result<Vec<CasEntry>, CasError> {
        let mut form = Form::new().file("file", &file.path).map_err(|source| CasError::File {
            path: file.path.display().to_string(),
            source,
        })?;
        if let Some(pw) = file.password.as_ref().filter(|p| !p.is_empty()) {
            form = form.text("password", pw.clone());
        }

        let url = self.endpoint();
        tracing::info!(%url, "uploading statement");
        let resp = self.client.post(&url).multipart(form).send()?;
        let http_status = resp.status();
        let body = resp.text()?;
        tracing::debug!(status = %http_status, bytes = body.len(), "parser responded");

        let parsed: ParseResponse = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(_) if !http_status.is_success() => {
                return Err(CasError::Network(format!("HTTP {}", http_status)));
            }
            Err(e) => return Err(CasError::Decode(e.to_string())),
        };

        if parsed.status.as_deref() == Some("ok") {
            Ok(parsed.data.unwrap_or_default())
        } else {
            Err(CasError::Rejected(
                parsed.message.filter(|m| !m.is_empty()).unwrap_or(body),
            ))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    FileSelected,
    Previewing,
    PreviewReady,
    Importing,
}

#[derive(Debug)]
pub struct ImportSession {
    state: ImportState,
    file: Option<CasFile>,
    preview: Vec<CasEntry>,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    pub fn new() -> Self {
        Self {
            state: ImportState::Idle,
            file: None,
            preview: Vec::new(),
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    pub fn file(&self) -> Option<&CasFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> &[CasEntry] {
        &self.preview
    }

    fn transition(&mut self, to: ImportState) {
        tracing::debug!(from = ?self.state, ?to, "import session");
        self.state = to;
    }

    fn ensure_not_busy(&self) -> Result<(), CasError> {
        match self.state {
            ImportState::Previewing | ImportState::Importing => Err(CasError::Busy),
            _ => Ok(()),
        }
    }

    /// Choose a statement. Any previous preview is dropped.
    pub fn select(&mut self, path: &Path, password: Option<String>) -> Result<(), CasError> {
        self.ensure_not_busy()?;
        let meta = std::fs::metadata(path).map_err(|source| CasError::File {
            path: path.display().to_string(),
            source,
        })?;
        if !meta.is_file() {
            return Err(CasError::File {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file"),
            });
        }
        self.file = Some(CasFile {
            path: path.to_path_buf(),
            password: password.filter(|p| !p.is_empty()),
        });
        self.preview.clear();
        self.transition(ImportState::FileSelected);
        Ok(())
    }

    pub fn run_preview(&mut self, parser: &dyn CasParser) -> Result<&[CasEntry], CasError> {
        self.ensure_not_busy()?;
        let file = self.file.clone().ok_or(CasError::NoFileSelected)?;
        let prior = self.state;
        self.transition(ImportState::Previewing);
        match parser.parse(&file) {
            Ok(entries) => {
                self.preview = entries;
                self.transition(ImportState::PreviewReady);
                Ok(&self.preview)
            }
            Err(e) => {
                self.transition(prior);
                Err(match e {
                    CasError::Preview(_) | CasError::File { .. } => e,
                    other => CasError::Preview(other.to_string()),
                })
            }
        }
    }

    /// Produce the batch to merge. `backend` wins over the preview when given.
    ///
    /// `pick` holds 1-based entry numbers; empty means every entry.
    pub fn run_import(
        &mut self,
        backend: Option<&dyn CasParser>,
        pick: &[usize],
    ) -> Result<Vec<Holding>, CasError> {
        self.ensure_not_busy()?;
        let file = self.file.clone().ok_or(CasError::NoFileSelected)?;
        if backend.is_none() && self.state != ImportState::PreviewReady {
            return Err(CasError::NoPreview);
        }
        let prior = self.state;
        self.transition(ImportState::Importing);

        let result: Result<Vec<Holding>, CasError> = match backend {
            Some(parser) => parser.parse(&file),
            None => Ok(self.preview.clone()),
        }
        .and_then(|entries| select_entries(entries, pick))
        .and_then(|entries| entries.iter().map(CasEntry::to_holding).collect());

        match result {
            Ok(batch) => {
                self.file = None;
                self.preview.clear();
                self.transition(ImportState::Idle);
                Ok(batch)
            }
            Err(e) => {
                self.transition(prior);
                Err(e)
            }
        }
    }
}

fn select_entries(entries: Vec<CasEntry>, pick: &[usize]) -> Result<Vec<CasEntry>, CasError> {
    if pick.is_empty() {
        return Ok(entries);
    }
    pick.iter()
        .map(|&n| {
            n.checked_sub(1)
                .and_then(|i| entries.get(i))
                .cloned()
                .ok_or_else(|| CasError::NoSuchEntry {
                    index: n,
                    available: entries.len(),
                })
        })
        .collect()
}
