use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::redirect_resolver::{ArchiveMirror, Probe};

enum Entry {
    Redirect(String),
    Page(String),
    Status(StatusCode),
    Broken,
    Unfetchable,
}

/// In-memory mirror that records every probe and fetch it serves.
/// Unknown paths answer 404.
#[derive(Default)]
pub struct FakeMirror {
    entries: HashMap<String, Entry>,
    probes: Mutex<Vec<String>>,
    fetches: Mutex<Vec<String>>,
}

impl FakeMirror {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, path: &str, entry: Entry) -> Self {
        self.entries.insert(path.to_string(), entry);
        self
    }

    pub fn redirect(self, path: &str, location: &str) -> Self {
        self.with(path, Entry::Redirect(location.to_string()))
    }

    pub fn page(self, path: &str, body: &str) -> Self {
        self.with(path, Entry::Page(body.to_string()))
    }

    pub fn missing(self, path: &str) -> Self {
        self.with(path, Entry::Status(StatusCode::NOT_FOUND))
    }

    pub fn status(self, path: &str, status: StatusCode) -> Self {
        self.with(path, Entry::Status(status))
    }

    pub fn broken(self, path: &str) -> Self {
        self.with(path, Entry::Broken)
    }

    pub fn unfetchable(self, path: &str) -> Self {
        self.with(path, Entry::Unfetchable)
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveMirror for FakeMirror {
    async fn probe(&self, path: &str) -> anyhow::Result<Probe> {
        self.probes.lock().unwrap().push(path.to_string());
        let (status, location) = match self.entries.get(path) {
            Some(Entry::Redirect(location)) => (StatusCode::FOUND, Some(location.clone())),
            Some(Entry::Page(_)) | Some(Entry::Unfetchable) => (StatusCode::OK, None),
            Some(Entry::Status(status)) => (*status, None),
            Some(Entry::Broken) => anyhow::bail!("connection reset"),
            None => (StatusCode::NOT_FOUND, None),
        };
        Ok(Probe { status, location })
    }

    async fn fetch(&self, path: &str) -> anyhow::Result<String> {
        self.fetches.lock().unwrap().push(path.to_string());
        match self.entries.get(path) {
            Some(Entry::Page(body)) => Ok(body.clone()),
            _ => anyhow::bail!("GET {path} failed"),
        }
    }
}
