use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{info, warn};
use tokio::{fs, io::AsyncWriteExt};

use crate::{
    event::Event,
    missing_start_error::MissingStartError,
    text_manipulators::{document_file_stem, sanitize_filename},
};

const DOCUMENT_EXTENSION: &str = "md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    AlreadyArchived(PathBuf),
}

/// Lays events out as `<root>/<year>/<month>/<day>/<title>.md`.
pub struct DocumentWriter {
    root: PathBuf,
}

impl DocumentWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn target_path(&self, event: &Event) -> Result<PathBuf, MissingStartError> {
        let Some(start) = event.start.as_deref().filter(|start| !start.is_empty()) else {
            return Err(MissingStartError {
                title: event.title.clone(),
            });
        };

        let mut path = self.root.clone();
        for segment in start.split('-').map(sanitize_filename) {
            if !segment.is_empty() && segment != "." && segment != ".." {
                path.push(segment);
            }
        }
        path.push(format!(
            "{}.{}",
            document_file_stem(&event.title),
            DOCUMENT_EXTENSION
        ));
        Ok(path)
    }

    /// Whether this event already has a document on disk.
    pub async fn is_archived(&self, event: &Event) -> anyhow::Result<bool> {
        let path = self.target_path(event)?;
        let exists = fs::try_exists(&path)
            .await
            .with_context(|| format!("failed to check {}", path.display()))?;
        Ok(exists)
    }

    /// Writes the event's document. An existing document is left untouched.
    ///
    /// The content goes to a hidden `.partial` sibling first and is linked
    /// into place only once complete, so a failed write never leaves a
    /// document that later runs would treat as archived.
    pub async fn write(&self, event: &Event) -> anyhow::Result<WriteOutcome> {
        let path = self.target_path(event)?;
        let doc = event.front_matter()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        if fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(WriteOutcome::AlreadyArchived(path));
        }

        let partial = partial_path(&path);
        if let Err(e) = write_partial(&partial, &doc).await {
            discard_partial(&partial).await;
            return Err(e);
        }

        let linked = fs::hard_link(&partial, &path).await;
        discard_partial(&partial).await;
        match linked {
            Ok(()) => {
                info!("writing {}", path.display());
                Ok(WriteOutcome::Written(path))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Ok(WriteOutcome::AlreadyArchived(path))
            }
            Err(e) => Err(e).with_context(|| format!("failed to create {}", path.display())),
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.partial"))
}

async fn write_partial(partial: &Path, doc: &str) -> anyhow::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(partial)
        .await
        .with_context(|| format!("failed to create {}", partial.display()))?;
    file.write_all(doc.as_bytes())
        .await
        .with_context(|| format!("failed to write {}", partial.display()))?;
    file.sync_all()
        .await
        .with_context(|| format!("failed to sync {}", partial.display()))?;
    Ok(())
}

async fn discard_partial(partial: &Path) {
    if let Err(e) = fs::remove_file(partial).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("could not remove {}: {}", partial.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devconf() -> Event {
        Event {
            title: "Dev Conf".to_string(),
            location: "Berlin, Germany".to_string(),
            start: Some("2015-01-10".to_string()),
            ..Event::default()
        }
    }

    #[test]
    fn path_follows_start_date_and_title() {
        let writer = DocumentWriter::new("/out");
        assert_eq!(
            writer.target_path(&devconf()).unwrap(),
            PathBuf::from("/out/2015/01/10/Dev_Conf.md")
        );
    }

    #[test]
    fn path_segments_cannot_escape_root() {
        let writer = DocumentWriter::new("/out");
        let event = Event {
            start: Some("..-../etc-10".to_string()),
            ..devconf()
        };
        assert_eq!(
            writer.target_path(&event).unwrap(),
            PathBuf::from("/out/..etc/10/Dev_Conf.md")
        );
    }

    #[test]
    fn missing_or_empty_start_has_no_path() {
        let writer = DocumentWriter::new("/out");
        let mut event = devconf();
        event.start = None;
        assert!(writer.target_path(&event).is_err());
        event.start = Some(String::new());
        assert!(writer.target_path(&event).is_err());
    }

    #[tokio::test]
    async fn writes_exactly_one_document() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocumentWriter::new(dir.path());

        let outcome = writer.write(&devconf()).await.unwrap();

        let expected = dir.path().join("2015").join("01").join("10").join("Dev_Conf.md");
        assert_eq!(outcome, WriteOutcome::Written(expected.clone()));
        let day_dir: Vec<_> = std::fs::read_dir(expected.parent().unwrap())
            .unwrap()
            .collect();
        assert_eq!(day_dir.len(), 1);
        assert_eq!(
            std::fs::read_to_string(&expected).unwrap(),
            devconf().front_matter().unwrap()
        );
        assert!(writer.is_archived(&devconf()).await.unwrap());
    }

    #[tokio::test]
    async fn existing_document_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocumentWriter::new(dir.path());
        writer.write(&devconf()).await.unwrap();
        let path = writer.target_path(&devconf()).unwrap();
        let before = std::fs::read(&path).unwrap();

        let changed = Event {
            location: "Elsewhere".to_string(),
            ..devconf()
        };
        let outcome = writer.write(&changed).await.unwrap();

        assert_eq!(outcome, WriteOutcome::AlreadyArchived(path.clone()));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn failed_write_leaves_no_document_behind() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocumentWriter::new(dir.path());
        let path = writer.target_path(&devconf()).unwrap();
        // A directory squatting on the partial file's name makes the write fail.
        std::fs::create_dir_all(partial_path(&path)).unwrap();

        assert!(writer.write(&devconf()).await.is_err());

        assert!(!path.exists());
        assert!(!writer.is_archived(&devconf()).await.unwrap());

        std::fs::remove_dir(partial_path(&path)).unwrap();
        let outcome = writer.write(&devconf()).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Written(path.clone()));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            devconf().front_matter().unwrap()
        );
    }

    #[tokio::test]
    async fn stale_partial_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocumentWriter::new(dir.path());
        let path = writer.target_path(&devconf()).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(partial_path(&path), "---\ntruncat").unwrap();

        writer.write(&devconf()).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            devconf().front_matter().unwrap()
        );
        assert!(!partial_path(&path).exists());
    }

    #[tokio::test]
    async fn missing_start_is_an_error_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DocumentWriter::new(dir.path());
        let event = Event {
            start: None,
            ..devconf()
        };

        let err = writer.write(&event).await.unwrap_err();

        assert!(err.downcast_ref::<MissingStartError>().is_some());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
