//! Applying computed edits to source files.
//!
//! Edits are grouped by file. Each file is loaded into a [`FileBuffer`] that is owned
//! exclusively while that file's edits run; the file is written back only if every edit
//! succeeded. A failure on one file is recorded and the remaining files are still processed.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use refq_core::{FileId, RefactorEdit};
use serde::Serialize;
use thiserror::Error;

use crate::buffer::{EditError, FileBuffer};
use crate::directive::TargetEdits;

/// Post-edit text of a matched line, for user-facing display.
///
/// This is the literal content of the edited line; it may be a partial statement when a
/// merge did not reach a terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinePreview {
    pub file: FileId,
    pub line: u32,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("no source text for {0}")]
    MissingFile(FileId),
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Where file contents come from and go to.
pub trait SourceStore {
    fn read(&self, file: &FileId) -> Result<String, ApplyError>;
    fn write(&mut self, file: &FileId, text: &str) -> Result<(), ApplyError>;
}

impl SourceStore for BTreeMap<FileId, String> {
    fn read(&self, file: &FileId) -> Result<String, ApplyError> {
        self.get(file)
            .cloned()
            .ok_or_else(|| ApplyError::MissingFile(file.clone()))
    }

    fn write(&mut self, file: &FileId, text: &str) -> Result<(), ApplyError> {
        self.insert(file.clone(), text.to_owned());
        Ok(())
    }
}

/// Files on disk, addressed relative to `root` unless a [`FileId`] is absolute.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
    dry_run: bool,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
        }
    }

    /// Read files but never write them back.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, file: &FileId) -> PathBuf {
        let candidate = PathBuf::from(file.as_str());
        if candidate.is_absolute() {
            candidate
        } else {
            self.root.join(candidate)
        }
    }
}

impl SourceStore for DiskStore {
    fn read(&self, file: &FileId) -> Result<String, ApplyError> {
        let path = self.path_for(file);
        fs::read_to_string(&path).map_err(|source| ApplyError::Read {
            path: path.display().to_string(),
            source,
        })
    }

    fn write(&mut self, file: &FileId, text: &str) -> Result<(), ApplyError> {
        if self.dry_run {
            return Ok(());
        }
        let path = self.path_for(file);
        atomic_write(&path, text.as_bytes()).map_err(|source| ApplyError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Write through a temporary file in the same directory, then rename over `path`.
fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = fs::metadata(path) {
        // Keep the original file mode; a fresh temp file is owner-only.
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub file: FileId,
    pub original: String,
    pub modified: String,
    pub edit_count: usize,
}

#[derive(Debug)]
pub struct FileFailure {
    pub file: FileId,
    pub error: ApplyError,
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    pub changes: Vec<FileChange>,
    pub previews: Vec<LinePreview>,
    pub failures: Vec<FileFailure>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Group edits by file in deterministic order, keeping each file's edits in input order.
pub fn group_by_file<'a>(
    edits: impl IntoIterator<Item = &'a RefactorEdit>,
) -> BTreeMap<FileId, Vec<RefactorEdit>> {
    let mut map: BTreeMap<FileId, Vec<RefactorEdit>> = BTreeMap::new();
    for edit in edits {
        map.entry(edit.file.clone()).or_default().push(edit.clone());
    }
    map
}

/// Apply per-target edit lists to the files in `store`.
pub fn apply_edits(store: &mut dyn SourceStore, targets: &[TargetEdits]) -> ApplyReport {
    let mut by_file: BTreeMap<&FileId, Vec<&TargetEdits>> = BTreeMap::new();
    for target in targets {
        by_file.entry(&target.file).or_default().push(target);
    }

    let mut report = ApplyReport::default();
    for (file, file_targets) in by_file {
        match apply_file(store, file, &file_targets) {
            Ok((change, previews)) => {
                if let Some(change) = change {
                    report.changes.push(change);
                }
                report.previews.extend(previews);
            }
            Err(error) => {
                tracing::warn!(
                    target: "refq.refactor",
                    file = %file,
                    error = %error,
                    "file left unchanged"
                );
                report.failures.push(FileFailure {
                    file: file.clone(),
                    error,
                });
            }
        }
    }
    report
}

fn apply_file(
    store: &mut dyn SourceStore,
    file: &FileId,
    targets: &[&TargetEdits],
) -> Result<(Option<FileChange>, Vec<LinePreview>), ApplyError> {
    let original = store.read(file)?;
    let mut buffer = FileBuffer::from_text(file.clone(), &original);

    let edits: Vec<RefactorEdit> = targets
        .iter()
        .flat_map(|target| target.edits.iter().cloned())
        .collect();

    let map = buffer.apply_edits(&edits)?;

    let previews = targets
        .iter()
        .filter_map(|target| {
            let current = map.current_line(target.line)?;
            Some(LinePreview {
                file: file.clone(),
                line: target.line,
                text: buffer.line(current)?.to_owned(),
            })
        })
        .collect();

    let modified = buffer.to_text();
    if modified == original {
        return Ok((None, previews));
    }
    store.write(file, &modified)?;
    tracing::info!(
        target: "refq.refactor",
        file = %file,
        edits = edits.len(),
        "rewrote file"
    );

    Ok((
        Some(FileChange {
            file: file.clone(),
            original,
            modified,
            edit_count: edits.len(),
        }),
        previews,
    ))
}
