//! Where finished artifacts go.
//!
//! Encoders never touch the filesystem or open windows themselves; the
//! façade hands each artifact to an [`ArtifactSink`] supplied by the host.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::thread::JoinHandle;
use tracing::{debug, info};

use crate::csv::CSV_MIME;
use crate::document::DOCUMENT_MIME;
use crate::error::ExportError;
use crate::request::ExportFormat;
use crate::xlsx::WORKBOOK_MIME;

/// The output of one export call. Owned by whoever receives it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportArtifact {
    Csv {
        filename: String,
        text: String,
    },
    /// Markup destined for a print surface.
    Document {
        filename: String,
        title: String,
        markup: String,
    },
    Workbook {
        filename: String,
        bytes: Vec<u8>,
    },
}

impl ExportArtifact {
    pub fn filename(&self) -> &str {
        match self {
            Self::Csv { filename, .. }
            | Self::Document { filename, .. }
            | Self::Workbook { filename, .. } => filename,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv { .. } => CSV_MIME,
            Self::Document { .. } => DOCUMENT_MIME,
            Self::Workbook { .. } => WORKBOOK_MIME,
        }
    }

    pub fn format(&self) -> ExportFormat {
        match self {
            Self::Csv { .. } => ExportFormat::Csv,
            Self::Document { .. } => ExportFormat::Pdf,
            Self::Workbook { .. } => ExportFormat::Xlsx,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Csv { text, .. } => text.as_bytes(),
            Self::Document { markup, .. } => markup.as_bytes(),
            Self::Workbook { bytes, .. } => bytes,
        }
    }
}

/// Host-side delivery of artifacts: a download, a saved file, a print
/// dialog.
pub trait ArtifactSink {
    /// Take ownership of `artifact` and deliver it.
    ///
    /// A document whose print surface cannot be opened is reported as
    /// [`ExportError::RenderTargetUnavailable`].
    fn deliver(&mut self, artifact: ExportArtifact) -> Result<(), ExportError>;
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for &mut S {
    fn deliver(&mut self, artifact: ExportArtifact) -> Result<(), ExportError> {
        (**self).deliver(artifact)
    }
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for Box<S> {
    fn deliver(&mut self, artifact: ExportArtifact) -> Result<(), ExportError> {
        (**self).deliver(artifact)
    }
}

/// Keeps delivered artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Vec<ExportArtifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &[ExportArtifact] {
        &self.artifacts
    }

    pub fn take(&mut self) -> Vec<ExportArtifact> {
        std::mem::take(&mut self.artifacts)
    }
}

impl ArtifactSink for MemorySink {
    fn deliver(&mut self, artifact: ExportArtifact) -> Result<(), ExportError> {
        self.artifacts.push(artifact);
        Ok(())
    }
}

/// Writes artifacts into a directory and optionally opens documents with a
/// print command.
///
/// Print viewers are never killed. Each one is waited on by a background
/// thread so it is reaped when it exits, however long the host runs.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    print_command: Option<String>,
    written: Vec<PathBuf>,
    viewers: Vec<JoinHandle<io::Result<ExitStatus>>>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            print_command: None,
            written: Vec::new(),
            viewers: Vec::new(),
        }
    }

    /// Open delivered documents with `command` (program followed by
    /// optional arguments, whitespace separated). The file path is appended.
    pub fn with_print_command(mut self, command: impl Into<String>) -> Self {
        self.print_command = Some(command.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, oldest first.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Block until every print viewer launched so far has exited.
    pub fn wait_for_viewers(&mut self) -> Vec<io::Result<ExitStatus>> {
        self.viewers
            .drain(..)
            .map(|reaper| {
                reaper
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("print viewer reaper panicked")))
            })
            .collect()
    }

    fn open_print_surface(
        command: &str,
        path: &Path,
    ) -> Result<JoinHandle<io::Result<ExitStatus>>, ExportError> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            ExportError::RenderTargetUnavailable("print command is empty".into())
        })?;

        let mut child = Command::new(program)
            .args(parts)
            .arg(path)
            .spawn()
            .map_err(|e| ExportError::RenderTargetUnavailable(format!("{program}: {e}")))?;

        let pid = child.id();
        debug!(pid, program, "Opened print surface");
        let reaper = std::thread::Builder::new()
            .name(format!("print-viewer-{pid}"))
            .spawn(move || child.wait())?;
        Ok(reaper)
    }
}

impl ArtifactSink for FileSink {
    fn deliver(&mut self, artifact: ExportArtifact) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(artifact.filename());
        std::fs::write(&path, artifact.as_bytes())?;
        info!(
            path = %path.display(),
            mime = artifact.mime_type(),
            bytes = artifact.as_bytes().len(),
            "Wrote export artifact"
        );
        self.written.push(path.clone());

        if let (ExportArtifact::Document { .. }, Some(command)) = (&artifact, &self.print_command) {
            let reaper = Self::open_print_surface(command, &path)?;
            self.viewers.retain(|viewer| !viewer.is_finished());
            self.viewers.push(reaper);
        }
        Ok(())
    }
}
