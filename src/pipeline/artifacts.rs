//! On-disk layout of a render session.
//!
//! Everything lives under `<output_dir>/CTV_<stem>/`:
//!
//! ```text
//! CTV_demo/
//!   lines/0000.pam            header, then cumulative line images
//!   lines/0003-00042.pam      partial image of line 3 at frame 42
//!   frames/Frame17.pam        composed output frames
//!   _preview.pam              full content on the background
//! ```
//!
//! The final video is written next to the working directory, not inside it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::PipelineError;

/// Whether the working directory was freshly created.
///
/// An existing directory is not an error: the caller decides whether stale
/// artifacts from an earlier run are acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirState {
    Created,
    AlreadyExisting,
}

/// Paths of one session's artifacts.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    video: PathBuf,
}

impl Workspace {
    pub fn new(output_dir: &Path, output_name: &str) -> Self {
        let stem = Path::new(output_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| output_name.to_string());
        Self {
            root: output_dir.join(format!("CTV_{stem}")),
            video: output_dir.join(output_name),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn video_path(&self) -> &Path {
        &self.video
    }

    pub fn lines_dir(&self) -> PathBuf {
        self.root.join("lines")
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }

    /// Full (later cumulative) image of one line; line 0 is the header.
    pub fn line_image(&self, line: usize) -> PathBuf {
        self.lines_dir().join(format!("{line:04}.pam"))
    }

    /// Partially typed line as shown at one frame.
    pub fn partial_image(&self, line: usize, frame: usize) -> PathBuf {
        self.lines_dir().join(format!("{line:04}-{frame:05}.pam"))
    }

    /// Composed output frame.
    pub fn frame_image(&self, frame: usize) -> PathBuf {
        self.frames_dir().join(format!("Frame{frame}.pam"))
    }

    /// Still of the fully typed content.
    pub fn preview_image(&self) -> PathBuf {
        self.root.join("_preview.pam")
    }

    /// Create the working directories, reporting whether the root existed.
    pub fn prepare(&self) -> io::Result<DirState> {
        let state = if self.root.is_dir() {
            DirState::AlreadyExisting
        } else {
            DirState::Created
        };
        fs::create_dir_all(self.lines_dir())?;
        fs::create_dir_all(self.frames_dir())?;
        Ok(state)
    }

    /// Check that a prerequisite artifact exists before compositing with it.
    pub fn require(&self, path: PathBuf) -> Result<PathBuf, PipelineError> {
        if path.is_file() {
            Ok(path)
        } else {
            Err(PipelineError::MissingArtifact(path))
        }
    }
}
