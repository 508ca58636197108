//! Frame-to-content resolution.
//!
//! Maps each frame's character index to the exact partial line it must
//! display, without ever re-scanning lines already passed: the walk keeps a
//! line pointer and a per-line run cursor that only move forward, so the
//! whole frame sequence costs O(total runs + total frames).

use crate::highlight::LineRecord;

/// What a frame must display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLocation {
    /// Character index unchanged from the previous frame; reuse its image.
    Same,
    /// New content to render.
    New(Location),
}

/// Resolved content pointer for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// 1-based source line number.
    pub line: usize,
    pub content: LineCut,
}

/// How much of the line is typed at this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCut {
    /// Only the line-number gutter, no code yet.
    GutterOnly,
    /// Runs `0..=run_index`, with the last one cut to `keep` characters.
    /// `keep` equals the run length when the run is complete.
    Partial { run_index: usize, keep: usize },
}

impl FrameLocation {
    /// The resolved location, if this frame introduces one.
    pub fn as_new(&self) -> Option<&Location> {
        match self {
            FrameLocation::New(loc) => Some(loc),
            FrameLocation::Same => None,
        }
    }
}

/// Resolve every frame's character index to a [`FrameLocation`].
///
/// `char_index` must be non-decreasing, as produced by the timeline
/// generator; the line and run cursors only move forward.
///
/// Frames repeating the previous index yield [`FrameLocation::Same`]. A
/// character index of zero means nothing is typed yet (gutter only); an
/// index landing exactly on a newline advances to the next line with no
/// content.
pub fn resolve(char_index: &[usize], lines: &[LineRecord]) -> Vec<FrameLocation> {
    let mut out = Vec::with_capacity(char_index.len());
    let mut line = 1usize; // 1-based
    let mut run_cursor = 0usize;
    let mut last_ix: Option<usize> = None;

    for &ix in char_index {
        if last_ix == Some(ix) {
            out.push(FrameLocation::Same);
            continue;
        }
        last_ix = Some(ix);

        if ix == 0 {
            out.push(FrameLocation::New(Location {
                line,
                content: LineCut::GutterOnly,
            }));
            continue;
        }

        // Newest typed character, zero-based.
        let rix = ix - 1;

        while rix > lines[line - 1].line_end() {
            line += 1;
            run_cursor = 0;
        }
        if rix == lines[line - 1].line_end() {
            // The newline itself: open the next line, nothing typed on it.
            line += 1;
            run_cursor = 0;
            out.push(FrameLocation::New(Location {
                line,
                content: LineCut::GutterOnly,
            }));
            continue;
        }

        let record = &lines[line - 1];
        while record.run_ends[run_cursor] <= rix {
            run_cursor += 1;
        }
        let keep = rix - record.run_start(run_cursor) + 1;
        out.push(FrameLocation::New(Location {
            line,
            content: LineCut::Partial {
                run_index: run_cursor,
                keep,
            },
        }));
    }

    out
}
