//! Run segmentation - grouping same-class characters into per-line runs.

use super::HighlightClass;

/// Maximal same-class substring within one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub class: HighlightClass,
}

/// All runs of one source line, with absolute text offsets.
///
/// `run_ends[i]` is the exclusive end offset (in chars, over the whole text)
/// of run `i`; for the last run of a line it equals the offset of the line's
/// terminating newline (or the text length for the final line). A fully
/// empty line holds a single empty [`HighlightClass::Other`] run so that the
/// offset invariant still holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRecord {
    /// Absolute offset of the line's first character.
    pub first: usize,
    pub runs: Vec<Run>,
    pub run_ends: Vec<usize>,
}

impl LineRecord {
    fn push_run(&mut self, run: Run, end_excl: usize) {
        self.runs.push(run);
        self.run_ends.push(end_excl);
    }

    /// Exclusive end of the line: the offset of its terminating newline.
    #[inline]
    pub fn line_end(&self) -> usize {
        *self.run_ends.last().expect("segmented line has at least one run")
    }

    /// Absolute start offset of run `j`.
    #[inline]
    pub fn run_start(&self, j: usize) -> usize {
        if j == 0 { self.first } else { self.run_ends[j - 1] }
    }

    /// Character length of run `j`.
    #[inline]
    pub fn run_len(&self, j: usize) -> usize {
        self.run_ends[j] - self.run_start(j)
    }

    /// The line's text, reassembled from its runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Group consecutive same-class characters into per-line runs.
///
/// `classes` must hold one entry per `char` of `text`. Newlines close the
/// current line; the final line is always closed out, even when empty.
pub fn segment(text: &str, classes: &[HighlightClass]) -> Vec<LineRecord> {
    let chars: Vec<char> = text.chars().collect();
    debug_assert_eq!(chars.len(), classes.len());

    let mut lines = vec![LineRecord::default()];
    let mut cur: Option<Run> = None;

    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' {
            let line = lines.last_mut().expect("at least one line");
            match cur.take() {
                Some(run) => line.push_run(run, i),
                None => line.push_run(empty_run(), i),
            }
            lines.push(LineRecord {
                first: i + 1,
                ..LineRecord::default()
            });
            continue;
        }

        let class = classes[i];
        match &mut cur {
            Some(run) if run.class == class => run.text.push(c),
            Some(_) => {
                let done = cur.take().expect("checked above");
                lines.last_mut().expect("at least one line").push_run(done, i);
                cur = Some(Run {
                    text: c.to_string(),
                    class,
                });
            }
            None => {
                cur = Some(Run {
                    text: c.to_string(),
                    class,
                });
            }
        }
    }

    let line = lines.last_mut().expect("at least one line");
    match cur.take() {
        Some(run) => line.push_run(run, chars.len()),
        None => line.push_run(empty_run(), chars.len()),
    }

    lines
}

fn empty_run() -> Run {
    Run {
        text: String::new(),
        class: HighlightClass::Other,
    }
}
