//! Session orchestration: pass 1 renders line artifacts, pass 2 composes
//! the camera-tracked output frames.
//!
//! Both passes fan out over one bounded rayon pool; the camera itself is
//! advanced by a single sequential planning loop between them, so its state
//! is never shared across threads.

use std::io;

use log::info;
use rayon::prelude::*;

use crate::camera::CameraController;
use crate::highlight::{HighlightClass, LineRecord, SimpleTokenizer, Tokenizer, segment};
use crate::render::{
    ACTIVE_BAND, BACKGROUND, BlockRasterizer, CURSOR, GUTTER, Rasterizer, RgbaImage, StyledRun,
    blur_glow, class_color, concat_vertical, fit_font_px, paste, scale_to_height,
};
use crate::schema::{ConfigError, SessionConfig};
use crate::timeline::{FrameLocation, LineCut, Location, Timeline, TimelineGenerator, resolve};

use super::{DirState, PipelineError, Workspace};

const GLOW_SPREAD: f64 = 10.0;
const GLOW_OPACITY: f64 = 0.6;
const GLOW_ITERATIONS: u32 = 3;

/// Margin around the content in the preview still, pixels.
const PREVIEW_MARGIN: u32 = 50;

/// Summary of a completed render session.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    /// Frames written to the frame directory.
    pub frames: usize,
    /// Source lines rendered.
    pub lines: usize,
    /// Frame index at which typing completed.
    pub end_of_typing: usize,
}

/// Everything one frame needs, resolved ahead of the parallel pass.
#[derive(Debug, Clone, Copy)]
struct FrameJob {
    index: usize,
    /// Active 1-based source line.
    line: usize,
    /// Frame whose partial image this frame displays.
    show_frame: usize,
    offset: (i32, i32),
    cursor: (f64, f64),
    /// Screen line height at this frame's zoom.
    slh: f64,
    cursor_visible: bool,
}

/// One end-to-end render session over a source text.
pub struct Session<R: Rasterizer> {
    config: SessionConfig,
    workspace: Workspace,
    lines: Vec<LineRecord>,
    timeline: Timeline,
    locations: Vec<FrameLocation>,
    /// Close-up sized rasterizer used for all line artifacts.
    rasterizer: R,
    /// Logical line height (overview size), content units.
    lh: f64,
    /// Initial camera zoom: close-up size over overview size.
    zoom0: f64,
    background: Option<RgbaImage>,
    header: String,
}

impl Session<BlockRasterizer> {
    pub fn new(source: &str, config: SessionConfig) -> Result<Self, PipelineError> {
        Self::with_rasterizer(source, config, BlockRasterizer::new(10))
    }
}

impl<R: Rasterizer> Session<R> {
    /// Validate the configuration and resolve everything the render passes
    /// need: highlight runs, timeline, frame locations and font sizes.
    pub fn with_rasterizer(
        source: &str,
        config: SessionConfig,
        base: R,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        // Four-space indentation collapses to tabs so indent levels and
        // typing both advance one character per level.
        let text = source.replace("    ", "\t");
        let classes = SimpleTokenizer.classify(&text, &config.language)?;
        let lines = segment(&text, &classes);

        let generator = TimelineGenerator::new(
            &text,
            config.speed.clone(),
            config.frame_rate,
            config.indentation_speed,
            config.start_rest,
            config.end_rest,
        );
        let timeline = generator.generate(config.limit_spec()?);
        let locations = resolve(&timeline.char_index, &lines);

        // Fit the font so the widest line (with its gutter) fills the
        // close-up fraction of the frame; the overview size fixes the
        // logical line height and the initial zoom is their ratio.
        let widest = widest_text(&lines, &base);
        let sample = format!("{}{widest}", gutter_text(lines.len()));
        let close_px = fit_font_px(&base, &sample, config.resolution.0, config.close_up_fraction);
        let over_px = fit_font_px(&base, &sample, config.resolution.0, config.overview_fraction);
        let rasterizer = base.with_font_px(close_px);
        let lh = base.with_font_px(over_px).line_height() as f64;
        let zoom0 = rasterizer.line_height() as f64 / lh;

        let background = match &config.background_image {
            Some(path) => {
                let img = RgbaImage::load_pam(path)?;
                if (img.width(), img.height()) != config.resolution {
                    return Err(ConfigError::BackgroundMismatch {
                        found_w: img.width(),
                        found_h: img.height(),
                        want_w: config.resolution.0,
                        want_h: config.resolution.1,
                    }
                    .into());
                }
                Some(img)
            }
            None => None,
        };

        let header = config.header_text.clone().unwrap_or_else(|| {
            std::path::Path::new(&config.output_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let workspace = Workspace::new(&config.output_dir, &config.output_name);

        Ok(Self {
            config,
            workspace,
            lines,
            timeline,
            locations,
            rasterizer,
            lh,
            zoom0,
            background,
            header,
        })
    }

    #[inline]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Total output frames this session will produce.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.timeline.len()
    }

    /// Create the working directories.
    pub fn prepare(&self) -> io::Result<DirState> {
        self.workspace.prepare()
    }

    /// Run both render passes to completion.
    pub fn run(&self) -> Result<RunReport, PipelineError> {
        self.workspace.prepare()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_concurrency)
            .build()?;

        info!(
            "pass 1: {} lines, {} frames of partial images",
            self.lines.len(),
            self.timeline.len()
        );
        let widths = pool.install(|| self.render_line_pass())?;
        let content_width = self.link_lines()?;

        info!("pass 2: composing {} frames", self.timeline.len());
        let jobs = self.plan_frames(&widths, content_width);
        pool.install(|| self.render_frame_pass(&jobs))?;

        Ok(RunReport {
            frames: self.timeline.len(),
            lines: self.lines.len(),
            end_of_typing: self.timeline.end_of_typing,
        })
    }

    /// Pass 1: header, full line images and per-frame partial images.
    ///
    /// Returns the rendered width of each frame's partial image; frames
    /// without their own image (repeats) stay zero and inherit during
    /// planning.
    fn render_line_pass(&self) -> Result<Vec<u32>, PipelineError> {
        let header = self
            .rasterizer
            .render_line(&[StyledRun::new(self.header.clone(), GUTTER)], [0, 0, 0, 0]);
        header.save_pam(self.workspace.line_image(0))?;

        (1..=self.lines.len())
            .into_par_iter()
            .try_for_each(|line| -> Result<(), PipelineError> {
                let img = self.render_full_line(line);
                img.save_pam(self.workspace.line_image(line))?;
                Ok(())
            })?;

        let new_frames: Vec<(usize, &Location)> = self
            .locations
            .iter()
            .enumerate()
            .filter_map(|(f, loc)| loc.as_new().map(|l| (f, l)))
            .collect();
        let rendered: Vec<(usize, u32)> = new_frames
            .par_iter()
            .map(|&(frame, loc)| -> Result<(usize, u32), PipelineError> {
                let img = self.render_partial(loc);
                let width = img.width();
                img.save_pam(self.workspace.partial_image(loc.line, frame))?;
                Ok((frame, width))
            })
            .collect::<Result<_, _>>()?;

        let mut widths = vec![0u32; self.locations.len()];
        for (frame, width) in rendered {
            widths[frame] = width;
        }
        Ok(widths)
    }

    fn render_full_line(&self, line: usize) -> RgbaImage {
        let record = &self.lines[line - 1];
        let mut runs = vec![StyledRun::new(gutter_text(line), GUTTER)];
        runs.extend(
            record
                .runs
                .iter()
                .map(|r| StyledRun::new(r.text.clone(), class_color(r.class))),
        );
        self.rasterizer.render_line(&runs, [0, 0, 0, 0])
    }

    fn render_partial(&self, loc: &Location) -> RgbaImage {
        let mut runs = vec![StyledRun::new(gutter_text(loc.line), GUTTER)];
        if let LineCut::Partial { run_index, keep } = loc.content {
            let record = &self.lines[loc.line - 1];
            for j in 0..=run_index {
                let run = &record.runs[j];
                let truncated = j == run_index && keep < record.run_len(j);
                let text: String = if truncated {
                    run.text.chars().take(keep).collect()
                } else {
                    run.text.clone()
                };
                // A half-typed keyword is not a keyword yet.
                let class = if truncated && run.class == HighlightClass::Keyword {
                    HighlightClass::Other
                } else {
                    run.class
                };
                runs.push(StyledRun::new(text, class_color(class)));
            }
        }
        self.rasterizer.render_line(&runs, [0, 0, 0, 0])
    }

    /// Sequential concatenation step: every line image becomes the vertical
    /// concatenation of the header and all lines up to it, and the full
    /// content is written out as a preview still.
    ///
    /// Returns the rendered width of the full content.
    fn link_lines(&self) -> Result<u32, PipelineError> {
        let mut cumulative =
            RgbaImage::load_pam(self.workspace.require(self.workspace.line_image(0))?)?;
        for line in 1..=self.lines.len() {
            let path = self.workspace.require(self.workspace.line_image(line))?;
            let img = RgbaImage::load_pam(&path)?;
            cumulative = concat_vertical(&[&cumulative, &img]);
            cumulative.save_pam(&path)?;
        }

        let mut preview = RgbaImage::filled(
            cumulative.width() + 2 * PREVIEW_MARGIN,
            cumulative.height() + 2 * PREVIEW_MARGIN,
            BACKGROUND,
        );
        preview = paste(
            &preview,
            &cumulative,
            PREVIEW_MARGIN as i32,
            PREVIEW_MARGIN as i32,
        );
        preview.save_pam(self.workspace.preview_image())?;

        Ok(cumulative.width())
    }

    /// Single-threaded camera loop: resolve each frame's line, displayed
    /// partial image and camera placement.
    fn plan_frames(&self, widths: &[u32], content_width: u32) -> Vec<FrameJob> {
        // Rendered pixels to content units.
        let rzoom = self.lh / self.rasterizer.line_height() as f64;
        let centroid = (
            content_width as f64 * rzoom / 2.0,
            self.lines.len() as f64 * self.lh / 2.0,
        );

        let mut cam = CameraController::new(
            self.config.camera,
            self.config.resolution,
            self.config.frame_rate,
            self.zoom0,
        );
        let mut line = 1usize;
        let mut show = 0usize;
        cam.set_center((widths.first().copied().unwrap_or(0) as f64 * rzoom, self.lh / 2.0));

        let mut jobs = Vec::with_capacity(self.timeline.len());
        for index in 0..self.timeline.len() {
            if let Some(loc) = self.locations[index].as_new() {
                line = loc.line;
                show = index;
            }
            let cursor = (
                widths[show] as f64 * rzoom,
                (line as f64 - 1.0) * self.lh + self.lh / 2.0,
            );
            let target = if index <= self.timeline.end_of_typing {
                cursor
            } else {
                centroid
            };
            cam.update_zoom(cursor);
            cam.update_pan(target);
            let placed = cam.frame(cursor);
            jobs.push(FrameJob {
                index,
                line,
                show_frame: show,
                offset: placed.offset,
                cursor: placed.cursor,
                slh: placed.zoom * self.lh,
                cursor_visible: self.timeline.cursor_visible[index],
            });
        }
        jobs
    }

    fn render_frame_pass(&self, jobs: &[FrameJob]) -> Result<(), PipelineError> {
        jobs.par_iter().try_for_each(|job| self.render_frame(job))
    }

    fn render_frame(&self, job: &FrameJob) -> Result<(), PipelineError> {
        let (width, height) = self.config.resolution;
        let mut frame = match &self.background {
            Some(img) => img.clone(),
            None => RgbaImage::filled(width, height, BACKGROUND),
        };

        let slh_px = job.slh.round().max(1.0) as u32;
        let band_y = job.offset.1 + ((job.line as f64 - 1.0) * job.slh).round() as i32;
        let band = RgbaImage::filled(width, slh_px, ACTIVE_BAND);
        frame = paste(&frame, &band, 0, band_y);

        let prev = self.workspace.require(self.workspace.line_image(job.line - 1))?;
        let part = self
            .workspace
            .require(self.workspace.partial_image(job.line, job.show_frame))?;
        let content = concat_vertical(&[&RgbaImage::load_pam(prev)?, &RgbaImage::load_pam(part)?]);
        // Header plus `line` source lines.
        let target_h = ((job.line as f64 + 1.0) * job.slh).round().max(1.0) as u32;
        let mut content = scale_to_height(&content, target_h);

        let rslh = job.slh.round() as i32;
        if job.cursor_visible {
            // Drawn before the glow pass so the cursor glows with the code.
            let local = (
                job.cursor.0 - job.offset.0 as f64,
                job.cursor.1 - (job.offset.1 - rslh) as f64,
            );
            let (x, y, w, h) = cursor_rect(local, job.slh);
            content.fill_rect(x, y, w, h, CURSOR);
        }

        let content = blur_glow(&content, GLOW_SPREAD, GLOW_OPACITY, GLOW_ITERATIONS);
        frame = paste(&frame, &content, job.offset.0, job.offset.1 - rslh);

        frame.save_pam(self.workspace.frame_image(job.index))?;
        Ok(())
    }
}

fn gutter_text(line: usize) -> String {
    format!("{line:04} │ ")
}

/// Cursor block centered on the sub-pixel cursor position.
fn cursor_rect(cursor: (f64, f64), slh: f64) -> (i32, i32, u32, u32) {
    let w = (slh / 8.0).round().max(1.0) as u32;
    let h = slh.round().max(1.0) as u32;
    (
        (cursor.0 - w as f64 / 2.0).round() as i32,
        (cursor.1 - h as f64 / 2.0).round() as i32,
        w,
        h,
    )
}

/// Widest line by rendered width; tab expansion makes this differ from the
/// longest line by character count.
fn widest_text<R: Rasterizer>(lines: &[LineRecord], rasterizer: &R) -> String {
    lines
        .iter()
        .map(|l| l.text())
        .max_by_key(|t| rasterizer.measure(t))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SpeedProfile;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path) -> SessionConfig {
        SessionConfig {
            output_dir: dir.to_path_buf(),
            output_name: "demo.mp4".into(),
            speed: SpeedProfile::Constant {
                chars_per_sec: 20.0,
                duration: None,
            },
            limit: "*1.0".into(),
            indentation_speed: 1.0,
            start_rest: 0.0,
            end_rest: 0.1,
            frame_rate: 10,
            background_image: None,
            header_text: Some("demo".into()),
            language: "python".into(),
            resolution: (96, 54),
            max_concurrency: 4,
            close_up_fraction: 0.8,
            overview_fraction: 0.2,
            camera: Default::default(),
        }
    }

    #[test]
    fn test_session_end_to_end() {
        let dir = tempdir().unwrap();
        let session = Session::new("x = 1\ny = 2", config(dir.path())).unwrap();
        assert_eq!(session.prepare().unwrap(), DirState::Created);

        let report = session.run().unwrap();
        assert_eq!(report.lines, 2);
        assert_eq!(report.frames, session.frame_count());
        assert!(report.frames > 0);

        for index in 0..report.frames {
            assert!(
                session.workspace().frame_image(index).is_file(),
                "frame {index} missing"
            );
        }
        assert!(session.workspace().preview_image().is_file());
        assert!(session.workspace().line_image(0).is_file());
        assert!(session.workspace().line_image(2).is_file());
    }

    #[test]
    fn test_missing_artifact_detected() {
        let dir = tempdir().unwrap();
        let session = Session::new("ab", config(dir.path())).unwrap();
        session.prepare().unwrap();

        let widths = session.render_line_pass().unwrap();
        let content_width = session.link_lines().unwrap();
        let jobs = session.plan_frames(&widths, content_width);

        let victim = session
            .workspace()
            .partial_image(jobs[0].line, jobs[0].show_frame);
        std::fs::remove_file(&victim).unwrap();

        match session.render_frame_pass(&jobs) {
            Err(PipelineError::MissingArtifact(p)) => assert_eq!(p, victim),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_background_must_match_resolution() {
        let dir = tempdir().unwrap();
        let bg = dir.path().join("bg.pam");
        RgbaImage::filled(10, 10, [0, 0, 0, 255]).save_pam(&bg).unwrap();

        let mut cfg = config(dir.path());
        cfg.background_image = Some(bg);
        match Session::new("ab", cfg) {
            Err(PipelineError::Config(ConfigError::BackgroundMismatch { .. })) => {}
            other => panic!("unexpected result {:?}", other.err()),
        }
    }

    #[test]
    fn test_cursor_rect_is_centered() {
        let (x, y, w, h) = cursor_rect((100.0, 40.0), 16.0);
        assert_eq!((w, h), (2, 16));
        assert_eq!(x, 99);
        assert_eq!(y, 32);
    }

    #[test]
    fn test_widest_line_picked_by_measured_width() {
        // Three tabs expand to twelve cells: fewer chars, wider render.
        let text = "\t\t\tab\nabcdefgh";
        let classes = vec![HighlightClass::Other; text.chars().count()];
        let lines = segment(text, &classes);
        let rasterizer = BlockRasterizer::new(10);
        assert_eq!(widest_text(&lines, &rasterizer), "\t\t\tab");
    }

    #[test]
    fn test_rejects_unknown_language() {
        let dir = tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.language = "cobol".into();
        assert!(matches!(
            Session::new("ab", cfg),
            Err(PipelineError::Tokenize(_))
        ));
    }
}
