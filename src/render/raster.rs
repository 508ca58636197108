//! Text rasterization behind a trait so a real font backend can be swapped
//! in without touching the pipeline.

use crate::render::{Rgba, RgbaImage};

/// A run of text drawn in one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub color: Rgba,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, color: Rgba) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Renders single lines of styled text at a fixed monospace size.
pub trait Rasterizer: Send + Sync {
    /// Current font size in pixels.
    fn font_px(&self) -> u32;

    /// Same rasterizer at a different font size.
    fn with_font_px(&self, font_px: u32) -> Self
    where
        Self: Sized;

    /// Rendered height of one line.
    fn line_height(&self) -> u32;

    /// Rendered width of `text` at the current size.
    fn measure(&self, text: &str) -> u32;

    /// Render one line of runs on a solid background.
    fn render_line(&self, runs: &[StyledRun], background: Rgba) -> RgbaImage;
}

/// Monospace block rasterizer: every glyph cell is a fixed-advance box and
/// non-space characters fill most of it. Crude, but metrics are exact and
/// deterministic, which is what the pipeline and tests depend on.
#[derive(Debug, Clone, Copy)]
pub struct BlockRasterizer {
    font_px: u32,
}

impl BlockRasterizer {
    pub fn new(font_px: u32) -> Self {
        Self {
            font_px: font_px.max(1),
        }
    }

    /// Horizontal advance per glyph cell.
    #[inline]
    pub fn advance(&self) -> u32 {
        (self.font_px * 3 / 5).max(1)
    }

    fn draw_char(&self, img: &mut RgbaImage, x: i32, ch: char, color: Rgba) {
        let adv = self.advance() as i32;
        let lh = self.line_height() as i32;
        // Inset so adjacent glyphs read as separate cells.
        let pad_x = (adv / 6).max(1);
        let pad_y = (lh / 8).max(1);
        match ch {
            ' ' | '\t' => {}
            '│' => {
                let bar = (adv / 4).max(1) as u32;
                img.fill_rect(x + (adv - bar as i32) / 2, pad_y, bar, (lh - 2 * pad_y) as u32, color);
            }
            _ => {
                img.fill_rect(
                    x + pad_x,
                    pad_y,
                    (adv - 2 * pad_x).max(1) as u32,
                    (lh - 2 * pad_y) as u32,
                    color,
                );
            }
        }
    }
}

impl Rasterizer for BlockRasterizer {
    fn font_px(&self) -> u32 {
        self.font_px
    }

    fn with_font_px(&self, font_px: u32) -> Self {
        Self::new(font_px)
    }

    fn line_height(&self) -> u32 {
        (self.font_px * 5 / 4).max(1)
    }

    fn measure(&self, text: &str) -> u32 {
        let cells: u32 = text
            .chars()
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum();
        cells * self.advance()
    }

    fn render_line(&self, runs: &[StyledRun], background: Rgba) -> RgbaImage {
        let width: u32 = runs.iter().map(|r| self.measure(&r.text)).sum();
        let mut img = RgbaImage::filled(width.max(1), self.line_height(), background);
        let mut x = 0i32;
        for run in runs {
            for ch in run.text.chars() {
                if ch == '\t' {
                    x += (4 * self.advance()) as i32;
                    continue;
                }
                self.draw_char(&mut img, x, ch, run.color);
                x += self.advance() as i32;
            }
        }
        img
    }
}

/// Largest font size at which one line of `sample` occupies about
/// `fraction` of `width` pixels. Measures a probe size and scales linearly,
/// which is exact for fixed-advance metrics.
pub fn fit_font_px<R: Rasterizer>(rasterizer: &R, sample: &str, width: u32, fraction: f64) -> u32 {
    const PROBE_PX: u32 = 10;
    let probe = rasterizer.with_font_px(PROBE_PX);
    let measured = probe.measure(sample).max(1) as f64;
    let target = width as f64 * fraction;
    ((PROBE_PX as f64 * target / measured).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_scale_with_font() {
        let small = BlockRasterizer::new(10);
        let big = BlockRasterizer::new(20);
        assert_eq!(small.advance() * 2, big.advance());
        assert!(big.line_height() > small.line_height());
        assert_eq!(small.measure("abcd"), 4 * small.advance());
    }

    #[test]
    fn test_tab_counts_as_four_cells() {
        let r = BlockRasterizer::new(10);
        assert_eq!(r.measure("\t"), r.measure("    "));
    }

    #[test]
    fn test_render_line_dimensions() {
        let r = BlockRasterizer::new(16);
        let runs = [
            StyledRun::new("ab", [255, 0, 0, 255]),
            StyledRun::new("c", [0, 255, 0, 255]),
        ];
        let img = r.render_line(&runs, [0, 0, 0, 255]);
        assert_eq!(img.width(), 3 * r.advance());
        assert_eq!(img.height(), r.line_height());
    }

    #[test]
    fn test_render_line_paints_glyphs() {
        let r = BlockRasterizer::new(16);
        let img = r.render_line(&[StyledRun::new("x", [255, 0, 0, 255])], [0, 0, 0, 255]);
        let cx = r.advance() / 2;
        let cy = r.line_height() / 2;
        assert_eq!(img.pixel(cx, cy), [255, 0, 0, 255]);
        // The corner stays background.
        assert_eq!(img.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_empty_line_still_one_pixel_wide() {
        let r = BlockRasterizer::new(16);
        let img = r.render_line(&[], [0, 0, 0, 255]);
        assert_eq!(img.width(), 1);
    }

    #[test]
    fn test_fit_font_px_hits_fraction() {
        let r = BlockRasterizer::new(10);
        let px = fit_font_px(&r, "0123", 1920, 0.3);
        let fitted = r.with_font_px(px);
        let measured = fitted.measure("0123") as f64;
        let target = 1920.0 * 0.3;
        assert!((measured - target).abs() / target < 0.15, "measured {measured}");
    }
}
