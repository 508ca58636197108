//! Compositing primitives - paste, vertical concat, scaling, blur glow.

use super::{Rgba, RgbaImage};

/// Source-over blend of straight-alpha pixels.
#[inline]
fn blend(dst: Rgba, src: Rgba) -> Rgba {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

/// Paste `fg` over `bg` at `(x, y)`; parts outside `bg` are clipped.
///
/// `opacity` scales the foreground alpha (1.0 = unchanged).
pub fn paste_with_opacity(
    bg: &RgbaImage,
    fg: &RgbaImage,
    x: i32,
    y: i32,
    opacity: f64,
) -> RgbaImage {
    let mut out = bg.clone();
    for fy in 0..fg.height() {
        let by = y + fy as i32;
        if by < 0 || by >= out.height() as i32 {
            continue;
        }
        for fx in 0..fg.width() {
            let bx = x + fx as i32;
            if bx < 0 || bx >= out.width() as i32 {
                continue;
            }
            let mut src = fg.pixel(fx, fy);
            if opacity < 1.0 {
                src[3] = (src[3] as f64 * opacity).round().clamp(0.0, 255.0) as u8;
            }
            let dst = out.pixel(bx as u32, by as u32);
            out.put_pixel(bx as u32, by as u32, blend(dst, src));
        }
    }
    out
}

/// Paste `fg` over `bg` at `(x, y)` with source-over blending.
pub fn paste(bg: &RgbaImage, fg: &RgbaImage, x: i32, y: i32) -> RgbaImage {
    paste_with_opacity(bg, fg, x, y, 1.0)
}

/// Stack images vertically, left-aligned on a transparent background.
pub fn concat_vertical(images: &[&RgbaImage]) -> RgbaImage {
    let width = images.iter().map(|i| i.width()).max().unwrap_or(1);
    let height: u32 = images.iter().map(|i| i.height()).sum();
    let mut out = RgbaImage::new(width, height);
    let mut y = 0i32;
    for img in images {
        out = paste(&out, img, 0, y);
        y += img.height() as i32;
    }
    out
}

/// Bilinear resize.
pub fn scale(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    if width == img.width() && height == img.height() {
        return img.clone();
    }
    let mut out = RgbaImage::new(width, height);
    let sx = img.width() as f64 / width as f64;
    let sy = img.height() as f64 / height as f64;

    for y in 0..height {
        let fy = ((y as f64 + 0.5) * sy - 0.5).max(0.0);
        let y0 = fy.floor() as u32;
        let y1 = (y0 + 1).min(img.height() - 1);
        let ty = fy - y0 as f64;
        for x in 0..width {
            let fx = ((x as f64 + 0.5) * sx - 0.5).max(0.0);
            let x0 = fx.floor() as u32;
            let x1 = (x0 + 1).min(img.width() - 1);
            let tx = fx - x0 as f64;

            let mut px = [0u8; 4];
            let (p00, p10) = (img.pixel(x0, y0), img.pixel(x1, y0));
            let (p01, p11) = (img.pixel(x0, y1), img.pixel(x1, y1));
            for c in 0..4 {
                let top = p00[c] as f64 * (1.0 - tx) + p10[c] as f64 * tx;
                let bot = p01[c] as f64 * (1.0 - tx) + p11[c] as f64 * tx;
                px[c] = (top * (1.0 - ty) + bot * ty).round().clamp(0.0, 255.0) as u8;
            }
            out.put_pixel(x, y, px);
        }
    }
    out
}

/// Resize preserving aspect ratio.
pub fn scale_to_height(img: &RgbaImage, height: u32) -> RgbaImage {
    let height = height.max(1);
    let width =
        ((img.width() as f64 * height as f64 / img.height() as f64).round() as u32).max(1);
    scale(img, width, height)
}

/// Cheap glow: a translucent copy repeatedly down/up-scaled for softness,
/// with the sharp original drawn back on top.
pub fn blur_glow(img: &RgbaImage, spread: f64, opacity: f64, iterations: u32) -> RgbaImage {
    let (w, h) = (img.width(), img.height());
    let mut soft = paste_with_opacity(&RgbaImage::new(w, h), img, 0, 0, opacity);

    let small_w = ((w as f64 / spread).round() as u32).max(1);
    let small_h = ((h as f64 / spread).round() as u32).max(1);
    for _ in 0..iterations {
        let grown = scale(&soft, (w as f64 * 1.5) as u32, (h as f64 * 1.5) as u32);
        soft = scale(&grown, small_w, small_h);
    }
    let soft = scale(&soft, w, h);

    let glow = paste(&RgbaImage::new(w, h), &soft, 0, 0);
    paste(&glow, img, 0, 0)
}
