//! RGBA image buffer with binary PAM (P7) persistence.
//!
//! All intermediate artifacts (line images, composed frames) are stored as
//! PAM `RGB_ALPHA` files: a short ASCII header followed by raw samples.
//! ffmpeg's image2 demuxer reads the format directly, so the frame
//! directory can be handed to the encoder as-is.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Straight-alpha RGBA color.
pub type Rgba = [u8; 4];

/// PAM magic for arbitrary-depth binary maps.
pub const PAM_MAGIC: &[u8; 2] = b"P7";

/// 8-bit straight-alpha RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaImage {
    /// Create a fully transparent image. Dimensions are clamped to at least
    /// one pixel so empty renders stay representable on disk.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Create an image filled with one color.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn idx(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = self.idx(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, c: Rgba) {
        let i = self.idx(x, y);
        self.data[i..i + 4].copy_from_slice(&c);
    }

    /// Fill an axis-aligned rectangle, clipped to the image bounds.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, w: u32, h: u32, c: Rgba) {
        let x_start = x0.max(0) as u32;
        let y_start = y0.max(0) as u32;
        let x_end = (x0 + w as i32).clamp(0, self.width as i32) as u32;
        let y_end = (y0 + h as i32).clamp(0, self.height as i32) as u32;
        for y in y_start..y_end {
            for x in x_start..x_end {
                self.put_pixel(x, y, c);
            }
        }
    }

    /// Write as binary PAM.
    pub fn write_pam<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(PAM_MAGIC)?;
        write!(
            w,
            "\nWIDTH {}\nHEIGHT {}\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n",
            self.width, self.height
        )?;
        w.write_all(&self.data)
    }

    /// Read a binary PAM image as written by [`RgbaImage::write_pam`].
    pub fn read_pam<R: BufRead>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 2];
        r.read_exact(&mut magic)?;
        if &magic != PAM_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "not a PAM (P7) image",
            ));
        }

        let mut width: Option<u32> = None;
        let mut height: Option<u32> = None;
        let mut depth: Option<u32> = None;
        loop {
            let mut line = String::new();
            if r.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "PAM header ended early",
                ));
            }
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == "ENDHDR" {
                break;
            }
            let mut parts = line.split_whitespace();
            let key = parts.next().unwrap_or("");
            let value = parts.next();
            let parse = |v: Option<&str>| -> io::Result<u32> {
                v.and_then(|v| v.parse().ok()).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidData, "bad PAM header field")
                })
            };
            match key {
                "WIDTH" => width = Some(parse(value)?),
                "HEIGHT" => height = Some(parse(value)?),
                "DEPTH" => depth = Some(parse(value)?),
                // MAXVAL and TUPLTYPE are fixed by the writer.
                _ => {}
            }
        }

        let (width, height) = match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "PAM header missing dimensions",
                ));
            }
        };
        if depth != Some(4) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "expected 4-channel RGB_ALPHA PAM",
            ));
        }

        // Checked sizing: the header is untrusted input and the naive
        // product overflows u32 long before the allocation would fail.
        let size = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|n| n.checked_mul(4))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "PAM dimensions too large")
            })?;
        let mut data = Vec::new();
        r.take(size as u64).read_to_end(&mut data)?;
        if data.len() != size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "PAM pixel data truncated",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Save to a PAM file.
    pub fn save_pam<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_pam(&mut w)?;
        w.flush()
    }

    /// Load from a PAM file.
    pub fn load_pam<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut r = BufReader::new(File::open(path)?);
        Self::read_pam(&mut r)
    }
}
