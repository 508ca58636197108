//! Video encoding by driving the system `ffmpeg` over a frame directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{info, warn};

/// Encoder failures.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("ffmpeg exited with status {0}")]
    Exit(std::process::ExitStatus),
    #[error("ffmpeg reported success but {0:?} was not written")]
    MissingOutput(PathBuf),
}

/// libx264 encoding parameters.
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    pub codec: String,
    pub preset: String,
    pub crf: u32,
    pub pixel_format: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            codec: "libx264".into(),
            preset: "medium".into(),
            crf: 0,
            pixel_format: "yuv420p".into(),
        }
    }
}

/// ffmpeg argument list for encoding `frame_count` frames starting at
/// `Frame{start}.pam` in `frames_dir`.
fn encode_args(
    frames_dir: &Path,
    output: &Path,
    frame_rate: u32,
    start: usize,
    frame_count: usize,
    settings: &EncoderSettings,
) -> Vec<String> {
    vec![
        "-y".into(),
        "-framerate".into(),
        frame_rate.to_string(),
        "-start_number".into(),
        start.to_string(),
        "-i".into(),
        frames_dir.join("Frame%d.pam").to_string_lossy().into_owned(),
        "-frames:v".into(),
        frame_count.to_string(),
        "-c:v".into(),
        settings.codec.clone(),
        "-preset".into(),
        settings.preset.clone(),
        "-crf".into(),
        settings.crf.to_string(),
        "-pix_fmt".into(),
        settings.pixel_format.clone(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Frames present on disk out of the expected count.
fn count_frames(frames_dir: &Path, start: usize, frame_count: usize) -> usize {
    (start..start + frame_count)
        .filter(|i| frames_dir.join(format!("Frame{i}.pam")).is_file())
        .count()
}

/// More than this fraction of expected frames missing is worth a warning;
/// ffmpeg will stop at the first gap in the sequence.
fn shortfall_is_severe(found: usize, expected: usize) -> bool {
    found * 2 < expected
}

/// Encode the frame directory into a video file.
pub fn encode(
    frames_dir: &Path,
    output: &Path,
    frame_rate: u32,
    start: usize,
    frame_count: usize,
    settings: &EncoderSettings,
) -> Result<(), EncodeError> {
    let found = count_frames(frames_dir, start, frame_count);
    if shortfall_is_severe(found, frame_count) {
        warn!("only {found} of {frame_count} frames present in {frames_dir:?}");
    }
    info!("encoding {found} frames to {output:?}");

    let status = Command::new("ffmpeg")
        .args(encode_args(
            frames_dir,
            output,
            frame_rate,
            start,
            frame_count,
            settings,
        ))
        .status()?;
    if !status.success() {
        return Err(EncodeError::Exit(status));
    }
    if !output.is_file() {
        return Err(EncodeError::MissingOutput(output.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_order_and_values() {
        let args = encode_args(
            Path::new("/work/frames"),
            Path::new("/out/demo.mp4"),
            24,
            0,
            120,
            &EncoderSettings::default(),
        );
        let joined = args.join(" ");
        assert_eq!(args[0], "-y");
        assert!(joined.contains("-framerate 24"));
        assert!(joined.contains("-start_number 0"));
        assert!(joined.contains("-i /work/frames/Frame%d.pam"));
        assert!(joined.contains("-frames:v 120"));
        assert!(joined.contains("-c:v libx264 -preset medium -crf 0 -pix_fmt yuv420p"));
        assert_eq!(args.last().unwrap(), "/out/demo.mp4");
    }

    #[test]
    fn test_count_frames() {
        let dir = tempfile::tempdir().unwrap();
        for i in [0usize, 1, 3] {
            std::fs::write(dir.path().join(format!("Frame{i}.pam")), b"x").unwrap();
        }
        assert_eq!(count_frames(dir.path(), 0, 5), 3);
        assert_eq!(count_frames(dir.path(), 1, 2), 1);
    }

    #[test]
    fn test_shortfall_threshold() {
        assert!(!shortfall_is_severe(50, 100));
        assert!(shortfall_is_severe(49, 100));
        assert!(!shortfall_is_severe(0, 0));
    }
}
