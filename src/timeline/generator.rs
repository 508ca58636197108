//! Typing timeline generation.
//!
//! Integrates a speed profile over simulated frame time to produce, for
//! every output frame, the character index currently typed and the cursor
//! blink state. Two modes share one basic pass: a fixed speed scale, and a
//! target total duration solved by bracketing + bisection over the scale.

use crate::schema::{LimitSpec, SpeedProfile};

/// Frame-indexed typing progress.
#[derive(Debug, Clone)]
pub struct Timeline {
    /// Characters typed so far at each frame, `0..=text_len`.
    pub char_index: Vec<usize>,
    /// Cursor blink state at each frame.
    pub cursor_visible: Vec<bool>,
    /// Frame index at which typing is complete (trailing rest excluded).
    pub end_of_typing: usize,
}

impl Timeline {
    /// Total number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.char_index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.char_index.is_empty()
    }
}

/// Timeline generator over one source text.
#[derive(Debug, Clone)]
pub struct TimelineGenerator {
    speed: SpeedProfile,
    /// Indent level of the line containing each character.
    indent_levels: Vec<u32>,
    text_len: usize,
    /// Seconds per frame.
    dt: f64,
    /// Cursor blink half-period in frames.
    half_period: i64,
    indent_factor: f64,
    start_rest_frames: usize,
    end_rest_frames: usize,
}

/// Maximum probes while bracketing or bisecting the duration scale.
const MAX_SEARCH_STEPS: usize = 64;

impl TimelineGenerator {
    pub fn new(
        text: &str,
        speed: SpeedProfile,
        frame_rate: u32,
        indent_factor: f64,
        start_rest: f64,
        end_rest: f64,
    ) -> Self {
        let frame_rate = frame_rate.max(1);
        Self {
            speed,
            indent_levels: indent_levels(text),
            text_len: text.chars().count(),
            dt: 1.0 / frame_rate as f64,
            half_period: (frame_rate as f64 / 2.0).round() as i64,
            indent_factor,
            start_rest_frames: (start_rest * frame_rate as f64) as usize,
            end_rest_frames: (end_rest * frame_rate as f64) as usize,
        }
    }

    /// Generate a timeline for the given limit mode.
    pub fn generate(&self, limit: LimitSpec) -> Timeline {
        match limit {
            LimitSpec::Scale(scale) => self.basic_pass(scale),
            LimitSpec::Duration(seconds) => self.duration_pass(seconds),
        }
    }

    /// Blink-only frames holding the character index constant.
    ///
    /// Returns the final blink counter so the phase carries across the
    /// rest/typing boundary.
    fn rest(&self, ix: usize, frames: usize, mut counter: i64) -> (i64, Vec<usize>, Vec<bool>) {
        let xl = vec![ix; frames];
        let mut cl = Vec::with_capacity(frames);
        for _ in 0..frames {
            counter = Self::tick(counter, self.half_period);
            cl.push(counter <= 0);
        }
        (counter, xl, cl)
    }

    /// Advance the blink counter one frame: counts down through the visible
    /// half (`<= 0`), wraps back to the hidden half at `-half + 1`.
    #[inline]
    fn tick(counter: i64, half_period: i64) -> i64 {
        if counter <= -half_period + 1 {
            half_period
        } else {
            counter - 1
        }
    }

    /// One full generation pass at a fixed speed scale.
    ///
    /// Trapezoidal integration of the speed profile; stops when the profile
    /// domain is exhausted or the fractional cursor passes the text end.
    pub fn basic_pass(&self, scale: f64) -> Timeline {
        let (mut counter, mut xl, mut cl) = self.rest(0, self.start_rest_frames, 0);
        let mut frame = self.start_rest_frames;
        let mut ix = 0.0f64;
        xl.push(0);
        cl.push(true);
        let mut v1 = 0.0f64;

        loop {
            let t = frame as f64 * self.dt;
            let Some(speed) = self.speed.speed_at(t) else {
                break;
            };
            let at = *xl.last().expect("seeded above");
            let level = self
                .indent_levels
                .get(at.min(self.text_len.saturating_sub(1)))
                .copied()
                .unwrap_or(0);
            let v2 = speed * scale * self.indent_factor.powi(level as i32);

            let late_ix = ix;
            ix += (v1 + v2) * self.dt / 2.0;
            frame += 1;
            v1 = v2;

            if ix > self.text_len as f64 {
                break;
            }

            counter = Self::tick(counter, self.half_period);
            if ix.ceil() as i64 != late_ix.ceil() as i64 {
                // Active typing keeps the cursor solid.
                counter = 0;
            }
            xl.push(ix.floor() as usize);
            cl.push(counter <= 0);
        }

        let end_of_typing = xl.len() - 1;
        // Hold the last emitted index so the sequence never steps backward;
        // an exact landing on the text end emits `text_len` itself.
        let hold = *xl.last().expect("seeded above");
        let (_, tail_x, tail_c) = self.rest(hold, self.end_rest_frames, counter);
        xl.extend(tail_x);
        cl.extend(tail_c);

        Timeline {
            char_index: xl,
            cursor_visible: cl,
            end_of_typing,
        }
    }

    /// Search for the speed scale whose pass hits `round(seconds * rate)`
    /// frames: geometric doubling/halving to bracket the sign change, then
    /// bisection. Returns the closest probe if no exact fixed point exists.
    fn duration_pass(&self, seconds: f64) -> Timeline {
        let target = (seconds / self.dt).round() as i64;

        let mut scale0 = 1.0f64;
        let mut best = self.basic_pass(scale0);
        let mut dif0 = target - best.len() as i64;
        if dif0 == 0 {
            return best;
        }
        let mut best_err = dif0.abs();

        // Bracket: frame count decreases as scale increases.
        let (mut lo, mut hi);
        let mut steps = 0;
        loop {
            let scale1 = if dif0 > 0 { scale0 * 0.5 } else { scale0 * 2.0 };
            let probe = self.basic_pass(scale1);
            let dif1 = target - probe.len() as i64;
            if dif1.abs() < best_err {
                best_err = dif1.abs();
                best = probe.clone();
            }
            if dif1 == 0 {
                return probe;
            }
            if dif0 * dif1 > 0 {
                dif0 = dif1;
                scale0 = scale1;
            } else {
                lo = scale0.min(scale1);
                hi = scale0.max(scale1);
                break;
            }
            steps += 1;
            if steps >= MAX_SEARCH_STEPS {
                // Frame count no longer responds to the scale (rests or the
                // profile domain dominate); keep the closest result.
                return best;
            }
        }

        for _ in 0..MAX_SEARCH_STEPS {
            let mid = (lo + hi) / 2.0;
            if mid <= lo || mid >= hi {
                break;
            }
            let probe = self.basic_pass(mid);
            let dif = target - probe.len() as i64;
            if dif.abs() < best_err {
                best_err = dif.abs();
                best = probe.clone();
            }
            if dif == 0 {
                return probe;
            }
            if dif > 0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        best
    }
}

/// Indent level of the line containing each character.
///
/// A level is one leading tab or one leading four-space group; the newline
/// belongs to the following line.
pub fn indent_levels(text: &str) -> Vec<u32> {
    let mut out = Vec::with_capacity(text.chars().count());
    let mut level = line_indent(text);
    let mut rest = text;

    for (i, c) in text.char_indices() {
        if c == '\n' {
            rest = &text[i + c.len_utf8()..];
            level = line_indent(rest);
        }
        out.push(level);
    }
    out
}

fn line_indent(line: &str) -> u32 {
    let mut level = 0u32;
    let mut spaces = 0u32;
    for c in line.chars() {
        match c {
            '\t' => {
                level += 1;
                spaces = 0;
            }
            ' ' => {
                spaces += 1;
                if spaces == 4 {
                    level += 1;
                    spaces = 0;
                }
            }
            _ => break,
        }
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(v: f64) -> SpeedProfile {
        SpeedProfile::Constant {
            chars_per_sec: v,
            duration: None,
        }
    }

    #[test]
    fn test_indent_levels() {
        let levels = indent_levels("a\n\tb\n\t\tc");
        //                          a  \n \t b  \n \t \t c
        assert_eq!(levels, vec![0, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_indent_levels_spaces() {
        let levels = indent_levels("        x");
        assert_eq!(levels[8], 2);
    }

    #[test]
    fn test_constant_speed_end_frame() {
        // end frame ~= ceil(len / (speed * dt)) within one frame
        let text = "abcdefghij"; // 10 chars
        let generator = TimelineGenerator::new(text, constant(5.0), 10, 1.0, 0.0, 0.0);
        let tl = generator.basic_pass(1.0);
        // 10 chars at 5 chars/s and 10 fps: 0.5 chars per frame, 20 frames.
        let expected = (10.0f64 / (5.0 * 0.1)).ceil() as i64;
        assert!((tl.end_of_typing as i64 - expected).abs() <= 1);
        for &ix in &tl.char_index {
            assert!(ix <= text.len());
        }
    }

    #[test]
    fn test_two_chars_example() {
        // "ab", 2 chars/s at 10 fps: 0->1 near frame 5, 1->2 near frame 10.
        let generator = TimelineGenerator::new("ab", constant(2.0), 10, 1.0, 0.0, 0.0);
        let tl = generator.basic_pass(1.0);
        let first = tl.char_index.iter().position(|&ix| ix == 1).unwrap() as i64;
        assert!((first - 5).abs() <= 1, "first advance at frame {first}");
        let second = tl.char_index.iter().position(|&ix| ix == 2);
        if let Some(second) = second {
            assert!((second as i64 - 10).abs() <= 1);
            // The cursor is solid on the frame the index advances.
            assert!(tl.cursor_visible[second]);
        }
        assert!(tl.cursor_visible[first as usize]);
    }

    #[test]
    fn test_char_index_monotonic_in_basic_mode() {
        let generator =
            TimelineGenerator::new("hello\nworld\n", constant(13.0), 24, 1.0, 0.5, 0.5);
        let tl = generator.basic_pass(1.0);
        for pair in tl.char_index.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_rests_hold_index_and_keep_blinking() {
        let generator = TimelineGenerator::new("abc", constant(10.0), 10, 1.0, 2.0, 2.0);
        let tl = generator.basic_pass(1.0);
        // 2s leading rest at 10 fps.
        assert!(tl.char_index[..20].iter().all(|&ix| ix == 0));
        // Trailing rest holds the last character index.
        let tail = &tl.char_index[tl.char_index.len() - 20..];
        assert!(tail.iter().all(|&ix| ix == 2));
        // Blink keeps cycling during the leading rest: both states appear.
        let lead = &tl.cursor_visible[..20];
        assert!(lead.iter().any(|&v| v));
        assert!(lead.iter().any(|&v| !v));
        // end_of_typing excludes the trailing rest.
        assert!(tl.end_of_typing + 20 < tl.len());
    }

    #[test]
    fn test_exact_landing_keeps_index_monotonic() {
        // 20 chars/s at 10 fps advances exactly 2 chars per frame, so the
        // integration lands exactly on the text end; the trailing rest must
        // hold that index instead of stepping back to it minus one.
        let generator =
            TimelineGenerator::new("x = 1\ny = 2", constant(20.0), 10, 1.0, 0.0, 0.1);
        let tl = generator.basic_pass(1.0);
        assert_eq!(*tl.char_index.last().unwrap(), 11);
        for pair in tl.char_index.windows(2) {
            assert!(pair[1] >= pair[0], "index went backwards: {pair:?}");
        }
    }

    #[test]
    fn test_blink_half_period() {
        let generator = TimelineGenerator::new("x", constant(1000.0), 10, 1.0, 0.0, 10.0);
        let tl = generator.basic_pass(1.0);
        // Within the trailing rest the blink flips every half_period frames.
        let rest = &tl.cursor_visible[tl.end_of_typing + 1..];
        let mut run = 1;
        let mut runs = Vec::new();
        for pair in rest.windows(2) {
            if pair[0] == pair[1] {
                run += 1;
            } else {
                runs.push(run);
                run = 1;
            }
        }
        // Interior runs are exactly one half-period (5 frames at 10 fps).
        for &r in &runs[1..runs.len().saturating_sub(1)] {
            assert_eq!(r, 5);
        }
    }

    #[test]
    fn test_indentation_factor_speeds_up_indented_lines() {
        let text = "aaaa\n\tbbbb";
        let slow = TimelineGenerator::new(text, constant(4.0), 24, 1.0, 0.0, 0.0);
        let fast = TimelineGenerator::new(text, constant(4.0), 24, 2.0, 0.0, 0.0);
        assert!(fast.basic_pass(1.0).len() < slow.basic_pass(1.0).len());
    }

    #[test]
    fn test_domain_exhaustion_stops_generation() {
        let profile = SpeedProfile::Constant {
            chars_per_sec: 1.0,
            duration: Some(1.0),
        };
        let generator = TimelineGenerator::new("abcdefgh", profile, 10, 1.0, 0.0, 0.0);
        let tl = generator.basic_pass(1.0);
        // 1s domain at 10 fps: roughly 11 frames, far short of the text end.
        assert!(tl.len() <= 13);
        assert!(*tl.char_index.last().unwrap() < 8);
    }

    #[test]
    fn test_duration_mode_exact_target() {
        let text = "abcdefghijklmnopqrst"; // 20 chars
        let generator = TimelineGenerator::new(text, constant(10.0), 24, 1.0, 0.0, 0.0);
        let natural = generator.basic_pass(1.0).len();
        assert!((natural as i64 - 48).abs() <= 1);

        let tl = generator.generate(LimitSpec::Duration(1.0));
        let target = 24i64;
        assert!(
            (tl.len() as i64 - target).abs() <= 1,
            "got {} frames for a {} frame target",
            tl.len(),
            target
        );
    }

    #[test]
    fn test_duration_mode_longer_than_natural() {
        let generator = TimelineGenerator::new("abcde", constant(10.0), 10, 1.0, 0.0, 0.0);
        let tl = generator.generate(LimitSpec::Duration(3.0));
        assert!((tl.len() as i64 - 30).abs() <= 1);
    }

    #[test]
    fn test_duration_mode_unreachable_returns_closest() {
        // Rests alone exceed the requested duration; no scale can hit it.
        let generator = TimelineGenerator::new("ab", constant(5.0), 10, 1.0, 2.0, 2.0);
        let tl = generator.generate(LimitSpec::Duration(1.0));
        assert!(tl.len() >= 40);
    }
}
