//! Fixed dark color scheme mapping highlight classes to RGBA colors.

use crate::highlight::HighlightClass;
use crate::render::Rgba;

const RED: Rgba = [232, 66, 55, 255];
const YELLOW: Rgba = [252, 151, 0, 255];
const BLUE: Rgba = [124, 195, 251, 255];
const LIGHT_BLUE: Rgba = [173, 216, 251, 255];
const GREEN: Rgba = [73, 186, 124, 255];
const PURPLE: Rgba = [163, 133, 186, 255];
const WHITE: Rgba = [238, 246, 248, 255];
const GRAY: Rgba = [148, 147, 150, 255];
const DARK: Rgba = [38, 45, 50, 255];

/// Editor background.
pub const BACKGROUND: Rgba = DARK;

/// Line numbers and the gutter separator.
pub const GUTTER: Rgba = GRAY;

/// Cursor block.
pub const CURSOR: Rgba = LIGHT_BLUE;

/// Translucent band marking the active line.
pub const ACTIVE_BAND: Rgba = [238, 246, 248, 20];

/// Color for a highlight class.
pub fn class_color(class: HighlightClass) -> Rgba {
    use HighlightClass::*;
    match class {
        Keyword => RED,
        Str => LIGHT_BLUE,
        Number => BLUE,
        Comment => GRAY,
        Operator => RED,
        Punctuation => WHITE,
        Bracket(level) => match level % 5 {
            0 => BLUE,
            1 => GREEN,
            2 => YELLOW,
            3 => RED,
            _ => PURPLE,
        },
        Class => YELLOW,
        Function => PURPLE,
        Variable => WHITE,
        Attribute => WHITE,
        Builtin => PURPLE,
        Exception => YELLOW,
        Other => WHITE,
    }
}
