//! Text labels.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// A text element. Layout lives in the rich-text editor; the board only
/// needs a size for selection and dragging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// Top-left of the text box.
    pub position: Point,
    pub content: String,
    pub font_size: f64,
    /// Measured width, when the editor has reported one.
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            position,
            content: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            width: None,
            height: None,
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Explicit size if known, otherwise an estimate from character counts.
    ///
    /// `glyph_width_factor` and `line_height_factor` are fractions of the font size.
    pub fn size(&self, glyph_width_factor: f64, line_height_factor: f64) -> Size {
        let width = self.width.unwrap_or_else(|| {
            let longest = self.content.lines().map(|line| line.chars().count()).max().unwrap_or(0);
            longest as f64 * self.font_size * glyph_width_factor
        });
        let height = self.height.unwrap_or_else(|| {
            let mut lines = self.content.lines().count().max(1);
            if self.content.ends_with('\n') {
                lines += 1;
            }
            lines as f64 * self.font_size * line_height_factor
        });
        Size::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_size() {
        let text = Text::new(Point::ZERO, "abcd\nab").with_font_size(10.0);
        let size = text.size(0.5, 1.25);
        assert!((size.width - 20.0).abs() < 1e-9);
        assert!((size.height - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_size_wins() {
        let mut text = Text::new(Point::ZERO, "a very long line of text");
        text.width = Some(42.0);
        text.height = Some(7.0);
        assert_eq!(text.size(0.55, 1.25), Size::new(42.0, 7.0));
    }

    #[test]
    fn test_empty_text_has_one_line() {
        let text = Text::new(Point::ZERO, "").with_font_size(16.0);
        let size = text.size(0.55, 1.25);
        assert_eq!(size.width, 0.0);
        assert!((size.height - 20.0).abs() < 1e-9);
    }
}
