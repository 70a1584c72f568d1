//! Frames, web embeds and rich tiles.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Content rendered inside a tile by an external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Code,
    Markdown,
    Diagram,
    Note,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Frame,
    WebEmbed,
    Tile(TileKind),
}

/// A rectangular container. Frames have no stroke padding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub kind: FrameKind,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub title: Option<String>,
}

impl Frame {
    pub fn new(kind: FrameKind, position: Point, width: f64, height: f64) -> Self {
        Self {
            kind,
            position,
            width,
            height,
            title: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
        .abs()
    }
}
