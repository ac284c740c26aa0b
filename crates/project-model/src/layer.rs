//! Overlay layer payloads and their computed layout.
//!
//! The pipeline only decides where overlay content goes and when it is
//! visible; drawing text and colour is left to the media engine.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// RGBA colour, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Border drawn around the video by shrinking it inside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoFrame {
    /// Fraction the video shrinks by, in `[0.0, 1.0)`. Zero leaves it full size.
    pub scale_value: f64,
    /// Colour visible around the shrunken video.
    pub frame_color: Color,
}

impl Default for VideoFrame {
    fn default() -> Self {
        Self {
            scale_value: 0.0,
            frame_color: Color::WHITE,
        }
    }
}

impl VideoFrame {
    /// Scale applied to the video inside the frame.
    pub fn scale(&self) -> f64 {
        (1.0 - self.scale_value).clamp(0.0, 1.0)
    }
}

/// A text label placed relative to the preview player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBox {
    pub text: String,
    pub font_size: f64,
    pub bg_color: Color,
    pub font_color: Color,
    /// Offset from the player centre, y pointing up, in player points.
    pub offset: Vec2,
    /// Visible interval in seconds.
    pub time_range: (f64, f64),
    /// Fade in/out at the interval edges.
    pub with_animation: bool,
}

impl Default for TextBox {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 20.0,
            bg_color: Color::WHITE,
            font_color: Color::BLACK,
            offset: Vec2::ZERO,
            time_range: (0.0, 3.0),
            with_animation: true,
        }
    }
}

/// Payload of an overlay-layer edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRequest {
    pub frame: VideoFrame,
    pub text_boxes: Vec<TextBox>,
    /// Size of the preview the text offsets were measured in.
    pub player_frame: Size,
}

/// Opacity change starting at `begin_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpacityFade {
    pub begin_secs: f64,
    pub duration_secs: f64,
    pub from: f32,
    pub to: f32,
}

/// Where and when one text label renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub text: String,
    pub font_size: f64,
    pub font_color: Color,
    pub bg_color: Color,
    pub corner_radius: f64,
    /// Top-left corner in render space.
    pub origin: Point,
    pub initial_opacity: f32,
    pub fades: Vec<OpacityFade>,
}

/// Layer tree the media engine composites above and around the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLayout {
    pub canvas: Size,
    pub background: Color,
    /// Rectangle the video is drawn into.
    pub video_rect: Rect,
    pub texts: Vec<TextPlacement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_frame_scale() {
        let frame = VideoFrame {
            scale_value: 0.1,
            ..VideoFrame::default()
        };
        assert!((frame.scale() - 0.9).abs() < 1e-12);
        assert_eq!(VideoFrame::default().scale(), 1.0);
    }

    #[test]
    fn test_text_box_deserializes_with_defaults() {
        let text: TextBox = serde_json::from_str(r#"{"text":"Hello"}"#).unwrap();
        assert_eq!(text.text, "Hello");
        assert_eq!(text.font_size, 20.0);
        assert_eq!(text.time_range, (0.0, 3.0));
        assert!(text.with_animation);
    }
}
