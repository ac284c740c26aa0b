//! Overlay layout: frame border and text labels in render space.

use framecut_common::{EditError, EditResult, MediaTime};
use framecut_project_model::geometry::{is_drawable, Point, Rect, Size};
use framecut_project_model::layer::{
    LayerRequest, OpacityFade, OverlayLayout, TextBox, TextPlacement,
};

/// Length of the fade applied at each edge of an animated label.
pub const FADE_SECS: f64 = 0.05;

/// Corner radius of every label background.
pub const LABEL_CORNER_RADIUS: f64 = 5.0;

/// Lay out `request` over a frame of `render_size`.
///
/// Text offsets were measured in `request.player_frame`; they are scaled by
/// the larger of the two axis ratios between render and player size and
/// measured from the frame centre with y pointing up.
pub fn layout_overlay(
    render_size: Size,
    video_duration: MediaTime,
    request: &LayerRequest,
) -> EditResult<OverlayLayout> {
    if !is_drawable(request.player_frame) {
        return Err(EditError::range(format!(
            "player frame {}x{} must be positive",
            request.player_frame.width, request.player_frame.height
        )));
    }
    if !is_drawable(render_size) {
        return Err(EditError::transform_state(format!(
            "cannot lay out overlay on a {}x{} frame",
            render_size.width, render_size.height
        )));
    }

    let scale = request.frame.scale();
    let scaled = Size::new(render_size.width * scale, render_size.height * scale);
    let video_origin = Point::new(
        (render_size.width - scaled.width) / 2.0,
        (render_size.height - scaled.height) / 2.0,
    );

    let ratio = (render_size.width / request.player_frame.width)
        .max(render_size.height / request.player_frame.height);
    let duration_secs = video_duration.as_secs_f64();

    let texts = request
        .text_boxes
        .iter()
        .map(|text| place_text(text, render_size, ratio, duration_secs))
        .collect();

    Ok(OverlayLayout {
        canvas: render_size,
        background: request.frame.frame_color,
        video_rect: Rect::from_origin_size(video_origin, scaled),
        texts,
    })
}

fn place_text(text: &TextBox, canvas: Size, ratio: f64, duration_secs: f64) -> TextPlacement {
    let origin = Point::new(
        canvas.width / 2.0 + text.offset.x * ratio,
        canvas.height / 2.0 - text.offset.y * ratio,
    );

    let (begin, end) = text.time_range;
    let mut fades = Vec::new();
    let mut initial_opacity = 1.0;
    if text.with_animation {
        if begin > 0.0 {
            fades.push(OpacityFade {
                begin_secs: begin,
                duration_secs: FADE_SECS,
                from: 0.0,
                to: 1.0,
            });
            initial_opacity = 0.0;
        }
        if end < duration_secs {
            fades.push(OpacityFade {
                begin_secs: end,
                duration_secs: FADE_SECS,
                from: 1.0,
                to: 0.0,
            });
        }
    }

    TextPlacement {
        text: text.text.clone(),
        font_size: text.font_size * ratio,
        font_color: text.font_color,
        bg_color: text.bg_color,
        corner_radius: LABEL_CORNER_RADIUS,
        origin,
        initial_opacity,
        fades,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecut_project_model::geometry::Vec2;
    use framecut_project_model::layer::{Color, VideoFrame};

    fn request(text_boxes: Vec<TextBox>) -> LayerRequest {
        LayerRequest {
            frame: VideoFrame {
                scale_value: 0.1,
                frame_color: Color::rgb(20, 30, 40),
            },
            text_boxes,
            player_frame: Size::new(480.0, 270.0),
        }
    }

    #[test]
    fn test_video_rect_is_scaled_and_centred() {
        let layout =
            layout_overlay(Size::new(1920.0, 1080.0), MediaTime::from_secs(10), &request(vec![]))
                .unwrap();
        assert_eq!(layout.canvas, Size::new(1920.0, 1080.0));
        assert_eq!(layout.background, Color::rgb(20, 30, 40));
        assert!((layout.video_rect.x0 - 96.0).abs() < 1e-9);
        assert!((layout.video_rect.y0 - 54.0).abs() < 1e-9);
        assert!((layout.video_rect.width() - 1728.0).abs() < 1e-9);
        assert!((layout.video_rect.height() - 972.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_scaled_from_player_frame() {
        let text = TextBox {
            text: "Hello".into(),
            offset: Vec2::new(10.0, 20.0),
            ..TextBox::default()
        };
        let layout = layout_overlay(
            Size::new(1920.0, 1080.0),
            MediaTime::from_secs(10),
            &request(vec![text]),
        )
        .unwrap();
        let placed = &layout.texts[0];
        // ratio = max(1920 / 480, 1080 / 270) = 4
        assert_eq!(placed.font_size, 80.0);
        assert_eq!(placed.origin, Point::new(1000.0, 460.0));
        assert_eq!(placed.corner_radius, LABEL_CORNER_RADIUS);
    }

    #[test]
    fn test_fades_only_inside_video() {
        let starts_at_zero = TextBox {
            time_range: (0.0, 3.0),
            ..TextBox::default()
        };
        let middle = TextBox {
            time_range: (2.0, 4.0),
            ..TextBox::default()
        };
        let to_end = TextBox {
            time_range: (2.0, 10.0),
            ..TextBox::default()
        };
        let still = TextBox {
            time_range: (2.0, 4.0),
            with_animation: false,
            ..TextBox::default()
        };
        let layout = layout_overlay(
            Size::new(640.0, 360.0),
            MediaTime::from_secs(10),
            &request(vec![starts_at_zero, middle, to_end, still]),
        )
        .unwrap();

        let fades: Vec<usize> = layout.texts.iter().map(|t| t.fades.len()).collect();
        assert_eq!(fades, vec![1, 2, 1, 0]);
        assert_eq!(layout.texts[0].initial_opacity, 1.0);
        assert_eq!(layout.texts[1].initial_opacity, 0.0);
        assert_eq!(layout.texts[1].fades[0].duration_secs, FADE_SECS);
        assert_eq!(layout.texts[2].fades[0].to, 1.0);
        assert_eq!(layout.texts[3].initial_opacity, 1.0);
    }

    #[test]
    fn test_zero_player_frame_is_rejected() {
        let mut req = request(vec![]);
        req.player_frame = Size::ZERO;
        let err = layout_overlay(Size::new(640.0, 360.0), MediaTime::from_secs(1), &req)
            .unwrap_err();
        assert!(matches!(err, EditError::Range { .. }));
    }
}
