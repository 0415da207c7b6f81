//! Per-mode constants for the scene builder.

use crate::geometry::{Dimensions, Logical, Rect};
use crate::text::{FontSpec, TextMeasurer};

use super::LayoutMode;

/// Scales `value` by `fraction`, truncating toward zero.
pub(crate) fn frac(value: i32, fraction: f64) -> i32 {
    (f64::from(value) * fraction) as i32
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum TextFit {
    /// Word wrap, capping the block at `max_lines` with an ellipsis.
    Wrap { max_lines: usize },
    /// Single line, truncated with an ellipsis.
    Truncate,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum LineSpacing {
    Fixed(i32),
    FontLineSkip,
}

impl LineSpacing {
    pub fn resolve(self, measurer: &(impl TextMeasurer + ?Sized), font: &FontSpec) -> i32 {
        match self {
            LineSpacing::Fixed(pitch) => pitch,
            LineSpacing::FontLineSkip => measurer.line_height(font),
        }
    }
}

/// Where the first artist line sits relative to the last title line.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ArtistOffset {
    Fixed(i32),
    /// One title line pitch plus a gap.
    AfterLine(i32),
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum ButtonSizing {
    Fixed {
        size: i32,
        spacing: i32,
        radius: i32,
        icon: f32,
    },
    /// Size and spacing relative to the circle diameter, radius and icon
    /// relative to the button size.
    Relative {
        size: f64,
        spacing: f64,
        radius: f64,
        icon: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ButtonMetrics {
    pub size: i32,
    pub spacing: i32,
    pub radius: i32,
    pub icon: f32,
}

impl ButtonSizing {
    pub fn resolve(self, diameter: i32) -> ButtonMetrics {
        match self {
            ButtonSizing::Fixed {
                size,
                spacing,
                radius,
                icon,
            } => ButtonMetrics {
                size,
                spacing,
                radius,
                icon,
            },
            ButtonSizing::Relative {
                size,
                spacing,
                radius,
                icon,
            } => {
                let size = frac(diameter, size);
                ButtonMetrics {
                    size,
                    spacing: frac(diameter, spacing),
                    radius: frac(size, radius),
                    icon: frac(size, icon) as f32,
                }
            }
        }
    }
}

/// Geometry of the screen shape a mode lays out on.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Shape {
    /// Cover on the left, text and buttons in a column on the right.
    Landscape {
        padding: i32,
        text_top: i32,
        text_offset: f64,
        text_width: f64,
        button_offset: f64,
    },
    /// Cover on top, text and buttons stacked below.
    Portrait {
        padding: i32,
        offset: f64,
        text_width: f64,
        row_gap: i32,
    },
    /// Everything stacked inside the inscribed circle.
    Circle {
        cover: f64,
        cover_top: f64,
        text_gap: i32,
        text_offset: f64,
        text_width: f64,
        row_top: f64,
    },
}

/// Vertical placement of the button row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RowY {
    At(i32),
    /// Row bottom edge.
    BottomAt(i32),
    /// Below the top of the title block by the title height plus a gap.
    BelowTitle(i32),
}

/// Anchors a shape resolves to on a concrete canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Frame {
    pub cover: Rect<Logical>,
    /// Horizontal slot shared by the text block and the button row.
    pub column_x: i32,
    pub column_width: i32,
    pub text_width: i32,
    /// Centre of the first title line.
    pub title_y: i32,
    pub row_y: RowY,
    pub outline: bool,
}

impl Frame {
    pub fn column_center(&self) -> i32 {
        self.column_x + self.column_width / 2
    }
}

impl Shape {
    pub fn frame(self, canvas: Dimensions) -> Frame {
        let (w, h) = (canvas.w(), canvas.h());
        match self {
            Shape::Landscape {
                padding,
                text_top,
                text_offset,
                text_width,
                button_offset,
            } => {
                let side = (w / 2 - padding * 2).min(h - padding * 2);
                let cover = Rect::square(padding, (h - side) / 2, side);
                let column_x = cover.right() + padding * 2;
                Frame {
                    cover,
                    column_x,
                    column_width: w - column_x - padding,
                    text_width: frac(w, text_width),
                    title_y: padding * 2 + text_top + frac(h, text_offset),
                    row_y: RowY::BottomAt(cover.bottom() + frac(h, button_offset)),
                    outline: false,
                }
            }
            Shape::Portrait {
                padding,
                offset,
                text_width,
                row_gap,
            } => {
                let offset = frac(h, offset);
                let side = (w - padding * 2).min((h - padding * 4) / 2);
                let cover = Rect::square((w - side) / 2, padding + offset, side);
                Frame {
                    cover,
                    column_x: 0,
                    column_width: w,
                    text_width: frac(w, text_width),
                    title_y: cover.bottom() + padding + offset,
                    row_y: RowY::BelowTitle(row_gap),
                    outline: false,
                }
            }
            Shape::Circle {
                cover,
                cover_top,
                text_gap,
                text_offset,
                text_width,
                row_top,
            } => {
                let diameter = canvas.min_side();
                let (cx, cy) = (w / 2, h / 2);
                let side = frac(diameter, cover);
                let cover = Rect::square(cx - side / 2, cy - frac(diameter, cover_top), side);
                let column_width = frac(diameter, text_width);
                Frame {
                    cover,
                    column_x: cx - column_width / 2,
                    column_width,
                    text_width: column_width,
                    title_y: cover.bottom() + text_gap + frac(diameter, text_offset),
                    row_y: RowY::At(cy + frac(diameter, row_top)),
                    outline: true,
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ModeProfile {
    pub shape: Shape,
    pub title_font: FontSpec,
    pub title_lines: usize,
    pub title_pitch: LineSpacing,
    pub artist_font: FontSpec,
    pub artist_fit: TextFit,
    pub artist_pitch: LineSpacing,
    pub artist_offset: ArtistOffset,
    pub buttons: ButtonSizing,
}

const RECT_BUTTON_ICON: f32 = 48.0;

const CIRCLE_BUTTONS: ButtonSizing = ButtonSizing::Relative {
    size: 0.12,
    spacing: 0.03,
    radius: 0.35,
    icon: 0.6,
};

fn circle_shape(cover: f64) -> Shape {
    Shape::Circle {
        cover,
        cover_top: 0.37,
        text_gap: 20,
        text_offset: 0.05,
        text_width: 0.70,
        row_top: 0.32,
    }
}

impl ModeProfile {
    pub fn for_mode(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Landscape => ModeProfile {
                shape: Shape::Landscape {
                    padding: 40,
                    text_top: 28,
                    text_offset: 0.10,
                    text_width: 0.40,
                    button_offset: -0.10,
                },
                title_font: FontSpec::bold(48.0),
                title_lines: 2,
                title_pitch: LineSpacing::Fixed(60),
                artist_font: FontSpec::regular(42.0),
                artist_fit: TextFit::Wrap { max_lines: 2 },
                artist_pitch: LineSpacing::Fixed(50),
                artist_offset: ArtistOffset::Fixed(77),
                buttons: ButtonSizing::Fixed {
                    size: 100,
                    spacing: 25,
                    radius: 40,
                    icon: RECT_BUTTON_ICON,
                },
            },
            LayoutMode::Portrait => ModeProfile {
                shape: Shape::Portrait {
                    padding: 30,
                    offset: 0.05,
                    text_width: 0.90,
                    row_gap: 150,
                },
                title_font: FontSpec::bold(48.0),
                title_lines: 2,
                title_pitch: LineSpacing::FontLineSkip,
                artist_font: FontSpec::regular(42.0),
                artist_fit: TextFit::Truncate,
                artist_pitch: LineSpacing::FontLineSkip,
                artist_offset: ArtistOffset::AfterLine(20),
                buttons: ButtonSizing::Fixed {
                    size: 90,
                    spacing: 20,
                    radius: 35,
                    icon: RECT_BUTTON_ICON,
                },
            },
            LayoutMode::Circle => ModeProfile {
                shape: circle_shape(0.40),
                title_font: FontSpec::bold(48.0),
                title_lines: 2,
                title_pitch: LineSpacing::Fixed(60),
                artist_font: FontSpec::regular(42.0),
                artist_fit: TextFit::Wrap { max_lines: 1 },
                artist_pitch: LineSpacing::Fixed(50),
                artist_offset: ArtistOffset::Fixed(65),
                buttons: CIRCLE_BUTTONS,
            },
            LayoutMode::CircleLarge => ModeProfile {
                shape: circle_shape(0.52),
                title_font: FontSpec::bold(38.0),
                title_lines: 1,
                title_pitch: LineSpacing::Fixed(48),
                artist_font: FontSpec::regular(34.0),
                artist_fit: TextFit::Wrap { max_lines: 1 },
                artist_pitch: LineSpacing::Fixed(40),
                artist_offset: ArtistOffset::Fixed(52),
                buttons: CIRCLE_BUTTONS,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frac_truncates_toward_zero() {
        assert_eq!(frac(720, 0.10), 72);
        assert_eq!(frac(725, -0.10), -72);
        assert_eq!(frac(1000, 0.12), 120);
        assert_eq!(frac(1080, 0.37), 399);
    }

    #[test]
    fn test_landscape_frame() {
        let frame = ModeProfile::for_mode(LayoutMode::Landscape)
            .shape
            .frame(Dimensions::new(1280, 720));
        assert_eq!(frame.cover, Rect::square(40, 80, 560));
        assert_eq!(frame.column_x, 680);
        assert_eq!(frame.column_width, 560);
        assert_eq!(frame.column_center(), 960);
        assert_eq!(frame.text_width, 512);
        assert_eq!(frame.title_y, 180);
        assert_eq!(frame.row_y, RowY::BottomAt(568));
        assert!(!frame.outline);
    }

    #[test]
    fn test_portrait_frame() {
        let frame = ModeProfile::for_mode(LayoutMode::Portrait)
            .shape
            .frame(Dimensions::new(720, 1280));
        assert_eq!(frame.cover, Rect::square(70, 94, 580));
        assert_eq!(frame.column_center(), 360);
        assert_eq!(frame.text_width, 648);
        assert_eq!(frame.title_y, 94 + 580 + 30 + 64);
        assert_eq!(frame.row_y, RowY::BelowTitle(150));
    }

    #[test]
    fn test_circle_frames() {
        let canvas = Dimensions::new(1080, 1080);
        let frame = ModeProfile::for_mode(LayoutMode::Circle).shape.frame(canvas);
        assert_eq!(frame.cover, Rect::square(324, 141, 432));
        assert_eq!(frame.title_y, 141 + 432 + 20 + 54);
        assert_eq!(frame.text_width, 756);
        assert_eq!(frame.row_y, RowY::At(885));
        assert!(frame.outline);

        let large = ModeProfile::for_mode(LayoutMode::CircleLarge).shape.frame(canvas);
        assert_eq!(large.cover.width, 561);
        assert_eq!(large.cover.y, 141);
        assert!(large.cover.width > frame.cover.width);
    }

    #[test]
    fn test_circle_button_metrics() {
        let metrics = CIRCLE_BUTTONS.resolve(1080);
        assert_eq!(
            metrics,
            ButtonMetrics {
                size: 129,
                spacing: 32,
                radius: 45,
                icon: 77.0,
            }
        );
    }
}
