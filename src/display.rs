//! Screen setup: turns the configured orientation and rotation plus the
//! physical screen size into a layout mode and the session transform.

use thiserror::Error;
use tracing::info;

use crate::geometry::{Dimensions, RotationAngle, Transform};
use crate::layout::LayoutMode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("invalid rotation {0}, expected one of 0, 90, 180 or 270")]
    InvalidRotation(u16),
    #[error(
        "screen is {actual} ({physical}) but {requested} mode was requested; \
         use --{actual} or allow auto-detection"
    )]
    OrientationMismatch {
        requested: Orientation,
        actual: Orientation,
        physical: Dimensions,
    },
}

/// Base shape of a rectangular screen before rotation is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    fn of(dims: Dimensions) -> Self {
        if dims.is_portrait() {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    fn flipped(self) -> Self {
        match self {
            Orientation::Landscape => Orientation::Portrait,
            Orientation::Portrait => Orientation::Landscape,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
        }
    }
}

/// What the user asked for on the command line or in the config file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrientationRequest {
    #[default]
    Auto,
    Portrait,
    Landscape,
    Circle,
    CircleLarge,
}

/// Layout mode and coordinate mapping for one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub mode: LayoutMode,
    pub transform: Transform,
}

impl Viewport {
    pub fn resolve(
        physical: Dimensions,
        rotation: RotationAngle,
        request: OrientationRequest,
    ) -> Result<Self, SetupError> {
        let transform = Transform::for_screen(physical, rotation);

        let (mode, description) = match request {
            OrientationRequest::Circle => (LayoutMode::Circle, "circle mode".to_string()),
            OrientationRequest::CircleLarge => {
                (LayoutMode::CircleLarge, "large circle mode".to_string())
            }
            OrientationRequest::Auto
            | OrientationRequest::Portrait
            | OrientationRequest::Landscape => {
                let actual = Orientation::of(physical);
                let (base, how) = match request {
                    OrientationRequest::Portrait => (Orientation::Portrait, "forced"),
                    OrientationRequest::Landscape => (Orientation::Landscape, "forced"),
                    _ => (actual, "auto"),
                };
                if base != actual {
                    return Err(SetupError::OrientationMismatch {
                        requested: base,
                        actual,
                        physical,
                    });
                }

                let effective = if rotation.swaps_axes() {
                    base.flipped()
                } else {
                    base
                };
                let mode = match effective {
                    Orientation::Landscape => LayoutMode::Landscape,
                    Orientation::Portrait => LayoutMode::Portrait,
                };
                (mode, format!("{base} ({how}) + rotated {rotation}"))
            }
        };

        info!(
            "Screen {} ({}), layout {} as {:?}",
            physical,
            description,
            transform.logical(),
            mode
        );
        Ok(Self { mode, transform })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDSCAPE: Dimensions = Dimensions {
        width: 1280,
        height: 720,
    };
    const PORTRAIT: Dimensions = Dimensions {
        width: 720,
        height: 1280,
    };

    #[test]
    fn test_auto_detects_orientation() {
        let vp = Viewport::resolve(LANDSCAPE, RotationAngle::Deg0, OrientationRequest::Auto)
            .unwrap();
        assert_eq!(vp.mode, LayoutMode::Landscape);
        assert_eq!(vp.transform.logical(), LANDSCAPE);

        let vp = Viewport::resolve(PORTRAIT, RotationAngle::Deg180, OrientationRequest::Auto)
            .unwrap();
        assert_eq!(vp.mode, LayoutMode::Portrait);
        assert_eq!(vp.transform.logical(), PORTRAIT);
    }

    #[test]
    fn test_quarter_turn_flips_mode_and_swaps_logical() {
        let vp = Viewport::resolve(LANDSCAPE, RotationAngle::Deg90, OrientationRequest::Auto)
            .unwrap();
        assert_eq!(vp.mode, LayoutMode::Portrait);
        assert_eq!(vp.transform.logical(), PORTRAIT);
        assert_eq!(vp.transform.physical(), LANDSCAPE);

        let vp = Viewport::resolve(PORTRAIT, RotationAngle::Deg270, OrientationRequest::Portrait)
            .unwrap();
        assert_eq!(vp.mode, LayoutMode::Landscape);
        assert_eq!(vp.transform.logical(), LANDSCAPE);
    }

    #[test]
    fn test_forced_orientation_mismatch() {
        let err = Viewport::resolve(LANDSCAPE, RotationAngle::Deg0, OrientationRequest::Portrait)
            .unwrap_err();
        assert_eq!(
            err,
            SetupError::OrientationMismatch {
                requested: Orientation::Portrait,
                actual: Orientation::Landscape,
                physical: LANDSCAPE,
            }
        );
        assert!(err.to_string().contains("--landscape"));
    }

    #[test]
    fn test_circle_requests_skip_orientation_check() {
        let square = Dimensions::new(1080, 1080);
        let vp = Viewport::resolve(square, RotationAngle::Deg90, OrientationRequest::Circle)
            .unwrap();
        assert_eq!(vp.mode, LayoutMode::Circle);

        let vp = Viewport::resolve(PORTRAIT, RotationAngle::Deg0, OrientationRequest::CircleLarge)
            .unwrap();
        assert_eq!(vp.mode, LayoutMode::CircleLarge);
    }

    #[test]
    fn test_square_screen_counts_as_landscape() {
        let square = Dimensions::new(800, 800);
        let resolve = |request| Viewport::resolve(square, RotationAngle::Deg0, request);
        assert!(resolve(OrientationRequest::Landscape).is_ok());
        assert!(resolve(OrientationRequest::Portrait).is_err());
    }
}
