//! Logical and physical coordinate spaces and the rotation transform between
//! them.
//!
//! Layout always reasons in an un-rotated, "logical" canvas. The screen the
//! kiosk is mounted on may be turned by 90, 180 or 270 degrees, so every rect
//! the layout produces has to be mapped into "physical" framebuffer pixels
//! before it is drawn or hit-tested. The space is carried as a zero-sized
//! marker type so a logical rect can never be handed to code expecting a
//! physical one.

use std::fmt;
use std::marker::PhantomData;

use crate::display::SetupError;

/// Marker for the un-rotated layout space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Logical;

/// Marker for framebuffer pixels as the screen reports them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Physical;

/// The four supported mounting rotations, clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RotationAngle {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl RotationAngle {
    #[cfg(test)]
    pub const ALL: [RotationAngle; 4] = [
        RotationAngle::Deg0,
        RotationAngle::Deg90,
        RotationAngle::Deg180,
        RotationAngle::Deg270,
    ];

    pub fn degrees(self) -> u16 {
        match self {
            RotationAngle::Deg0 => 0,
            RotationAngle::Deg90 => 90,
            RotationAngle::Deg180 => 180,
            RotationAngle::Deg270 => 270,
        }
    }

    pub fn radians(self) -> f32 {
        f32::from(self.degrees()).to_radians()
    }

    /// Whether logical width/height are the physical height/width.
    pub fn swaps_axes(self) -> bool {
        matches!(self, RotationAngle::Deg90 | RotationAngle::Deg270)
    }

    /// The rotation reached by turning `self` and then `next`, clockwise.
    #[allow(unused)]
    pub fn then(self, next: RotationAngle) -> RotationAngle {
        match (self.degrees() + next.degrees()) % 360 {
            90 => RotationAngle::Deg90,
            180 => RotationAngle::Deg180,
            270 => RotationAngle::Deg270,
            _ => RotationAngle::Deg0,
        }
    }
}

impl TryFrom<u16> for RotationAngle {
    type Error = SetupError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(RotationAngle::Deg0),
            90 => Ok(RotationAngle::Deg90),
            180 => Ok(RotationAngle::Deg180),
            270 => Ok(RotationAngle::Deg270),
            other => Err(SetupError::InvalidRotation(other)),
        }
    }
}

impl fmt::Display for RotationAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Width and height of a canvas in whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn swapped(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }

    pub fn min_side(self) -> i32 {
        self.w().min(self.h())
    }

    pub(crate) fn w(self) -> i32 {
        self.width as i32
    }

    pub(crate) fn h(self) -> i32 {
        self.height as i32
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point<S> {
    pub x: i32,
    pub y: i32,
    _space: PhantomData<S>,
}

impl<S> Point<S> {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            _space: PhantomData,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect<S> {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    _space: PhantomData<S>,
}

impl<S> Rect<S> {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            _space: PhantomData,
        }
    }

    pub fn square(x: i32, y: i32, side: i32) -> Self {
        Self::new(x, y, side, side)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Centre point, rounded towards the top-left like the integer layout.
    pub fn center(&self) -> Point<S> {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Inclusive containment: points on the right/bottom edge count as hits.
    pub fn contains(&self, point: Point<S>) -> bool {
        self.x <= point.x
            && point.x <= self.x + self.width
            && self.y <= point.y
            && point.y <= self.y + self.height
    }

    /// True when the two rects share interior area. Touching edges do not
    /// count.
    #[cfg(test)]
    pub fn overlaps(&self, other: &Rect<S>) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Rotation transform between one logical canvas and one physical screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    rotation: RotationAngle,
    logical: Dimensions,
    physical: Dimensions,
}

impl Transform {
    pub fn new(rotation: RotationAngle, logical: Dimensions, physical: Dimensions) -> Self {
        Self {
            rotation,
            logical,
            physical,
        }
    }

    /// Transform for a screen of the given physical size, deriving the
    /// logical canvas by swapping axes for 90 and 270 degrees.
    pub fn for_screen(physical: Dimensions, rotation: RotationAngle) -> Self {
        let logical = if rotation.swaps_axes() {
            physical.swapped()
        } else {
            physical
        };
        Self::new(rotation, logical, physical)
    }

    pub fn rotation(&self) -> RotationAngle {
        self.rotation
    }

    pub fn logical(&self) -> Dimensions {
        self.logical
    }

    pub fn physical(&self) -> Dimensions {
        self.physical
    }

    pub fn map_rect(&self, rect: Rect<Logical>) -> Rect<Physical> {
        let (pw, ph) = (self.physical.w(), self.physical.h());
        let Rect {
            x,
            y,
            width: w,
            height: h,
            ..
        } = rect;
        match self.rotation {
            RotationAngle::Deg0 => Rect::new(x, y, w, h),
            RotationAngle::Deg90 => Rect::new(pw - y - h, x, h, w),
            RotationAngle::Deg180 => Rect::new(pw - x - w, ph - y - h, w, h),
            RotationAngle::Deg270 => Rect::new(y, ph - x - w, h, w),
        }
    }

    #[cfg(test)]
    pub fn unmap_rect(&self, rect: Rect<Physical>) -> Rect<Logical> {
        let (pw, ph) = (self.physical.w(), self.physical.h());
        let Rect {
            x,
            y,
            width: w,
            height: h,
            ..
        } = rect;
        match self.rotation {
            RotationAngle::Deg0 => Rect::new(x, y, w, h),
            RotationAngle::Deg90 => Rect::new(y, pw - x - w, h, w),
            RotationAngle::Deg180 => Rect::new(pw - x - w, ph - y - h, w, h),
            RotationAngle::Deg270 => Rect::new(ph - y - h, x, h, w),
        }
    }

    pub fn map_point(&self, point: Point<Logical>) -> Point<Physical> {
        let (pw, ph) = (self.physical.w(), self.physical.h());
        let Point { x, y, .. } = point;
        match self.rotation {
            RotationAngle::Deg0 => Point::new(x, y),
            RotationAngle::Deg90 => Point::new(pw - y, x),
            RotationAngle::Deg180 => Point::new(pw - x, ph - y),
            RotationAngle::Deg270 => Point::new(y, ph - x),
        }
    }

    pub fn unmap_point(&self, point: Point<Physical>) -> Point<Logical> {
        let (pw, ph) = (self.physical.w(), self.physical.h());
        let Point { x, y, .. } = point;
        match self.rotation {
            RotationAngle::Deg0 => Point::new(x, y),
            RotationAngle::Deg90 => Point::new(y, pw - x),
            RotationAngle::Deg180 => Point::new(pw - x, ph - y),
            RotationAngle::Deg270 => Point::new(ph - y, x),
        }
    }
}
