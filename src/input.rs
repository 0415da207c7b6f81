//! Pointer events to button hits, in physical screen space.

use tracing::debug;

use crate::geometry::{Physical, Point, Transform};
use crate::layout::{ButtonId, ButtonRegistry};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Finger position as fractions of the screen, 0.0 to 1.0 on each axis.
    Touch { x: f32, y: f32 },
    /// Mouse position in physical pixels.
    Mouse { x: i32, y: i32 },
}

/// First button whose rect contains `point`, edges included.
pub fn resolve(point: Point<Physical>, registry: &ButtonRegistry<Physical>) -> Option<ButtonId> {
    registry
        .iter()
        .find(|(_, rect)| rect.contains(point))
        .map(|(id, _)| id)
}

#[derive(Clone, Copy, Debug)]
pub struct InputMapper {
    transform: Transform,
}

impl InputMapper {
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    pub fn to_physical(&self, event: PointerEvent) -> Point<Physical> {
        let physical = self.transform.physical();
        match event {
            PointerEvent::Touch { x, y } => Point::new(
                (x * physical.width as f32) as i32,
                (y * physical.height as f32) as i32,
            ),
            PointerEvent::Mouse { x, y } => Point::new(x, y),
        }
    }

    pub fn resolve(
        &self,
        event: PointerEvent,
        registry: &ButtonRegistry<Physical>,
    ) -> Option<ButtonId> {
        let point = self.to_physical(event);
        let hit = resolve(point, registry);
        let logical = self.transform.unmap_point(point);
        debug!(
            "Pointer {:?} at ({}, {}), layout ({}, {}), hit {:?}",
            event, point.x, point.y, logical.x, logical.y, hit
        );
        hit
    }
}
