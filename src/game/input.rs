//! Input Capture and Interpretation
//!
//! Pointer, wheel and key events arrive between frames in canvas space and
//! are applied synchronously to the game:
//!
//! - primary drag: selection box (click when the pointer never moved)
//! - secondary drag with nothing selected: pan
//! - secondary release with units selected: order (attack while aiming)
//! - wheel: zoom
//!
//! Orders produced here are requests. They only reach the units when the
//! authoritative copy comes back through [`Game::apply_order`].

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::vec2::Position;
use crate::game::camera::ScreenPoint;
use crate::game::state::Game;
use crate::game::tank::Selection;
use crate::network::protocol::{OrderKind, ServerOrder};

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Pointer buttons the game reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    /// Left button
    Primary,
    /// Right button
    Secondary,
}

/// A host input event, positions in canvas space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Button pressed
    PointerDown { button: PointerButton, at: ScreenPoint },
    /// Pointer moved
    PointerMove { at: ScreenPoint },
    /// Button released; `shift` keeps the previous selection
    PointerUp { button: PointerButton, at: ScreenPoint, shift: bool },
    /// Scroll wheel
    Wheel { delta_y: f64 },
    /// Aim modifier pressed or released
    AimKey { held: bool },
}

// =============================================================================
// GESTURE STATE
// =============================================================================

/// Selection box in progress, world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectBox {
    /// Press point
    pub anchor: Position,
    /// Latest drag point, `None` until the pointer moves
    pub corner: Option<Position>,
}

impl SelectBox {
    /// Box started at `anchor`.
    pub fn new(anchor: Position) -> Self {
        Self { anchor, corner: None }
    }

    /// Gesture to test units against when released at `release`.
    pub fn finish(&self, release: Position) -> Selection {
        match self.corner {
            Some(corner) => Selection::Box(self.anchor, corner),
            None => Selection::Point(release),
        }
    }

    /// Corners for drawing, once the box has an extent.
    pub fn outline(&self) -> Option<[Position; 4]> {
        let c = self.corner?;
        let a = self.anchor;
        Some([a, Position::new(c.x, a.y), c, Position::new(a.x, c.y)])
    }
}

/// Gesture state carried between events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Selection drag in progress
    pub select_box: Option<SelectBox>,
    /// World point held under the cursor while panning
    pub pan_anchor: Option<Position>,
    /// Aim modifier held
    pub aiming: bool,
}

// =============================================================================
// CONTROLLER
// =============================================================================

impl Game {
    /// Apply one input event.
    ///
    /// Returns the order to send when a secondary release targets the
    /// current selection.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<ServerOrder> {
        if self.stopped {
            return None;
        }

        match event {
            InputEvent::PointerMove { at } => {
                self.cursor.pos = at;
                let world = self.camera.screen_to_world(at);
                if let Some(select_box) = self.pointer.select_box.as_mut() {
                    select_box.corner = Some(world);
                }
                if let Some(anchor) = self.pointer.pan_anchor {
                    self.camera.pan_to(anchor, at);
                }
                None
            }

            InputEvent::PointerDown { button: PointerButton::Primary, at } => {
                self.pointer.select_box = Some(SelectBox::new(self.camera.screen_to_world(at)));
                None
            }

            InputEvent::PointerDown { button: PointerButton::Secondary, at } => {
                if !self.has_selection() {
                    self.pointer.pan_anchor = Some(self.camera.screen_to_world(at));
                }
                None
            }

            InputEvent::PointerUp { button: PointerButton::Primary, at, shift } => {
                if !shift {
                    self.clear_selection();
                }
                if let Some(select_box) = self.pointer.select_box.take() {
                    let selection = select_box.finish(self.camera.screen_to_world(at));
                    self.select(&selection);
                }
                None
            }

            InputEvent::PointerUp { button: PointerButton::Secondary, at, .. } => {
                if self.pointer.pan_anchor.take().is_some() {
                    return None;
                }
                let ids = self.selected_ids();
                if ids.is_empty() {
                    return None;
                }
                let kind = if self.pointer.aiming { OrderKind::Attack } else { OrderKind::Move };
                let target = self.camera.screen_to_world(at);
                debug!("Requesting {:?} to {} for {} units", kind, target, ids.len());
                Some(ServerOrder::new(ids, kind, target))
            }

            InputEvent::Wheel { delta_y } => {
                let delta = delta_y / self.config.wheel_zoom_divisor;
                self.camera.zoom_by(delta, self.config.min_zoom);
                None
            }

            InputEvent::AimKey { held } => {
                self.pointer.aiming = held;
                None
            }
        }
    }
}
