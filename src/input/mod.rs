use std::collections::{HashMap, HashSet};

use egui::{Context, Event, PointerButton, Pos2, TouchPhase};

mod arbiter;
mod gestures;
mod router;

pub use arbiter::{GestureArbiter, RegionId};
pub use gestures::GestureHandler;
pub use router::HitMap;

/// Identifies one pointer stream: the mouse, or one finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl PointerId {
    pub const MOUSE: PointerId = PointerId(0);

    /// Touch ids are shifted by one so they never collide with the mouse.
    pub fn touch(id: u64) -> Self {
        PointerId(id.wrapping_add(1))
    }
}

/// One sample of a pointer, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub pos: Pos2,
    /// Set on the pointer that starts an interaction: the mouse, or the first finger down
    pub is_primary: bool,
}

impl PointerEvent {
    pub fn new(pointer_id: PointerId, pos: Pos2, is_primary: bool) -> Self {
        Self {
            pointer_id,
            pos,
            is_primary,
        }
    }
}

/// Raw pointer input, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    PointerCancel(PointerEvent),
    /// The platform took the pointer away from its capturing region
    LostCapture(PointerEvent),
}

impl InputEvent {
    pub fn pointer(&self) -> &PointerEvent {
        match self {
            InputEvent::PointerDown(event)
            | InputEvent::PointerMove(event)
            | InputEvent::PointerUp(event)
            | InputEvent::PointerCancel(event)
            | InputEvent::LostCapture(event) => event,
        }
    }
}

/// Platform pointer capture. A captured pointer is delivered to its region
/// no matter where it moves.
pub trait PointerCapture {
    fn set_capture(&mut self, region: RegionId, pointer: PointerId);
    fn has_capture(&self, region: RegionId, pointer: PointerId) -> bool;
    fn release_capture(&mut self, region: RegionId, pointer: PointerId);
}

/// In-process capture bookkeeping, used where no platform capture exists.
#[derive(Debug, Default)]
pub struct CaptureTable {
    owners: HashMap<PointerId, RegionId>,
}

impl CaptureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self, pointer: PointerId) -> Option<RegionId> {
        self.owners.get(&pointer).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl PointerCapture for CaptureTable {
    fn set_capture(&mut self, region: RegionId, pointer: PointerId) {
        self.owners.insert(pointer, region);
    }

    fn has_capture(&self, region: RegionId, pointer: PointerId) -> bool {
        self.owner(pointer) == Some(region)
    }

    fn release_capture(&mut self, region: RegionId, pointer: PointerId) {
        if self.has_capture(region, pointer) {
            self.owners.remove(&pointer);
        }
    }
}

/// Converts egui's raw input into [`InputEvent`]s.
///
/// Touch events win over the mouse: while any finger is down, the pointer
/// events egui synthesizes from it are dropped.
#[derive(Debug, Default)]
pub struct InputHandler {
    mouse_down: bool,
    last_mouse_pos: Pos2,
    touches: HashSet<u64>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process raw egui input and generate our InputEvents
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        ctx.input(|input| self.translate(&input.events))
    }

    fn translate(&mut self, events: &[Event]) -> Vec<InputEvent> {
        let has_touch = events.iter().any(|event| matches!(event, Event::Touch { .. }));
        let mut out = Vec::new();

        for event in events {
            match event {
                Event::Touch { id, phase, pos, .. } => {
                    let pointer_id = PointerId::touch(id.0);
                    match phase {
                        TouchPhase::Start => {
                            let is_primary = self.touches.is_empty();
                            self.touches.insert(id.0);
                            out.push(InputEvent::PointerDown(PointerEvent::new(
                                pointer_id, *pos, is_primary,
                            )));
                        }
                        TouchPhase::Move => {
                            out.push(InputEvent::PointerMove(PointerEvent::new(
                                pointer_id, *pos, false,
                            )));
                        }
                        TouchPhase::End => {
                            self.touches.remove(&id.0);
                            out.push(InputEvent::PointerUp(PointerEvent::new(
                                pointer_id, *pos, false,
                            )));
                        }
                        TouchPhase::Cancel => {
                            self.touches.remove(&id.0);
                            out.push(InputEvent::PointerCancel(PointerEvent::new(
                                pointer_id, *pos, false,
                            )));
                        }
                    }
                }
                _ if has_touch || !self.touches.is_empty() => {}
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    let event = PointerEvent::new(PointerId::MOUSE, *pos, true);
                    self.last_mouse_pos = *pos;
                    if *pressed && !self.mouse_down {
                        self.mouse_down = true;
                        out.push(InputEvent::PointerDown(event));
                    } else if !*pressed && self.mouse_down {
                        self.mouse_down = false;
                        out.push(InputEvent::PointerUp(event));
                    }
                }
                Event::PointerMoved(pos) => {
                    self.last_mouse_pos = *pos;
                    out.push(InputEvent::PointerMove(PointerEvent::new(
                        PointerId::MOUSE,
                        *pos,
                        true,
                    )));
                }
                Event::PointerGone if self.mouse_down => {
                    self.mouse_down = false;
                    out.push(InputEvent::LostCapture(PointerEvent::new(
                        PointerId::MOUSE,
                        self.last_mouse_pos,
                        true,
                    )));
                }
                _ => {}
            }
        }

        out
    }
}
