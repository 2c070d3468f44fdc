use std::cell::RefCell;
use std::rc::Rc;

use super::PointerEvent;

/// Callbacks for one interactive region.
///
/// Each gesture threads its own accumulator: whatever `on_*_start` returns is
/// handed back as `start` to every later callback of that gesture, and each
/// `on_*_move` result comes back as `prev` on the next call. Handlers can
/// therefore track offsets without extra state of their own.
///
/// Pinch callbacks receive the two pointers in the order they went down.
pub trait GestureHandler {
    type Drag;
    type Pinch;

    /// Take the lock from an ancestor when a second pointer lands here.
    fn force_lock_on_pinch(&self) -> bool {
        false
    }

    fn on_drag_start(&mut self, _event: &PointerEvent) -> Option<Self::Drag> {
        None
    }

    fn on_drag_move(
        &mut self,
        _event: &PointerEvent,
        _start: Option<&Self::Drag>,
        _prev: Option<&Self::Drag>,
    ) -> Option<Self::Drag> {
        None
    }

    fn on_drag_end(
        &mut self,
        _event: &PointerEvent,
        _start: Option<&Self::Drag>,
        _prev: Option<&Self::Drag>,
    ) {
    }

    /// `trigger` is the index in `pointers` of the pointer that just went down.
    fn on_pinch_start(&mut self, _pointers: &[PointerEvent; 2], _trigger: usize) -> Option<Self::Pinch> {
        None
    }

    fn on_pinch_move(
        &mut self,
        _pointers: &[PointerEvent; 2],
        _start: Option<&Self::Pinch>,
        _prev: Option<&Self::Pinch>,
    ) -> Option<Self::Pinch> {
        None
    }

    fn on_pinch_end(
        &mut self,
        _pointers: &[PointerEvent; 2],
        _start: Option<&Self::Pinch>,
        _prev: Option<&Self::Pinch>,
    ) {
    }
}

/// Type-erased view of a registered handler, as the arbiter drives it.
pub(crate) trait GestureRegion {
    fn force_lock_on_pinch(&self) -> bool;
    fn drag_start(&mut self, event: &PointerEvent);
    fn drag_move(&mut self, event: &PointerEvent);
    fn drag_end(&mut self, event: &PointerEvent);
    fn pinch_start(&mut self, pointers: &[PointerEvent; 2], trigger: usize);
    fn pinch_move(&mut self, pointers: &[PointerEvent; 2]);
    fn pinch_end(&mut self, pointers: &[PointerEvent; 2]);
    /// Drops accumulated data without firing any callback.
    fn reset(&mut self);
}

struct Threaded<T> {
    start: Option<T>,
    prev: Option<T>,
}

impl<T> Default for Threaded<T> {
    fn default() -> Self {
        Self {
            start: None,
            prev: None,
        }
    }
}

pub(crate) struct RegionSlot<H: GestureHandler> {
    handler: Rc<RefCell<H>>,
    drag: Threaded<H::Drag>,
    pinch: Threaded<H::Pinch>,
}

impl<H: GestureHandler> RegionSlot<H> {
    pub(crate) fn new(handler: Rc<RefCell<H>>) -> Self {
        Self {
            handler,
            drag: Threaded::default(),
            pinch: Threaded::default(),
        }
    }
}

impl<H: GestureHandler> GestureRegion for RegionSlot<H> {
    fn force_lock_on_pinch(&self) -> bool {
        self.handler.borrow().force_lock_on_pinch()
    }

    fn drag_start(&mut self, event: &PointerEvent) {
        self.drag = Threaded {
            start: self.handler.borrow_mut().on_drag_start(event),
            prev: None,
        };
    }

    fn drag_move(&mut self, event: &PointerEvent) {
        self.drag.prev =
            self.handler
                .borrow_mut()
                .on_drag_move(event, self.drag.start.as_ref(), self.drag.prev.as_ref());
    }

    fn drag_end(&mut self, event: &PointerEvent) {
        let drag = std::mem::take(&mut self.drag);
        self.handler
            .borrow_mut()
            .on_drag_end(event, drag.start.as_ref(), drag.prev.as_ref());
    }

    fn pinch_start(&mut self, pointers: &[PointerEvent; 2], trigger: usize) {
        self.pinch = Threaded {
            start: self.handler.borrow_mut().on_pinch_start(pointers, trigger),
            prev: None,
        };
    }

    fn pinch_move(&mut self, pointers: &[PointerEvent; 2]) {
        self.pinch.prev = self.handler.borrow_mut().on_pinch_move(
            pointers,
            self.pinch.start.as_ref(),
            self.pinch.prev.as_ref(),
        );
    }

    fn pinch_end(&mut self, pointers: &[PointerEvent; 2]) {
        let pinch = std::mem::take(&mut self.pinch);
        self.handler
            .borrow_mut()
            .on_pinch_end(pointers, pinch.start.as_ref(), pinch.prev.as_ref());
    }

    fn reset(&mut self) {
        self.drag = Threaded::default();
        self.pinch = Threaded::default();
    }
}
