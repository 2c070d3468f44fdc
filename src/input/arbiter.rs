use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::gestures::{GestureRegion, RegionSlot};
use super::{GestureHandler, InputEvent, PointerCapture, PointerEvent, PointerId};
use crate::id_generator::generate_id;

/// Handle of a region registered with a [`GestureArbiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Drag,
    Pinch,
    /// A pinch ended but one of its pointers is still down
    Settling,
}

#[derive(Debug)]
struct Lock {
    owner: RegionId,
    mode: Mode,
    /// Pointers captured by `owner`, in the order they went down
    pointers: Vec<PointerId>,
}

struct RegionNode {
    parent: Option<RegionId>,
    slot: Box<dyn GestureRegion>,
}

/// Decides which region owns the pointers on one gesture surface, and
/// whether they form a drag or a pinch.
///
/// Regions form a tree. A pointer-down is offered to the region under it and
/// then to each ancestor in turn until one takes it. At most one region holds
/// the lock at any time, and only that region hears moves and ups.
///
/// The lock is granted when a region takes a pointer with at most two pointers
/// down and no lock held. A second pointer on the lock owner turns its drag into
/// a pinch. A second pointer on a descendant of the owner is ignored unless the
/// descendant forces pinch acquisition, in which case the owner's gesture ends
/// and the descendant starts a pinch.
///
/// Cancel and lost capture finish a gesture exactly like a pointer-up.
#[derive(Default)]
pub struct GestureArbiter {
    regions: HashMap<RegionId, RegionNode>,
    lock: Option<Lock>,
    /// Every pointer currently down on this surface, with its latest sample
    active: Vec<PointerEvent>,
}

impl fmt::Debug for GestureArbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureArbiter")
            .field("regions", &self.regions.len())
            .field("lock", &self.lock)
            .field("active", &self.active)
            .finish()
    }
}

impl GestureArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a region under `parent` (or as a root) and returns its handle.
    pub fn register<H>(&mut self, parent: Option<RegionId>, handler: Rc<RefCell<H>>) -> RegionId
    where
        H: GestureHandler + 'static,
    {
        let parent = parent.filter(|parent| {
            let known = self.regions.contains_key(parent);
            if !known {
                log::warn!("Parent region {parent:?} is not registered; adding as a root");
            }
            known
        });

        let id = RegionId(generate_id());
        self.regions.insert(
            id,
            RegionNode {
                parent,
                slot: Box::new(RegionSlot::new(handler)),
            },
        );
        id
    }

    /// Removes a region and all of its descendants. If one of them held the
    /// lock, its captures are released and the lock is dropped without any
    /// end callback.
    pub fn unregister(&mut self, region: RegionId, capture: &mut dyn PointerCapture) {
        if !self.regions.contains_key(&region) {
            return;
        }

        let doomed: Vec<RegionId> = self
            .regions
            .keys()
            .copied()
            .filter(|id| *id == region || self.is_ancestor(region, *id))
            .collect();

        if let Some(lock) = self.lock.take_if(|lock| doomed.contains(&lock.owner)) {
            for pointer in lock.pointers {
                capture.release_capture(lock.owner, pointer);
            }
        }
        for id in doomed {
            self.regions.remove(&id);
        }
    }

    pub fn contains(&self, region: RegionId) -> bool {
        self.regions.contains_key(&region)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn lock_owner(&self) -> Option<RegionId> {
        self.lock.as_ref().map(|lock| lock.owner)
    }

    pub fn active_pointers(&self) -> &[PointerEvent] {
        &self.active
    }

    /// True if `ancestor` is a strict ancestor of `region`.
    pub fn is_ancestor(&self, ancestor: RegionId, region: RegionId) -> bool {
        let mut current = self.parent_of(region);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Feeds one pointer event. `target` is the innermost region under a
    /// pointer-down and is ignored for every other event kind, since those
    /// follow capture instead of position.
    pub fn handle(
        &mut self,
        target: Option<RegionId>,
        event: &InputEvent,
        capture: &mut dyn PointerCapture,
    ) {
        match event {
            InputEvent::PointerDown(pointer) => {
                if let Some(target) = target.filter(|id| self.regions.contains_key(id)) {
                    self.pointer_down(target, pointer, capture);
                }
            }
            InputEvent::PointerMove(pointer) => self.pointer_move(pointer, capture),
            InputEvent::PointerUp(pointer)
            | InputEvent::PointerCancel(pointer)
            | InputEvent::LostCapture(pointer) => self.pointer_up(pointer, capture),
        }
    }

    fn pointer_down(
        &mut self,
        target: RegionId,
        event: &PointerEvent,
        capture: &mut dyn PointerCapture,
    ) {
        if event.is_primary && (self.lock.is_some() || !self.active.is_empty()) {
            log::warn!(
                "New gesture started with stale state ({} pointers, lock {:?}); resetting",
                self.active.len(),
                self.lock_owner()
            );
            self.reset(capture);
        }

        match self.active.iter_mut().find(|p| p.pointer_id == event.pointer_id) {
            Some(existing) => *existing = *event,
            None => self.active.push(*event),
        }

        let mut candidate = Some(target);
        while let Some(region) = candidate {
            if self.offer(region, event, capture) {
                return;
            }
            candidate = self.parent_of(region);
        }
    }

    /// Offers a pointer-down to one region. Returns `true` if the region took
    /// it, which stops the event from reaching further ancestors.
    fn offer(&mut self, region: RegionId, event: &PointerEvent, capture: &mut dyn PointerCapture) -> bool {
        let pending = self.active.len();

        let Some(lock) = &self.lock else {
            if pending > 2 {
                return false;
            }
            self.acquire(region, capture);
            self.begin(region, event);
            return true;
        };

        if lock.owner == region {
            if lock.pointers.len() != 1 || lock.pointers.contains(&event.pointer_id) {
                // Already pinching, or a repeated down: the owner keeps what it has
                return true;
            }
            let [first, _] = self.pinch_pair(lock.pointers[0], event);
            if lock.mode == Mode::Drag {
                self.with_slot(region, |slot| slot.drag_end(&first));
            }
            capture.set_capture(region, event.pointer_id);
            if let Some(lock) = &mut self.lock {
                lock.pointers.push(event.pointer_id);
                lock.mode = Mode::Pinch;
            }
            self.with_slot(region, |slot| slot.pinch_start(&[first, *event], 1));
            return true;
        }

        let takes_over = pending == 2
            && self.is_ancestor(lock.owner, region)
            && self
                .regions
                .get(&region)
                .is_some_and(|node| node.slot.force_lock_on_pinch());
        if !takes_over {
            return false;
        }

        log::debug!("Region {region:?} takes the pinch from ancestor {:?}", lock.owner);
        self.surrender(capture);
        self.acquire(region, capture);
        self.begin(region, event);
        true
    }

    /// Grants the lock to `region` and captures every active pointer for it.
    fn acquire(&mut self, region: RegionId, capture: &mut dyn PointerCapture) {
        let pointers: Vec<PointerId> = self.active.iter().map(|p| p.pointer_id).collect();
        for pointer in &pointers {
            capture.set_capture(region, *pointer);
        }
        let mode = if pointers.len() == 2 { Mode::Pinch } else { Mode::Drag };
        self.lock = Some(Lock {
            owner: region,
            mode,
            pointers,
        });
    }

    /// Starts the gesture matching the freshly acquired lock.
    fn begin(&mut self, region: RegionId, event: &PointerEvent) {
        match self.active.as_slice() {
            [] | [_] => self.with_slot(region, |slot| slot.drag_start(event)),
            [a, b, ..] => {
                let pointers = [*a, *b];
                let trigger = usize::from(b.pointer_id == event.pointer_id);
                self.with_slot(region, |slot| slot.pinch_start(&pointers, trigger));
            }
        }
    }

    /// Ends the current owner's gesture and drops its lock and captures.
    fn surrender(&mut self, capture: &mut dyn PointerCapture) {
        let Some(lock) = self.lock.take() else {
            return;
        };
        for pointer in &lock.pointers {
            capture.release_capture(lock.owner, *pointer);
        }
        match lock.mode {
            Mode::Drag => {
                if let Some(first) = lock.pointers.first().and_then(|id| self.latest(*id)) {
                    self.with_slot(lock.owner, |slot| slot.drag_end(&first));
                }
            }
            Mode::Pinch => {
                if let Some(pointers) = self.owned_pair(&lock.pointers) {
                    self.with_slot(lock.owner, |slot| slot.pinch_end(&pointers));
                }
            }
            Mode::Settling => {}
        }
        self.with_slot(lock.owner, |slot| slot.reset());
    }

    fn pointer_move(&mut self, event: &PointerEvent, capture: &mut dyn PointerCapture) {
        let Some(sample) = self.active.iter_mut().find(|p| p.pointer_id == event.pointer_id) else {
            return;
        };
        *sample = *event;

        let Some(lock) = &self.lock else {
            return;
        };
        if !lock.pointers.contains(&event.pointer_id)
            || !capture.has_capture(lock.owner, event.pointer_id)
        {
            return;
        }

        let owner = lock.owner;
        match lock.mode {
            Mode::Drag => self.with_slot(owner, |slot| slot.drag_move(event)),
            Mode::Pinch => {
                if let Some(pointers) = self.owned_pair(&lock.pointers) {
                    self.with_slot(owner, |slot| slot.pinch_move(&pointers));
                }
            }
            Mode::Settling => {}
        }
    }

    fn pointer_up(&mut self, event: &PointerEvent, capture: &mut dyn PointerCapture) {
        if let Some(index) = self.active.iter().position(|p| p.pointer_id == event.pointer_id) {
            self.active[index] = *event;
        }

        let owned = self
            .lock
            .as_ref()
            .filter(|lock| lock.pointers.contains(&event.pointer_id))
            .map(|lock| (lock.owner, lock.mode));

        if let Some((owner, mode)) = owned {
            match mode {
                Mode::Drag => self.with_slot(owner, |slot| slot.drag_end(event)),
                Mode::Pinch => {
                    let pair = self
                        .lock
                        .as_ref()
                        .and_then(|lock| self.owned_pair(&lock.pointers));
                    if let Some(pointers) = pair {
                        self.with_slot(owner, |slot| slot.pinch_end(&pointers));
                    }
                }
                Mode::Settling => {}
            }

            if capture.has_capture(owner, event.pointer_id) {
                capture.release_capture(owner, event.pointer_id);
            }
            if let Some(lock) = &mut self.lock {
                lock.pointers.retain(|id| *id != event.pointer_id);
                lock.mode = Mode::Settling;
            }
        }

        self.active.retain(|p| p.pointer_id != event.pointer_id);

        let released = self
            .lock
            .as_ref()
            .is_some_and(|lock| lock.pointers.is_empty() || self.active.is_empty());
        if released {
            if let Some(lock) = self.lock.take() {
                for pointer in lock.pointers {
                    capture.release_capture(lock.owner, pointer);
                }
                self.with_slot(lock.owner, |slot| slot.reset());
            }
        }
    }

    /// Forgets every pointer and the lock, without firing callbacks.
    fn reset(&mut self, capture: &mut dyn PointerCapture) {
        if let Some(lock) = self.lock.take() {
            for pointer in lock.pointers {
                capture.release_capture(lock.owner, pointer);
            }
            self.with_slot(lock.owner, |slot| slot.reset());
        }
        self.active.clear();
    }

    fn parent_of(&self, region: RegionId) -> Option<RegionId> {
        self.regions.get(&region).and_then(|node| node.parent)
    }

    fn latest(&self, pointer: PointerId) -> Option<PointerEvent> {
        self.active.iter().find(|p| p.pointer_id == pointer).copied()
    }

    /// The latest samples of the two owned pointers, in down order.
    fn owned_pair(&self, pointers: &[PointerId]) -> Option<[PointerEvent; 2]> {
        match pointers {
            [a, b] => Some([self.latest(*a)?, self.latest(*b)?]),
            _ => None,
        }
    }

    /// The held pointer's latest sample followed by the new one.
    fn pinch_pair(&self, held: PointerId, event: &PointerEvent) -> [PointerEvent; 2] {
        [self.latest(held).unwrap_or(*event), *event]
    }

    fn with_slot(&mut self, region: RegionId, f: impl FnOnce(&mut dyn GestureRegion)) {
        if let Some(node) = self.regions.get_mut(&region) {
            f(node.slot.as_mut());
        }
    }
}
