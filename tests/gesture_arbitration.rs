use std::cell::RefCell;
use std::rc::Rc;

use egui::{pos2, Pos2, Rect, Vec2};
use pixel_editor::color::Color;
use pixel_editor::command::{Applied, Command};
use pixel_editor::document::{Drawing, Panel, Project};
use pixel_editor::geometry::Position;
use pixel_editor::input::{
    CaptureTable, GestureArbiter, GestureHandler, InputEvent, PointerCapture, PointerEvent,
    PointerId, RegionId,
};
use pixel_editor::state::EditorContext;
use pixel_editor::tools::{CommandQueue, PanelDragTool, PencilTool};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    DragStart(Pos2),
    DragMove { start: Option<Pos2>, prev: Option<Pos2> },
    DragEnd { start: Option<Pos2>, prev: Option<Pos2> },
    PinchStart { trigger: usize },
    PinchMove { start: Option<f32>, prev: Option<f32> },
    PinchEnd { start: Option<f32>, prev: Option<f32> },
}

/// Records every callback. Drags thread the pointer position, pinches the
/// finger distance.
#[derive(Debug, Default)]
struct Recorder {
    force: bool,
    calls: Vec<Call>,
}

impl Recorder {
    fn forcing() -> Self {
        Self {
            force: true,
            calls: Vec::new(),
        }
    }
}

impl GestureHandler for Recorder {
    type Drag = Pos2;
    type Pinch = f32;

    fn force_lock_on_pinch(&self) -> bool {
        self.force
    }

    fn on_drag_start(&mut self, event: &PointerEvent) -> Option<Pos2> {
        self.calls.push(Call::DragStart(event.pos));
        Some(event.pos)
    }

    fn on_drag_move(&mut self, event: &PointerEvent, start: Option<&Pos2>, prev: Option<&Pos2>) -> Option<Pos2> {
        self.calls.push(Call::DragMove {
            start: start.copied(),
            prev: prev.copied(),
        });
        Some(event.pos)
    }

    fn on_drag_end(&mut self, _event: &PointerEvent, start: Option<&Pos2>, prev: Option<&Pos2>) {
        self.calls.push(Call::DragEnd {
            start: start.copied(),
            prev: prev.copied(),
        });
    }

    fn on_pinch_start(&mut self, pointers: &[PointerEvent; 2], trigger: usize) -> Option<f32> {
        self.calls.push(Call::PinchStart { trigger });
        Some(pointers[0].pos.distance(pointers[1].pos))
    }

    fn on_pinch_move(&mut self, pointers: &[PointerEvent; 2], start: Option<&f32>, prev: Option<&f32>) -> Option<f32> {
        self.calls.push(Call::PinchMove {
            start: start.copied(),
            prev: prev.copied(),
        });
        Some(pointers[0].pos.distance(pointers[1].pos))
    }

    fn on_pinch_end(&mut self, _pointers: &[PointerEvent; 2], start: Option<&f32>, prev: Option<&f32>) {
        self.calls.push(Call::PinchEnd {
            start: start.copied(),
            prev: prev.copied(),
        });
    }
}

/// Region A with a nested region B.
struct Surface {
    arbiter: GestureArbiter,
    capture: CaptureTable,
    a: RegionId,
    b: RegionId,
    outer: Rc<RefCell<Recorder>>,
    inner: Rc<RefCell<Recorder>>,
}

impl Surface {
    fn new(inner: Recorder) -> Self {
        let mut arbiter = GestureArbiter::new();
        let outer = Rc::new(RefCell::new(Recorder::default()));
        let inner = Rc::new(RefCell::new(inner));
        let a = arbiter.register(None, outer.clone());
        let b = arbiter.register(Some(a), inner.clone());
        Self {
            arbiter,
            capture: CaptureTable::new(),
            a,
            b,
            outer,
            inner,
        }
    }

    fn down(&mut self, target: RegionId, pointer: PointerEvent) {
        self.arbiter
            .handle(Some(target), &InputEvent::PointerDown(pointer), &mut self.capture);
    }

    fn send(&mut self, event: InputEvent) {
        self.arbiter.handle(None, &event, &mut self.capture);
    }

    fn outer_calls(&self) -> Vec<Call> {
        self.outer.borrow().calls.clone()
    }

    fn inner_calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }
}

fn finger(id: u64, x: f32, y: f32, is_primary: bool) -> PointerEvent {
    PointerEvent::new(PointerId::touch(id), pos2(x, y), is_primary)
}

#[test]
fn test_drag_threads_start_and_previous_data() {
    let mut surface = Surface::new(Recorder::default());
    let a = surface.a;

    surface.down(a, finger(1, 0.0, 0.0, true));
    assert_eq!(surface.arbiter.lock_owner(), Some(a));
    assert_eq!(surface.capture.owner(PointerId::touch(1)), Some(a));

    surface.send(InputEvent::PointerMove(finger(1, 5.0, 0.0, false)));
    surface.send(InputEvent::PointerMove(finger(1, 9.0, 0.0, false)));
    surface.send(InputEvent::PointerUp(finger(1, 9.0, 0.0, false)));

    assert_eq!(
        surface.outer_calls(),
        vec![
            Call::DragStart(pos2(0.0, 0.0)),
            Call::DragMove {
                start: Some(pos2(0.0, 0.0)),
                prev: None
            },
            Call::DragMove {
                start: Some(pos2(0.0, 0.0)),
                prev: Some(pos2(5.0, 0.0))
            },
            Call::DragEnd {
                start: Some(pos2(0.0, 0.0)),
                prev: Some(pos2(9.0, 0.0))
            },
        ]
    );
    assert_eq!(surface.arbiter.lock_owner(), None);
    assert!(surface.arbiter.active_pointers().is_empty());
    assert!(surface.capture.is_empty());
}

#[test]
fn test_ancestor_keeps_single_pointer_stream() {
    let mut surface = Surface::new(Recorder::forcing());
    let a = surface.a;

    surface.down(a, finger(1, 0.0, 0.0, true));
    // The pointer wanders over B: moves follow the lock, not position
    surface.send(InputEvent::PointerMove(finger(1, 50.0, 50.0, false)));
    surface.send(InputEvent::PointerUp(finger(1, 50.0, 50.0, false)));

    assert!(surface.inner_calls().is_empty());
    assert_eq!(surface.outer_calls().len(), 3);
}

#[test]
fn test_forced_pinch_takes_lock_from_ancestor() {
    let mut surface = Surface::new(Recorder::forcing());
    let (a, b) = (surface.a, surface.b);

    surface.down(a, finger(1, 0.0, 0.0, true));
    surface.send(InputEvent::PointerMove(finger(1, 2.0, 0.0, false)));
    surface.down(b, finger(2, 10.0, 0.0, false));

    assert_eq!(
        surface.outer_calls(),
        vec![
            Call::DragStart(pos2(0.0, 0.0)),
            Call::DragMove {
                start: Some(pos2(0.0, 0.0)),
                prev: None
            },
            Call::DragEnd {
                start: Some(pos2(0.0, 0.0)),
                prev: Some(pos2(2.0, 0.0))
            },
        ]
    );
    assert_eq!(surface.inner_calls(), vec![Call::PinchStart { trigger: 1 }]);
    assert_eq!(surface.arbiter.lock_owner(), Some(b));
    assert_eq!(surface.capture.owner(PointerId::touch(1)), Some(b));
    assert_eq!(surface.capture.owner(PointerId::touch(2)), Some(b));

    surface.send(InputEvent::PointerMove(finger(2, 20.0, 0.0, false)));
    surface.send(InputEvent::PointerUp(finger(2, 20.0, 0.0, false)));
    // The remaining finger neither drags nor pinches
    surface.send(InputEvent::PointerMove(finger(1, 3.0, 0.0, false)));
    assert_eq!(surface.arbiter.lock_owner(), Some(b));
    surface.send(InputEvent::PointerUp(finger(1, 3.0, 0.0, false)));

    assert_eq!(
        surface.inner_calls(),
        vec![
            Call::PinchStart { trigger: 1 },
            Call::PinchMove {
                start: Some(8.0),
                prev: None
            },
            Call::PinchEnd {
                start: Some(8.0),
                prev: Some(18.0)
            },
        ]
    );
    assert_eq!(surface.outer_calls().len(), 3);
    assert_eq!(surface.arbiter.lock_owner(), None);
    assert!(surface.capture.is_empty());
}

#[test]
fn test_unforced_descendant_leaves_pinch_to_owner() {
    let mut surface = Surface::new(Recorder::default());
    let (a, b) = (surface.a, surface.b);

    surface.down(a, finger(1, 0.0, 0.0, true));
    surface.down(b, finger(2, 6.0, 8.0, false));

    assert!(surface.inner_calls().is_empty());
    assert_eq!(surface.arbiter.lock_owner(), Some(a));
    assert_eq!(
        surface.outer_calls(),
        vec![
            Call::DragStart(pos2(0.0, 0.0)),
            Call::DragEnd {
                start: Some(pos2(0.0, 0.0)),
                prev: None
            },
            Call::PinchStart { trigger: 1 },
        ]
    );

    surface.send(InputEvent::PointerUp(finger(1, 0.0, 0.0, false)));
    assert_eq!(
        surface.outer_calls().last(),
        Some(&Call::PinchEnd {
            start: Some(10.0),
            prev: None
        })
    );
}

#[test]
fn test_two_fingers_down_together_start_a_pinch() {
    let mut surface = Surface::new(Recorder::default());
    let b = surface.b;

    surface.down(b, finger(1, 0.0, 0.0, true));
    surface.down(b, finger(2, 3.0, 4.0, false));

    assert_eq!(surface.arbiter.lock_owner(), Some(b));
    assert_eq!(
        surface.inner_calls().last(),
        Some(&Call::PinchStart { trigger: 1 })
    );
    assert!(surface.outer_calls().is_empty());

    // A third finger changes nothing
    surface.down(b, finger(3, 9.0, 9.0, false));
    assert_eq!(surface.inner_calls().len(), 3);
}

#[test]
fn test_cancel_and_lost_capture_end_like_up() {
    let terminals: [fn(PointerEvent) -> InputEvent; 2] =
        [InputEvent::PointerCancel, InputEvent::LostCapture];
    for terminal in terminals {
        let mut surface = Surface::new(Recorder::default());
        let a = surface.a;

        surface.down(a, finger(1, 0.0, 0.0, true));
        surface.send(terminal(finger(1, 1.0, 1.0, false)));

        assert_eq!(
            surface.outer_calls(),
            vec![
                Call::DragStart(pos2(0.0, 0.0)),
                Call::DragEnd {
                    start: Some(pos2(0.0, 0.0)),
                    prev: None
                },
            ]
        );
        assert_eq!(surface.arbiter.lock_owner(), None);
        assert!(surface.capture.is_empty());
    }
}

#[test]
fn test_stale_gesture_is_reset_on_new_primary_down() {
    let mut surface = Surface::new(Recorder::default());
    let a = surface.a;

    surface.down(a, finger(1, 0.0, 0.0, true));
    // The up for finger 1 never arrived
    surface.down(a, finger(7, 5.0, 5.0, true));

    assert_eq!(
        surface.outer_calls(),
        vec![Call::DragStart(pos2(0.0, 0.0)), Call::DragStart(pos2(5.0, 5.0))]
    );
    assert_eq!(surface.arbiter.active_pointers().len(), 1);
    assert_eq!(surface.arbiter.lock_owner(), Some(a));
    assert_eq!(surface.capture.owner(PointerId::touch(1)), None);
}

#[test]
fn test_moves_without_capture_are_ignored() {
    let mut surface = Surface::new(Recorder::default());
    let a = surface.a;

    surface.down(a, finger(1, 0.0, 0.0, true));
    surface.capture.release_capture(a, PointerId::touch(1));
    surface.send(InputEvent::PointerMove(finger(1, 4.0, 0.0, false)));

    assert_eq!(surface.outer_calls().len(), 1);
}

#[test]
fn test_unregistering_lock_owner_drops_lock_and_subtree() {
    let mut surface = Surface::new(Recorder::default());
    let a = surface.a;

    surface.down(a, finger(1, 0.0, 0.0, true));
    surface.arbiter.unregister(a, &mut surface.capture);

    assert_eq!(surface.arbiter.lock_owner(), None);
    assert_eq!(surface.arbiter.region_count(), 0);
    assert!(surface.capture.is_empty());
    // No end callback for a removed region
    assert_eq!(surface.outer_calls().len(), 1);
}

#[test]
fn test_ancestry() {
    let surface = Surface::new(Recorder::default());
    assert!(surface.arbiter.is_ancestor(surface.a, surface.b));
    assert!(!surface.arbiter.is_ancestor(surface.b, surface.a));
    assert!(!surface.arbiter.is_ancestor(surface.a, surface.a));
}

/// A single drawing panel wired up the way the app does it.
struct Workspace {
    editor: EditorContext,
    queue: CommandQueue,
    arbiter: GestureArbiter,
    capture: CaptureTable,
    frame: RegionId,
    canvas: RegionId,
    drawing_id: String,
    panel_id: String,
}

impl Workspace {
    fn new() -> Self {
        let drawing = Drawing::new("sprite", 8, 8).unwrap();
        let drawing_id = drawing.id().to_string();
        let panel = Panel::for_drawing(&drawing_id, 0.0, 0.0);
        let panel_id = panel.id().to_string();
        let canvas_rect = Rect::from_min_size(pos2(0.0, 0.0), Vec2::splat(8.0 * drawing.pixel_size() as f32));

        let queue = CommandQueue::new();
        let mut arbiter = GestureArbiter::new();
        let drag = Rc::new(RefCell::new(PanelDragTool::new(queue.clone(), &panel)));
        let pencil = Rc::new(RefCell::new(PencilTool::new(queue.clone(), &drawing, canvas_rect)));
        let frame = arbiter.register(None, drag);
        let canvas = arbiter.register(Some(frame), pencil);

        let project = Project::from_parts("p", "p", vec![drawing], vec![panel], Vec::new()).unwrap();
        Self {
            editor: EditorContext::new(project),
            queue,
            arbiter,
            capture: CaptureTable::new(),
            frame,
            canvas,
            drawing_id,
            panel_id,
        }
    }

    fn handle(&mut self, target: Option<RegionId>, event: InputEvent) {
        self.arbiter.handle(target, &event, &mut self.capture);
    }

    fn flush(&mut self) -> Vec<Applied> {
        self.queue
            .drain()
            .into_iter()
            .map(|command| self.editor.dispatch(command).unwrap())
            .collect()
    }

    fn pixel(&self, row: i32, col: i32) -> Option<Color> {
        self.editor
            .project()
            .drawing(&self.drawing_id)
            .unwrap()
            .pixel(Position::new(row, col))
            .unwrap()
    }
}

fn mouse(x: f32, y: f32) -> PointerEvent {
    PointerEvent::new(PointerId::MOUSE, pos2(x, y), true)
}

#[test]
fn test_pencil_stroke_is_one_undo_step() {
    let mut workspace = Workspace::new();
    let canvas = workspace.canvas;

    workspace.handle(Some(canvas), InputEvent::PointerDown(mouse(5.0, 5.0)));
    workspace.handle(None, InputEvent::PointerMove(mouse(65.0, 5.0)));
    workspace.handle(None, InputEvent::PointerUp(mouse(65.0, 5.0)));

    let applied = workspace.flush();
    assert_eq!(applied[0], Applied::Pushed);
    assert!(applied[1..].iter().all(|a| *a == Applied::Coalesced));
    assert_eq!(workspace.editor.history().len(), 2);
    for col in 0..4 {
        assert_eq!(workspace.pixel(0, col), Some(Color::BLACK));
    }
    assert_eq!(workspace.pixel(0, 4), None);

    workspace.editor.dispatch(Command::Undo).unwrap();
    assert_eq!(workspace.pixel(0, 0), None);
}

#[test]
fn test_pencil_moves_inside_one_cell_paint_once() {
    let mut workspace = Workspace::new();
    let canvas = workspace.canvas;

    workspace.handle(Some(canvas), InputEvent::PointerDown(mouse(5.0, 5.0)));
    workspace.handle(None, InputEvent::PointerMove(mouse(9.0, 9.0)));
    workspace.handle(None, InputEvent::PointerMove(mouse(12.0, 3.0)));
    assert_eq!(workspace.queue.len(), 1);

    workspace.handle(None, InputEvent::PointerMove(mouse(20.0, 3.0)));
    workspace.handle(None, InputEvent::PointerUp(mouse(20.0, 3.0)));
    assert_eq!(workspace.queue.len(), 2);
    workspace.flush();
    assert_eq!(workspace.pixel(0, 0), Some(Color::BLACK));
    assert_eq!(workspace.pixel(0, 1), Some(Color::BLACK));
    assert_eq!(workspace.editor.history().len(), 2);
}

#[test]
fn test_pinch_on_canvas_commits_pixel_size_once() {
    let mut workspace = Workspace::new();
    let canvas = workspace.canvas;

    workspace.handle(Some(canvas), InputEvent::PointerDown(finger(1, 10.0, 10.0, true)));
    workspace.handle(Some(canvas), InputEvent::PointerDown(finger(2, 30.0, 10.0, false)));
    workspace.handle(None, InputEvent::PointerMove(finger(2, 50.0, 10.0, false)));
    workspace.handle(None, InputEvent::PointerUp(finger(2, 50.0, 10.0, false)));
    workspace.handle(None, InputEvent::PointerUp(finger(1, 10.0, 10.0, false)));

    let commands = workspace.queue.drain();
    let resizes: Vec<&Command> = commands
        .iter()
        .filter(|command| matches!(command, Command::SetPixelSize { .. }))
        .collect();
    assert_eq!(
        resizes,
        vec![&Command::SetPixelSize {
            drawing_id: workspace.drawing_id.clone(),
            pixel_size: 40,
        }]
    );
}

#[test]
fn test_dragging_the_frame_moves_the_panel() {
    let mut workspace = Workspace::new();
    let frame = workspace.frame;

    workspace.handle(Some(frame), InputEvent::PointerDown(mouse(100.0, 100.0)));
    workspace.handle(None, InputEvent::PointerMove(mouse(110.0, 105.0)));
    workspace.handle(None, InputEvent::PointerMove(mouse(120.0, 110.0)));
    workspace.handle(None, InputEvent::PointerUp(mouse(120.0, 110.0)));

    let applied = workspace.flush();
    // Raising the only panel changes nothing
    assert_eq!(applied, vec![Applied::Unchanged, Applied::Pushed, Applied::Coalesced]);

    let panel = workspace.editor.project().panel(&workspace.panel_id).unwrap();
    assert_eq!(panel.position(), pos2(20.0, 10.0));
    assert_eq!(workspace.editor.history().len(), 2);
}
