use std::cell::RefCell;
use std::rc::Rc;

use pixel_editor::color::Color;
use pixel_editor::command::{Command, CommandContext, CommandKind};
use pixel_editor::document::{Drawing, Panel, PanelKind, Project};
use pixel_editor::error::ModelError;
use pixel_editor::event::{EditorEvent, EventHandler};
use pixel_editor::geometry::Position;
use pixel_editor::state::{
    deserialize, serialize, serialize_to_string, Autosave, EditorContext, PendingSave,
    PersistenceError,
};

const DOCUMENT: &str = r#"{
    "id": "p1",
    "name": "Sprites",
    "palette": [{"rgb": [255, 0, 0]}, null, {"hsl": [120, 100, 50]}],
    "drawings": [
        {"id": "d1", "name": "Hero", "pixelSize": 12,
         "data": [[null, {"hsv": [240, 100, 100]}], [{"rgb": [1, 2, 3]}, null]]}
    ],
    "panels": [{"id": "w1", "x": 40, "y": 60.5, "type": "drawing", "drawingId": "d1"}]
}"#;

fn create_test_project() -> Project {
    let mut drawing = Drawing::new("Hero", 3, 2).unwrap();
    drawing
        .set_pixel(Position::new(0, 1), Some(Color::hsv(30.0, 50.0, 80.0).unwrap()))
        .unwrap();
    drawing
        .set_pixel(Position::new(2, 0), Some(Color::rgb(9, 8, 7)))
        .unwrap();
    let panel = Panel::for_drawing(drawing.id(), 12.5, 30.0);
    Project::from_parts(
        "project",
        "Sprites",
        vec![drawing],
        vec![panel],
        vec![None, Some(Color::hsl(200.0, 40.0, 40.0).unwrap())],
    )
    .unwrap()
}

#[test]
fn test_round_trip_preserves_project() {
    let project = create_test_project();
    let bytes = serialize(&project).unwrap();
    let loaded = deserialize(&bytes).unwrap();
    assert_eq!(loaded, project);
}

#[test]
fn test_reads_documented_format() {
    let project = deserialize(DOCUMENT.as_bytes()).unwrap();

    assert_eq!(project.id(), "p1");
    assert_eq!(project.name(), "Sprites");
    assert_eq!(
        project.palette(),
        &[Some(Color::rgb(255, 0, 0)), None, Some(Color::rgb(0, 255, 0))]
    );

    let drawing = project.drawing("d1").unwrap();
    assert_eq!(drawing.pixel_size(), 12);
    assert_eq!((drawing.row_count(), drawing.column_count()), (2, 2));
    assert_eq!(
        drawing.pixel(Position::new(0, 1)).unwrap(),
        Some(Color::rgb(0, 0, 255))
    );
    assert_eq!(drawing.pixel(Position::new(1, 0)).unwrap(), Some(Color::rgb(1, 2, 3)));

    let panel = project.panel("w1").unwrap();
    assert_eq!(panel.position(), egui::pos2(40.0, 60.5));
    assert_eq!(
        panel.kind(),
        &PanelKind::Drawing {
            drawing_id: "d1".to_string()
        }
    );
}

#[test]
fn test_written_json_uses_tagged_shapes() {
    let json: serde_json::Value = serde_json::from_str(&serialize_to_string(&create_test_project()).unwrap()).unwrap();

    assert_eq!(json["panels"][0]["type"], "drawing");
    assert!(json["panels"][0]["drawingId"].is_string());
    assert!(json["drawings"][0]["pixelSize"].is_number());
    assert!(json["drawings"][0]["data"][0][0].is_null());
    assert!(json["drawings"][0]["data"][0][1]["hsv"].is_array());
    assert_eq!(json["drawings"][0]["data"][2][0]["rgb"], serde_json::json!([9, 8, 7]));
    assert!(json["palette"][1]["hsl"].is_array());
}

#[test]
fn test_missing_field_is_named() {
    let broken = DOCUMENT.replace(r#""pixelSize": 12,"#, "");
    let err = deserialize(broken.as_bytes()).unwrap_err();
    assert!(matches!(err, PersistenceError::Json(_)));
    assert!(err.to_string().contains("pixelSize"), "{err}");
}

#[test]
fn test_unknown_panel_type_is_rejected() {
    let broken = DOCUMENT.replace(r#""type": "drawing""#, r#""type": "palette""#);
    assert!(matches!(
        deserialize(broken.as_bytes()),
        Err(PersistenceError::Json(_))
    ));
}

#[test]
fn test_out_of_range_color_is_rejected() {
    let broken = DOCUMENT.replace("[240, 100, 100]", "[240, 150, 100]");
    let err = deserialize(broken.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("saturation"), "{err}");
}

#[test]
fn test_ragged_grid_is_rejected() {
    let broken = DOCUMENT.replace(r#"[{"rgb": [1, 2, 3]}, null]"#, r#"[{"rgb": [1, 2, 3]}]"#);
    assert!(matches!(
        deserialize(broken.as_bytes()),
        Err(PersistenceError::InvalidDrawing {
            source: ModelError::RaggedRow { row: 1, found: 1, expected: 2 },
            ..
        })
    ));
}

#[test]
fn test_pixel_size_out_of_range_is_rejected() {
    for (size, value) in [("0", 0), ("129", 129)] {
        let broken = DOCUMENT.replace(r#""pixelSize": 12"#, &format!(r#""pixelSize": {size}"#));
        assert!(matches!(
            deserialize(broken.as_bytes()),
            Err(PersistenceError::InvalidDrawing {
                source: ModelError::PixelSizeOutOfRange(found),
                ..
            }) if found == value
        ));
    }
}

#[test]
fn test_dangling_panel_is_rejected() {
    let broken = DOCUMENT.replace(r#""drawingId": "d1""#, r#""drawingId": "nope""#);
    assert!(matches!(
        deserialize(broken.as_bytes()),
        Err(PersistenceError::Invalid(ModelError::DrawingNotFound(id))) if id == "nope"
    ));
}

#[test]
fn test_trailing_palette_gaps_are_trimmed_on_load() {
    let padded = DOCUMENT.replace(
        r#"{"hsl": [120, 100, 50]}]"#,
        r#"{"hsl": [120, 100, 50]}, null, null]"#,
    );
    let project = deserialize(padded.as_bytes()).unwrap();
    assert_eq!(project.palette().len(), 3);
}

#[test]
fn test_boot_restores_or_falls_back() {
    let restored = EditorContext::boot(Some(DOCUMENT), CommandContext::default());
    assert_eq!(restored.project().name(), "Sprites");
    assert!(!restored.can_undo());

    let fresh = EditorContext::boot(Some("not json"), CommandContext::default());
    assert_eq!(fresh.project().name(), "Untitled");
    assert_eq!(fresh.project().drawing_count(), 1);
    assert_eq!(fresh.project().panel_count(), 1);
}

#[test]
fn test_autosave_tracks_settled_snapshots() {
    let mut editor = EditorContext::new(create_test_project());
    let pending = PendingSave::new();
    editor.subscribe(Box::new(Autosave::new(pending.clone())));

    // No-ops do not settle anything
    editor
        .dispatch(Command::Rename {
            name: "Sprites".to_string(),
        })
        .unwrap();
    assert!(!pending.is_pending());

    editor
        .dispatch(Command::Rename {
            name: "Tiles".to_string(),
        })
        .unwrap();
    let saved = pending.take().unwrap();
    assert_eq!(deserialize(saved.as_bytes()).unwrap().name(), "Tiles");

    editor.dispatch(Command::Undo).unwrap();
    let saved = pending.take().unwrap();
    assert_eq!(deserialize(saved.as_bytes()).unwrap().name(), "Sprites");
    assert!(!pending.is_pending());
}

#[derive(Clone, Default)]
struct EventLog(Rc<RefCell<Vec<EditorEvent>>>);

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &EditorEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

#[test]
fn test_rejected_commands_are_reported() {
    let mut editor = EditorContext::new(create_test_project());
    let log = EventLog::default();
    editor.subscribe(Box::new(log.clone()));

    let result = editor.dispatch(Command::Load {
        document: "{}".to_string(),
    });
    assert!(result.is_err());
    assert_eq!(editor.history().len(), 1);

    let events = log.0.borrow();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        EditorEvent::CommandRejected {
            kind: CommandKind::Load,
            ..
        }
    ));
}

#[test]
fn test_load_replaces_document_undoably() {
    let mut editor = EditorContext::new(create_test_project());
    editor
        .dispatch(Command::Load {
            document: DOCUMENT.to_string(),
        })
        .unwrap();
    assert_eq!(editor.project().id(), "p1");

    editor.dispatch(Command::Undo).unwrap();
    assert_eq!(editor.project().id(), "project");
}
