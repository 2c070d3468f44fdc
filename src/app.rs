use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use eframe::egui::{self, Key, Modifiers, Pos2, Rect};

use crate::color::Color;
use crate::command::{Command, CommandContext};
use crate::document::{Drawing, Project, ZOffset};
use crate::file_handler::FileHandler;
use crate::input::{CaptureTable, GestureArbiter, HitMap, InputEvent, InputHandler, RegionId};
use crate::renderer::{panel_layout, palette_strip, PanelLayout, Renderer};
use crate::state::{Autosave, EditorContext, PendingSave};
use crate::tools::{CommandQueue, Corner, PanelDragTool, PencilTool, ResizeHandleTool};

/// Storage key of the autosaved project document.
pub const STORAGE_KEY: &str = "pixel_editor_project";

/// Gesture regions of one open panel: the frame drags the panel, the canvas
/// paints, and each corner handle resizes.
struct PanelRegions {
    drawing_id: String,
    frame: RegionId,
    canvas: RegionId,
    handles: Vec<(RegionId, Rc<RefCell<ResizeHandleTool>>)>,
    drag: Rc<RefCell<PanelDragTool>>,
    pencil: Rc<RefCell<PencilTool>>,
}

pub struct PixelApp {
    editor: EditorContext,
    pending_save: PendingSave,
    queue: CommandQueue,
    arbiter: GestureArbiter,
    capture: CaptureTable,
    hit_map: HitMap,
    input: InputHandler,
    file_handler: FileHandler,
    renderer: Renderer,
    regions: HashMap<String, PanelRegions>,
    brush_color: egui::Color32,
    eraser: bool,
    project_name: String,
    /// Edit buffer for the active drawing's name
    drawing_name: String,
    last_error: Option<String>,
}

impl Default for PixelApp {
    fn default() -> Self {
        Self::boot(None)
    }
}

impl PixelApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let persisted = cc.storage.and_then(|storage| storage.get_string(STORAGE_KEY));
        Self::boot(persisted.as_deref())
    }

    /// Restores `persisted` (or starts fresh) and wires autosave.
    pub fn boot(persisted: Option<&str>) -> Self {
        let editor = EditorContext::boot(persisted, CommandContext::default());
        let pending_save = PendingSave::new();
        editor.subscribe(Box::new(Autosave::new(pending_save.clone())));
        let project_name = editor.project().name().to_owned();
        let drawing_name = active_drawing(editor.project())
            .map(|drawing| drawing.name().to_owned())
            .unwrap_or_default();

        Self {
            editor,
            pending_save,
            queue: CommandQueue::new(),
            arbiter: GestureArbiter::new(),
            capture: CaptureTable::new(),
            hit_map: HitMap::new(),
            input: InputHandler::new(),
            file_handler: FileHandler::new(),
            renderer: Renderer::new(),
            regions: HashMap::new(),
            brush_color: egui::Color32::BLACK,
            eraser: false,
            project_name,
            drawing_name,
            last_error: None,
        }
    }

    pub fn editor(&self) -> &EditorContext {
        &self.editor
    }

    fn current_color(&self) -> Option<Color> {
        (!self.eraser).then(|| Color::from(self.brush_color))
    }

    fn dispatch(&mut self, command: Command) {
        match self.editor.dispatch(command) {
            Ok(_) => {}
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    fn dispatch_queued(&mut self) {
        for command in self.queue.drain() {
            self.dispatch(command);
        }
    }

    fn route_input(&mut self, ctx: &egui::Context) {
        for event in self.input.process_input(ctx) {
            let target = match &event {
                InputEvent::PointerDown(pointer) => self.hit_map.target_at(pointer.pos),
                _ => None,
            };
            self.arbiter.handle(target, &event, &mut self.capture);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (redo, undo) = ctx.input_mut(|i| {
            let redo = i.consume_key(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)
                || i.consume_key(Modifiers::COMMAND, Key::Y);
            let undo = i.consume_key(Modifiers::COMMAND, Key::Z);
            (redo, undo)
        });
        if redo {
            self.dispatch(Command::Redo);
        }
        if undo {
            self.dispatch(Command::Undo);
        }
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        let project = self.editor.current_snapshot();
        let mut commands = Vec::new();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                if ui.button("New").clicked() {
                    commands.push(Command::NewProject);
                }
                let name_edit = ui.add(egui::TextEdit::singleline(&mut self.project_name).desired_width(120.0));
                if name_edit.lost_focus() && self.project_name != project.name() {
                    commands.push(Command::Rename {
                        name: self.project_name.clone(),
                    });
                }
                if ui.button("Add drawing").clicked() {
                    commands.push(Command::AddDrawing);
                }
                ui.separator();

                if ui.add_enabled(self.editor.can_undo(), egui::Button::new("Undo")).clicked() {
                    commands.push(Command::Undo);
                }
                if ui.add_enabled(self.editor.can_redo(), egui::Button::new("Redo")).clicked() {
                    commands.push(Command::Redo);
                }
                ui.separator();

                egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut self.brush_color,
                    egui::color_picker::Alpha::Opaque,
                );
                ui.toggle_value(&mut self.eraser, "Eraser");
                let mut show_grid = self.renderer.show_grid();
                if ui.checkbox(&mut show_grid, "Grid").changed() {
                    self.renderer.set_show_grid(show_grid);
                }

                match palette_strip(ui, project.palette()) {
                    Some((index, true)) => commands.push(Command::SetPalette { index, color: None }),
                    Some((index, false)) => {
                        if let Some(color) = project.palette()[index] {
                            self.brush_color = color.to_color32();
                            self.eraser = false;
                        }
                    }
                    None => {}
                }
                if ui.button("+").on_hover_text("Add color to palette").clicked() {
                    commands.push(Command::SetPalette {
                        index: project.palette().len(),
                        color: Some(Color::from(self.brush_color)),
                    });
                }
                ui.separator();

                active_panel_menu(ui, &project, &mut self.drawing_name, &mut commands);
                closed_drawings_menu(ui, &project, &mut commands);
            });

            if let Some(err) = &self.last_error {
                let mut dismissed = false;
                ui.horizontal(|ui| {
                    ui.colored_label(ui.visuals().error_fg_color, err);
                    dismissed = ui.small_button("✕").clicked();
                });
                if dismissed {
                    self.last_error = None;
                }
            }
        });

        for command in commands {
            self.dispatch(command);
        }
        if !ctx.memory(|mem| mem.focused().is_some()) {
            let project = self.editor.project();
            if self.project_name != project.name() {
                self.project_name = project.name().to_owned();
            }
            let drawing_name = active_drawing(project).map_or("", Drawing::name);
            if self.drawing_name != drawing_name {
                self.drawing_name = drawing_name.to_owned();
            }
        }
    }

    /// Registers regions for newly opened panels, drops those of closed
    /// panels, and refreshes every tool from the current snapshot.
    fn sync_regions(&mut self, project: &Project, layouts: &[(String, PanelLayout)]) {
        let open: Vec<&str> = project.panels().map(|panel| panel.id()).collect();
        let closed: Vec<String> = self
            .regions
            .keys()
            .filter(|id| !open.contains(&id.as_str()))
            .cloned()
            .collect();
        for panel_id in closed {
            if let Some(regions) = self.regions.remove(&panel_id) {
                self.arbiter.unregister(regions.frame, &mut self.capture);
            }
        }

        let color = self.current_color();
        for (panel, (_, layout)) in project.panels().zip(layouts) {
            let Some(drawing) = panel.drawing_id().and_then(|id| project.drawing(id).ok()) else {
                continue;
            };

            // A panel reused for another drawing gets fresh regions
            let stale = self
                .regions
                .get(panel.id())
                .is_some_and(|regions| regions.drawing_id != drawing.id());
            if stale {
                if let Some(regions) = self.regions.remove(panel.id()) {
                    self.arbiter.unregister(regions.frame, &mut self.capture);
                }
            }
            if let Some(regions) = self.regions.get(panel.id()) {
                regions.drag.borrow_mut().sync(panel);
                let mut pencil = regions.pencil.borrow_mut();
                pencil.sync(drawing, layout.canvas);
                pencil.set_color(color);
                for (_, handle) in &regions.handles {
                    handle.borrow_mut().sync(drawing);
                }
                continue;
            }

            let drag = Rc::new(RefCell::new(PanelDragTool::new(self.queue.clone(), panel)));
            let mut pencil_tool = PencilTool::new(self.queue.clone(), drawing, layout.canvas);
            pencil_tool.set_color(color);
            let pencil = Rc::new(RefCell::new(pencil_tool));

            let frame = self.arbiter.register(None, drag.clone());
            let canvas = self.arbiter.register(Some(frame), pencil.clone());
            let handles = Corner::ALL
                .into_iter()
                .map(|corner| {
                    let tool = Rc::new(RefCell::new(ResizeHandleTool::new(self.queue.clone(), corner, drawing)));
                    (self.arbiter.register(Some(frame), tool.clone()), tool)
                })
                .collect();

            log::debug!("Registered gesture regions for panel {}", panel.id());
            self.regions.insert(
                panel.id().to_owned(),
                PanelRegions {
                    drawing_id: drawing.id().to_owned(),
                    frame,
                    canvas,
                    handles,
                    drag,
                    pencil,
                },
            );
        }
    }

    fn workspace(&mut self, ctx: &egui::Context) {
        let project = self.editor.current_snapshot();

        egui::CentralPanel::default().show(ctx, |ui| {
            let workspace = ui.max_rect();
            let painter = ui.painter_at(workspace);

            let layouts: Vec<(String, PanelLayout)> = project
                .panels()
                .filter_map(|panel| {
                    let drawing = project.drawing(panel.drawing_id()?).ok()?;
                    let pixel_size = self
                        .regions
                        .get(panel.id())
                        .and_then(|regions| regions.pencil.borrow().zoom_preview())
                        .unwrap_or(drawing.pixel_size());
                    Some((
                        panel.id().to_owned(),
                        panel_layout(workspace.min, panel, drawing, pixel_size),
                    ))
                })
                .collect();

            self.sync_regions(&project, &layouts);

            let active = project.active_panel().map(|panel| panel.id().to_owned());
            self.hit_map.clear();
            for (panel_id, layout) in &layouts {
                let Some(regions) = self.regions.get(panel_id) else {
                    continue;
                };
                let Ok(drawing) = project.drawing(&regions.drawing_id) else {
                    continue;
                };

                let selection = regions
                    .handles
                    .iter()
                    .find_map(|(_, handle)| handle.borrow().selection());
                self.renderer.draw_panel(
                    &painter,
                    layout,
                    drawing,
                    active.as_deref() == Some(panel_id.as_str()),
                    selection,
                );

                // Later insertions win, so children go after their parent
                insert_clipped(&mut self.hit_map, regions.frame, layout.frame, workspace);
                insert_clipped(&mut self.hit_map, regions.canvas, layout.canvas, workspace);
                for ((region, _), (_, rect)) in regions.handles.iter().zip(layout.handle_rects()) {
                    insert_clipped(&mut self.hit_map, *region, rect, workspace);
                }
            }

            if let Some(hover) = ctx.pointer_hover_pos() {
                self.update_cursor(ctx, hover);
            }
        });
    }

    fn update_cursor(&self, ctx: &egui::Context, hover: Pos2) {
        let Some(target) = self.hit_map.target_at(hover) else {
            return;
        };
        for regions in self.regions.values() {
            if let Some((_, handle)) = regions.handles.iter().find(|(region, _)| *region == target) {
                ctx.set_cursor_icon(handle.borrow().corner().cursor_icon());
                return;
            }
            if regions.frame == target {
                ctx.set_cursor_icon(egui::CursorIcon::Grab);
                return;
            }
            if regions.canvas == target {
                ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
                return;
            }
        }
    }
}

fn insert_clipped(hit_map: &mut HitMap, region: RegionId, rect: Rect, clip: Rect) {
    let rect = rect.intersect(clip);
    if rect.is_positive() {
        hit_map.insert(region, rect);
    }
}

/// The drawing shown in the topmost panel.
fn active_drawing(project: &Project) -> Option<&Drawing> {
    let drawing_id = project.active_panel()?.drawing_id()?;
    project.drawing(drawing_id).ok()
}

/// The rename to dispatch once the name field loses focus, if the edited
/// text is a usable new name.
fn rename_command(drawing: &Drawing, edited: &str) -> Option<Command> {
    let name = edited.trim();
    (!name.is_empty() && name != drawing.name()).then(|| Command::RenameDrawing {
        drawing_id: drawing.id().to_owned(),
        name: name.to_owned(),
    })
}

fn active_panel_menu(
    ui: &mut egui::Ui,
    project: &Project,
    drawing_name: &mut String,
    commands: &mut Vec<Command>,
) {
    let Some(panel) = project.active_panel() else {
        return;
    };
    let Some(drawing_id) = panel.drawing_id() else {
        return;
    };

    let name_edit = ui.add(egui::TextEdit::singleline(drawing_name).desired_width(100.0));
    if name_edit.lost_focus() {
        if let Ok(drawing) = project.drawing(drawing_id) {
            commands.extend(rename_command(drawing, drawing_name));
        }
    }

    if ui.button("Copy").clicked() {
        commands.push(Command::CopyDrawing {
            drawing_id: drawing_id.to_owned(),
        });
    }
    if ui.button("Delete").clicked() {
        commands.push(Command::DeleteDrawing {
            drawing_id: drawing_id.to_owned(),
        });
    }
    if ui.button("Close").clicked() {
        commands.push(Command::ClosePanel {
            panel_id: panel.id().to_owned(),
        });
    }

    // The active panel is already on top, so it can only go down
    let lowered = [("Lower", ZOffset::By(-1)), ("To back", ZOffset::Back)];
    for (label, offset) in lowered {
        let enabled = project.panel_count() > 1;
        if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
            commands.push(Command::SetPanelZ {
                panel_id: panel.id().to_owned(),
                offset,
            });
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    if ui.button("Export PNG").clicked() {
        if let Ok(drawing) = project.drawing(drawing_id) {
            match std::env::current_dir() {
                Ok(dir) => {
                    if let Err(err) = crate::file_handler::export_png(drawing, &dir, drawing.pixel_size()) {
                        log::error!("Export failed: {err}");
                    }
                }
                Err(err) => log::error!("Export failed: {err}"),
            }
        }
    }
}

fn closed_drawings_menu(ui: &mut egui::Ui, project: &Project, commands: &mut Vec<Command>) {
    let closed: Vec<_> = project
        .drawings()
        .filter(|drawing| project.panel_for_drawing(drawing.id()).is_none())
        .collect();
    if closed.is_empty() {
        return;
    }

    ui.menu_button("Open", |ui| {
        let (x, y) = project.next_panel_position();
        for drawing in closed {
            if ui.button(drawing.name()).clicked() {
                commands.push(Command::OpenPanel {
                    drawing_id: drawing.id().to_owned(),
                    x,
                    y,
                });
                ui.close_menu();
            }
        }
    });
}

impl eframe::App for PixelApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(document) = self.pending_save.take() {
            storage.set_string(STORAGE_KEY, document);
            log::debug!("Saved project to storage");
        }
    }

    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(5)
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Input is hit-tested against last frame's layout
        self.route_input(ctx);
        self.dispatch_queued();

        if self.file_handler.check_for_dropped_files(ctx) {
            for command in self.file_handler.process_dropped_files() {
                self.dispatch(command);
            }
        }

        self.handle_shortcuts(ctx);
        self.top_bar(ctx);
        self.editor.set_viewport_width(ctx.screen_rect().width());
        self.workspace(ctx);
        self.file_handler.preview_files_being_dropped(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_skips_blank_and_unchanged_names() {
        let drawing = Drawing::new("Hero", 1, 1).unwrap();

        assert_eq!(rename_command(&drawing, "   "), None);
        assert_eq!(rename_command(&drawing, "Hero"), None);
        assert_eq!(
            rename_command(&drawing, " Villain "),
            Some(Command::RenameDrawing {
                drawing_id: drawing.id().to_owned(),
                name: "Villain".to_owned(),
            })
        );
    }

    #[test]
    fn active_drawing_follows_the_top_panel() {
        let mut project = Project::with_default_drawing(1024.0);
        let first = project.drawings().next().unwrap().id().to_owned();
        assert_eq!(active_drawing(&project).map(Drawing::id), Some(first.as_str()));

        let panel_id = project.active_panel().unwrap().id().to_owned();
        project.close_panel(&panel_id).unwrap();
        assert!(active_drawing(&project).is_none());
    }
}
