// src/renderer.rs
use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2};

use crate::document::{Drawing, Panel};
use crate::geometry::GridRect;
use crate::tools::Corner;

pub const TITLE_BAR_HEIGHT: f32 = 24.0;
/// Side of the square grab area on each canvas corner.
pub const HANDLE_SIZE: f32 = 12.0;

const CHECKER_LIGHT: Color32 = Color32::from_gray(230);
const CHECKER_DARK: Color32 = Color32::from_gray(200);

/// Screen geometry of one open panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    /// Title bar and canvas together
    pub frame: Rect,
    pub title_bar: Rect,
    pub canvas: Rect,
}

impl PanelLayout {
    pub fn handle_rects(&self) -> [(Corner, Rect); 4] {
        Corner::ALL.map(|corner| (corner, corner.handle_rect(self.canvas, HANDLE_SIZE)))
    }
}

/// Lays out `panel` with its title bar above a canvas sized for `drawing`
/// at `pixel_size`, offset by `origin` (the workspace's top-left corner).
pub fn panel_layout(origin: Pos2, panel: &Panel, drawing: &Drawing, pixel_size: u32) -> PanelLayout {
    let min = origin + panel.position().to_vec2();
    let px = pixel_size as f32;
    let canvas_size = Vec2::new(drawing.column_count() as f32 * px, drawing.row_count() as f32 * px);
    let title_bar = Rect::from_min_size(min, Vec2::new(canvas_size.x, TITLE_BAR_HEIGHT));
    let canvas = Rect::from_min_size(title_bar.left_bottom(), canvas_size);
    PanelLayout {
        frame: title_bar.union(canvas),
        title_bar,
        canvas,
    }
}

/// Paints panels and their drawings.
#[derive(Debug, Clone)]
pub struct Renderer {
    show_grid: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self { show_grid: true }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn set_show_grid(&mut self, show_grid: bool) {
        self.show_grid = show_grid;
    }

    /// Paints one panel. `selection` is a resize preview in the drawing's
    /// cell coordinates and may reach outside the grid.
    pub fn draw_panel(
        &self,
        painter: &Painter,
        layout: &PanelLayout,
        drawing: &Drawing,
        active: bool,
        selection: Option<GridRect>,
    ) {
        let visuals = painter.ctx().style().visuals.clone();
        let title_fill = if active {
            visuals.selection.bg_fill
        } else {
            visuals.widgets.inactive.bg_fill
        };

        painter.rect_filled(layout.title_bar, 0.0, title_fill);
        painter.text(
            layout.title_bar.left_center() + Vec2::new(6.0, 0.0),
            Align2::LEFT_CENTER,
            drawing.name(),
            FontId::proportional(14.0),
            visuals.strong_text_color(),
        );

        self.draw_cells(painter, layout.canvas, drawing);

        if let Some(selection) = selection {
            self.draw_selection(painter, layout, drawing, selection);
        }

        painter.rect_stroke(
            layout.frame,
            0.0,
            Stroke::new(if active { 2.0 } else { 1.0 }, visuals.widgets.active.bg_stroke.color),
        );
        for (_, rect) in layout.handle_rects() {
            painter.rect_filled(rect, 2.0, visuals.widgets.inactive.fg_stroke.color);
        }
    }

    fn draw_cells(&self, painter: &Painter, canvas: Rect, drawing: &Drawing) {
        let cell_size = Vec2::new(
            canvas.width() / drawing.column_count() as f32,
            canvas.height() / drawing.row_count() as f32,
        );

        for (row, cells) in drawing.rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let min = canvas.min + Vec2::new(col as f32 * cell_size.x, row as f32 * cell_size.y);
                let rect = Rect::from_min_size(min, cell_size);
                let fill = match cell {
                    Some(color) => color.to_color32(),
                    None if (row + col) % 2 == 0 => CHECKER_LIGHT,
                    None => CHECKER_DARK,
                };
                painter.rect_filled(rect, 0.0, fill);
            }
        }

        // Grid lines get in the way once cells are tiny
        if self.show_grid && cell_size.x >= 6.0 {
            let stroke = Stroke::new(1.0, Color32::from_black_alpha(24));
            for col in 1..drawing.column_count() {
                let x = canvas.left() + col as f32 * cell_size.x;
                painter.vline(x, canvas.y_range(), stroke);
            }
            for row in 1..drawing.row_count() {
                let y = canvas.top() + row as f32 * cell_size.y;
                painter.hline(canvas.x_range(), y, stroke);
            }
        }
    }

    fn draw_selection(&self, painter: &Painter, layout: &PanelLayout, drawing: &Drawing, selection: GridRect) {
        let selection = selection.normalized();
        let cell = Vec2::new(
            layout.canvas.width() / drawing.column_count() as f32,
            layout.canvas.height() / drawing.row_count() as f32,
        );
        let rect = Rect::from_min_max(
            layout.canvas.min + Vec2::new(selection.start.col as f32 * cell.x, selection.start.row as f32 * cell.y),
            layout.canvas.min
                + Vec2::new(
                    (selection.end.col + 1) as f32 * cell.x,
                    (selection.end.row + 1) as f32 * cell.y,
                ),
        );
        painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(70, 130, 220, 40));
        painter.rect_stroke(rect, 0.0, Stroke::new(2.0, Color32::from_rgb(70, 130, 220)));
    }
}

/// Paints a row of palette swatches. Returns the index that was clicked and
/// whether it was a secondary click.
pub fn palette_strip(ui: &mut egui::Ui, palette: &[Option<crate::color::Color>]) -> Option<(usize, bool)> {
    let mut picked = None;
    for (index, slot) in palette.iter().enumerate() {
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(18.0), egui::Sense::click());
        let fill = slot.map_or(Color32::TRANSPARENT, |color| color.to_color32());
        ui.painter().rect_filled(rect, 2.0, fill);
        ui.painter()
            .rect_stroke(rect, 2.0, Stroke::new(1.0, ui.visuals().widgets.inactive.fg_stroke.color));
        if response.clicked() {
            picked = Some((index, false));
        } else if response.secondary_clicked() {
            picked = Some((index, true));
        }
    }
    picked
}
