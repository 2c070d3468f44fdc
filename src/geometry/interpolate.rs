use egui::Pos2;

use super::{cell_at, cell_at_f64, Position};

/// Cells crossed by the straight segment from `previous` to `current`, in order.
///
/// Stepped samples that land in `previous`'s cell are skipped, since the
/// sample that produced it already emitted that cell. The cell under
/// `current` is always last, even when the move stayed inside one cell.
/// Returns nothing when the pointer did not move, so the first sample of a
/// gesture has to be painted by the caller.
pub fn interpolate(current: Pos2, previous: Pos2, cell_size: f32) -> Vec<Position> {
    if current == previous || cell_size <= 0.0 {
        return Vec::new();
    }

    // f64 keeps the stepped samples on the same side of cell borders as `cell_at`
    let (x0, y0) = (f64::from(previous.x), f64::from(previous.y));
    let dx = f64::from(current.x) - x0;
    let dy = f64::from(current.y) - y0;
    let size = f64::from(cell_size);
    let distance = dx.hypot(dy);
    let steps = (distance / size).floor() as usize;

    let mut cells = Vec::with_capacity(steps + 1);
    let mut last = cell_at(previous, cell_size);
    let mut emit = |cell: Position| {
        if cell != last {
            cells.push(cell);
            last = cell;
        }
    };

    for i in 1..=steps {
        let t = i as f64 * size / distance;
        emit(cell_at_f64(x0 + dx * t, y0 + dy * t, size));
    }

    let end = cell_at(current, cell_size);
    if cells.last() != Some(&end) {
        cells.push(end);
    }

    cells
}
