//! Top-down map: the deterministic rasterizer behind the terminal preview.
//!
//! Projects room-space points onto a character grid (X → columns,
//! Z → rows) and turns `DrawOp`s into cell grids and cell diffs. Pure and
//! stateless: the same inputs always give the same grid.

use glam::Vec3;

use crate::engine::source::RoomSpec;
use crate::types::{Cell, CellChange, Color, DrawOp, NamedColor, Style};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    pub cols: u16,
    pub rows: u16,
    room: RoomSpec,
    /// Rows per meter; columns per meter is `CELL_ASPECT` times this.
    scale: f32,
}

impl MapProjection {
    /// Fit `room` inside a `cols` × `rows` grid, leaving a one-cell border
    /// for the walls.
    pub fn fit(room: RoomSpec, cols: u16, rows: u16) -> Self {
        let inner_cols = cols.saturating_sub(3) as f32;
        let inner_rows = rows.saturating_sub(3) as f32;
        let scale = (inner_cols / (room.length * CELL_ASPECT)).min(inner_rows / room.width);
        MapProjection {
            cols,
            rows,
            room,
            scale: scale.max(0.0),
        }
    }

    /// Grid cell of a room-space point, or `None` when it falls off the grid.
    pub fn project(&self, p: Vec3) -> Option<(u16, u16)> {
        let col = 1.0 + ((p.x + self.room.length / 2.0) * self.scale * CELL_ASPECT).round();
        let row = 1.0 + ((p.z + self.room.width / 2.0) * self.scale).round();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some((col as u16, row as u16))
    }

    /// Grid cells spanned by the room interior: `(x0, y0, x1, y1)` inclusive.
    fn room_cells(&self) -> (u16, u16, u16, u16) {
        let half_l = self.room.length / 2.0;
        let half_w = self.room.width / 2.0;
        let (x0, y0) = self.project(Vec3::new(-half_l, 0.0, -half_w)).unwrap_or((1, 1));
        let (x1, y1) = self
            .project(Vec3::new(half_l, 0.0, half_w))
            .unwrap_or((self.cols.saturating_sub(2), self.rows.saturating_sub(2)));
        (x0, y0, x1, y1)
    }

    /// Floor fill plus the four walls drawn as a box one cell outside it.
    pub fn room_ops(&self, floor: Style, walls: Style) -> Vec<DrawOp> {
        let (x0, y0, x1, y1) = self.room_cells();
        let mut ops = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                ops.push(DrawOp { x, y, ch: '·', style: floor, z_order: 0 });
            }
        }

        let (left, top) = (x0.saturating_sub(1), y0.saturating_sub(1));
        let (right, bottom) = (x1 + 1, y1 + 1);
        let z = 1;
        ops.push(DrawOp { x: left, y: top, ch: '┌', style: walls, z_order: z });
        ops.push(DrawOp { x: right, y: top, ch: '┐', style: walls, z_order: z });
        ops.push(DrawOp { x: left, y: bottom, ch: '└', style: walls, z_order: z });
        ops.push(DrawOp { x: right, y: bottom, ch: '┘', style: walls, z_order: z });
        for x in left + 1..right {
            ops.push(DrawOp { x, y: top, ch: '─', style: walls, z_order: z });
            ops.push(DrawOp { x, y: bottom, ch: '─', style: walls, z_order: z });
        }
        for y in top + 1..bottom {
            ops.push(DrawOp { x: left, y, ch: '│', style: walls, z_order: z });
            ops.push(DrawOp { x: right, y, ch: '│', style: walls, z_order: z });
        }
        ops
    }

    /// A single glyph at a room-space point.
    pub fn point_op(&self, p: Vec3, ch: char, style: Style, z_order: i32) -> Option<DrawOp> {
        self.project(p).map(|(x, y)| DrawOp { x, y, ch, style, z_order })
    }

    /// Fill the cells under an axis-aligned footprint centered on `center`.
    pub fn footprint_ops(
        &self,
        center: Vec3,
        half_x: f32,
        half_z: f32,
        ch: char,
        style: Style,
        z_order: i32,
    ) -> Vec<DrawOp> {
        let a = self.project(center - Vec3::new(half_x, 0.0, half_z));
        let b = self.project(center + Vec3::new(half_x, 0.0, half_z));
        match (a, b) {
            (Some((x0, y0)), Some((x1, y1))) => (y0..=y1)
                .flat_map(move |y| (x0..=x1).map(move |x| DrawOp { x, y, ch, style, z_order }))
                .collect(),
            _ => self.point_op(center, ch, style, z_order).into_iter().collect(),
        }
    }

    /// Camera marker plus an arrow one cell toward where it looks.
    pub fn camera_ops(&self, position: Vec3, target: Vec3) -> Vec<DrawOp> {
        let style = Style {
            fg: Some(Color::Named(NamedColor::Yellow)),
            bold: true,
            ..Default::default()
        };
        let Some((x, y)) = self.project(position) else {
            return Vec::new();
        };
        let mut ops = vec![DrawOp { x, y, ch: '@', style, z_order: 10 }];

        let look = target - position;
        if let Some((dx, dy, ch)) = look_arrow(look.x, look.z) {
            let ax = x as i32 + dx;
            let ay = y as i32 + dy;
            if ax >= 0 && ay >= 0 && ax < self.cols as i32 && ay < self.rows as i32 {
                ops.push(DrawOp { x: ax as u16, y: ay as u16, ch, style, z_order: 9 });
            }
        }
        ops
    }
}

/// Octant arrow for a top-down direction (Z grows downward on screen).
fn look_arrow(dx: f32, dz: f32) -> Option<(i32, i32, char)> {
    if dx.abs() < 1e-4 && dz.abs() < 1e-4 {
        return None;
    }
    let octant = ((dz.atan2(dx) / std::f32::consts::FRAC_PI_4).round() as i32).rem_euclid(8);
    Some(match octant {
        0 => (1, 0, '→'),
        1 => (1, 1, '↘'),
        2 => (0, 1, '↓'),
        3 => (-1, 1, '↙'),
        4 => (-1, 0, '←'),
        5 => (-1, -1, '↖'),
        6 => (0, -1, '↑'),
        _ => (1, -1, '↗'),
    })
}

/// Rasterize draw operations onto a fixed-size cell grid.
///
/// Operations are sorted by z-order so that higher z values paint over lower
/// ones; off-grid operations are dropped.
pub fn rasterize(ops: &[DrawOp], cols: u16, rows: u16) -> Vec<Vec<Cell>> {
    let w = cols as usize;
    let h = rows as usize;
    let mut grid = vec![vec![Cell::default(); w]; h];

    let mut sorted: Vec<_> = ops.iter().collect();
    sorted.sort_by_key(|op| op.z_order);

    for op in sorted {
        let x = op.x as usize;
        let y = op.y as usize;
        if x < w && y < h {
            grid[y][x] = Cell { ch: op.ch, style: op.style };
        }
    }
    grid
}

/// Cell-level diff between two grids of the same size.
pub fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
    let mut changes = Vec::new();
    for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
        for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
            if prev_cell != next_cell {
                changes.push(CellChange {
                    x: x as u16,
                    y: y as u16,
                    cell: *next_cell,
                });
            }
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: RoomSpec = RoomSpec { length: 3.0, width: 2.2, height: 2.6 };

    #[test]
    fn test_projection_keeps_room_on_grid() {
        let proj = MapProjection::fit(ROOM, 60, 20);
        let nw = proj.project(Vec3::new(-1.5, 0.0, -1.1)).unwrap();
        let se = proj.project(Vec3::new(1.5, 0.0, 1.1)).unwrap();
        assert_eq!(nw, (1, 1));
        assert!(se.0 < 59 && se.1 < 19);
        assert!(se.0 > nw.0 && se.1 > nw.1);
        assert!(proj.project(Vec3::new(50.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_room_ops_draw_closed_box() {
        let proj = MapProjection::fit(ROOM, 60, 20);
        let grid = rasterize(&proj.room_ops(Style::default(), Style::default()), 60, 20);
        assert_eq!(grid[0][0].ch, '┌');
        assert_eq!(grid[2][2].ch, '·');
        let corners = grid.iter().flatten().filter(|c| "┌┐└┘".contains(c.ch)).count();
        assert_eq!(corners, 4);
    }

    #[test]
    fn test_footprint_covers_box() {
        let proj = MapProjection::fit(ROOM, 60, 20);
        let ops = proj.footprint_ops(Vec3::ZERO, 0.3, 0.2, '■', Style::default(), 5);
        assert!(ops.len() > 1);
        let center = proj.project(Vec3::ZERO).unwrap();
        assert!(ops.iter().any(|op| (op.x, op.y) == center));
    }

    #[test]
    fn test_camera_arrow_points_at_target() {
        let proj = MapProjection::fit(ROOM, 60, 20);
        let ops = proj.camera_ops(Vec3::new(-1.0, 1.6, 0.0), Vec3::new(0.0, 1.6, 0.0));
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].ch, '@');
        assert_eq!(ops[1].ch, '→');
        assert_eq!(ops[1].x, ops[0].x + 1);

        let up = proj.camera_ops(Vec3::new(0.0, 1.6, 0.5), Vec3::new(0.0, 1.0, -0.5));
        assert_eq!(up[1].ch, '↑');
    }

    #[test]
    fn test_higher_z_wins_and_diff_reports_changes() {
        let ops = [
            DrawOp { x: 1, y: 1, ch: 'a', style: Style::default(), z_order: 5 },
            DrawOp { x: 1, y: 1, ch: 'b', style: Style::default(), z_order: 1 },
        ];
        let a = rasterize(&ops, 4, 3);
        assert_eq!(a[1][1].ch, 'a');
        let b = rasterize(&ops[1..], 4, 3);
        let changes = diff(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!((changes[0].x, changes[0].y, changes[0].cell.ch), (1, 1, 'b'));
    }
}
