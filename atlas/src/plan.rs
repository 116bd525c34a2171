use crate::{
    padding::{Layout, Padding},
    size::{Position, Size},
};

/// The grid layout of one sheet.
#[derive(Debug, Clone)]
pub struct Plan {
    pub sprite: Size,
    pub padding: u32,
    pub columns: u32,
    pub rows: u32,
    pub sheet: Size,

    /// Sprite positions in the order of the sorted group.
    pub positions: Vec<Position>,
}

impl Plan {
    /// Pixel span `[start, end)` of the cell column `col` including the padding it owns.
    #[must_use]
    pub fn column_span(&self, col: u32) -> (u32, u32) {
        span(col, self.columns, self.sprite.w, self.padding)
    }

    /// Pixel span `[start, end)` of the cell row `row` including the padding it owns.
    #[must_use]
    pub fn row_span(&self, row: u32) -> (u32, u32) {
        span(row, self.rows, self.sprite.h, self.padding)
    }

    /// Pixel span `[start, end)` filled by the sprite `idx` when padding is extended.
    ///
    /// The last sprite of a partial row also takes the empty neighbour's share of the gap.
    #[must_use]
    pub fn fill_columns(&self, idx: usize) -> (u32, u32) {
        let col = (idx % self.columns as usize) as u32;
        let (start, end) = self.column_span(col);
        if idx + 1 == self.positions.len() && col + 1 < self.columns {
            (start, self.positions[idx].x + self.sprite.w + self.padding)
        } else {
            (start, end)
        }
    }
}

/// Plans a sheet of `count` sprites of the same `sprite` size.
///
/// The grid has `ceil(sqrt(count))` columns. With the [square](Layout::Square)
/// layout the sheet has as many rows as columns, with the
/// [compact](Layout::Compact) one only the rows holding sprites.
#[must_use]
pub fn plan(sprite: Size, count: usize, padding: Padding, layout: Layout) -> Plan {
    let padding = padding.get();
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    let columns = grid_side(count).max(1);
    let rows = match layout {
        Layout::Square => columns,
        Layout::Compact => count.div_ceil(columns).max(1),
    };

    let sheet = Size {
        w: columns * sprite.w + padding * (columns + 1),
        h: rows * sprite.h + padding * (rows + 1),
    };

    let positions = (0..count)
        .map(|idx| {
            let (col, row) = (idx % columns, idx / columns);
            Position {
                x: padding + col * (sprite.w + padding),
                y: padding + row * (sprite.h + padding),
            }
        })
        .collect();

    Plan {
        sprite,
        padding,
        columns,
        rows,
        sheet,
        positions,
    }
}

/// The least `side` with `side * side >= n`.
fn grid_side(n: u32) -> u32 {
    let mut side = f64::from(n).sqrt() as u32;
    while u64::from(side) * u64::from(side) < u64::from(n) {
        side += 1;
    }

    while side > 0 && u64::from(side - 1) * u64::from(side - 1) >= u64::from(n) {
        side -= 1;
    }

    side
}

// Outer cells own the whole border, inner gaps are split between neighbours.
fn span(idx: u32, len: u32, cell: u32, padding: u32) -> (u32, u32) {
    let start = padding + idx * (cell + padding);
    let lead = if idx == 0 { padding } else { padding - padding / 2 };
    let trail = if idx + 1 == len { padding } else { padding / 2 };
    (start - lead, start + cell + trail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padding(px: u32) -> Padding {
        Padding::new(px).expect("padding")
    }

    #[test]
    fn five_sprites_with_padding() {
        let plan = plan(Size::new(32, 32), 5, padding(2), Layout::Square);
        assert_eq!(plan.columns, 3);
        assert_eq!(plan.rows, 3);
        assert_eq!(plan.sheet, Size::new(104, 104));
        assert_eq!(
            plan.positions,
            [
                Position { x: 2, y: 2 },
                Position { x: 36, y: 2 },
                Position { x: 70, y: 2 },
                Position { x: 2, y: 36 },
                Position { x: 36, y: 36 },
            ],
        );
    }

    #[test]
    fn tight_grid() {
        let plan = plan(Size::new(16, 16), 4, padding(0), Layout::Square);
        assert_eq!(plan.columns, 2);
        assert_eq!(plan.sheet, Size::new(32, 32));
        assert_eq!(
            plan.positions,
            [
                Position { x: 0, y: 0 },
                Position { x: 16, y: 0 },
                Position { x: 0, y: 16 },
                Position { x: 16, y: 16 },
            ],
        );
    }

    #[test]
    fn compact_drops_empty_rows() {
        let plan = plan(Size::new(32, 32), 5, padding(2), Layout::Compact);
        assert_eq!(plan.columns, 3);
        assert_eq!(plan.rows, 2);
        assert_eq!(plan.sheet, Size::new(104, 70));
    }

    #[test]
    fn single_sprite() {
        let plan = plan(Size::new(7, 3), 1, padding(8), Layout::Square);
        assert_eq!(plan.columns, 1);
        assert_eq!(plan.sheet, Size::new(23, 19));
        assert_eq!(plan.positions, [Position { x: 8, y: 8 }]);
    }

    #[test]
    fn sheet_size_formula() {
        let sprite = Size::new(5, 9);
        for count in 1..=200 {
            for px in [0, 1, 3, 8] {
                let plan = plan(sprite, count, padding(px), Layout::Square);
                let columns = (count as f64).sqrt().ceil() as u32;
                assert_eq!(plan.columns, columns, "count {count}");
                assert_eq!(plan.sheet.w, columns * sprite.w + px * (columns + 1));
                assert_eq!(plan.sheet.h, columns * sprite.h + px * (columns + 1));
                assert_eq!(plan.positions.len(), count);
            }
        }
    }

    #[test]
    fn spans_partition_the_sheet() {
        for px in [0, 1, 2, 5, 8] {
            let plan = plan(Size::new(4, 6), 7, padding(px), Layout::Compact);

            let mut end = 0;
            for col in 0..plan.columns {
                let (start, stop) = plan.column_span(col);
                assert_eq!(start, end);
                end = stop;
            }
            assert_eq!(end, plan.sheet.w);

            let mut end = 0;
            for row in 0..plan.rows {
                let (start, stop) = plan.row_span(row);
                assert_eq!(start, end);
                end = stop;
            }
            assert_eq!(end, plan.sheet.h);
        }
    }

    #[test]
    fn spans_contain_sprites() {
        let plan = plan(Size::new(10, 10), 9, padding(3), Layout::Square);
        for (idx, pos) in (0..).zip(&plan.positions) {
            let (left, right) = plan.column_span(idx % plan.columns);
            let (top, bottom) = plan.row_span(idx / plan.columns);
            assert!(left <= pos.x && pos.x + 10 <= right);
            assert!(top <= pos.y && pos.y + 10 <= bottom);
        }
    }

    #[test]
    fn last_sprite_takes_the_empty_gap() {
        let plan = plan(Size::new(4, 4), 3, padding(2), Layout::Square);
        assert_eq!(plan.sheet.w, 14);
        assert_eq!(plan.fill_columns(0), plan.column_span(0));
        assert_eq!(plan.fill_columns(1), (7, 14));

        // The second cell of the last row is empty
        assert_eq!(plan.column_span(0), (0, 7));
        assert_eq!(plan.fill_columns(2), (0, 8));
    }
}
