use {
    crate::{padding::Fill, plan::Plan, scan::Sprite},
    im::RgbaImage,
    rayon::prelude::*,
    std::mem,
};

const CHANNELS: usize = 4;

/// Horizontal strip of the canvas owned by one grid row.
struct Band<'a> {
    row: u32,
    top: u32,
    pixels: &'a mut [u8],
}

/// Draws the `sprites` of one group on a new canvas as the `plan` says.
///
/// Every grid row is drawn in parallel to its own band of the canvas.
/// Bands never overlap, so the result doesn't depend on the drawing order.
pub(crate) fn rasterize(plan: &Plan, sprites: &[Sprite], fill: Fill) -> RgbaImage {
    let mut canvas = RgbaImage::new(plan.sheet.w, plan.sheet.h);
    let stride = plan.sheet.w as usize * CHANNELS;

    {
        let mut rest: &mut [u8] = &mut canvas;
        let mut bands = Vec::with_capacity(plan.rows as usize);
        for row in 0..plan.rows {
            let (top, bottom) = plan.row_span(row);
            let len = (bottom - top) as usize * stride;
            let (pixels, tail) = mem::take(&mut rest).split_at_mut(len);
            bands.push(Band { row, top, pixels });
            rest = tail;
        }

        bands
            .into_par_iter()
            .for_each(|band| draw_band(plan, sprites, fill, stride, band));
    }

    canvas
}

fn draw_band(plan: &Plan, sprites: &[Sprite], fill: Fill, stride: usize, band: Band) {
    let (w, h) = (plan.sprite.w, plan.sprite.h);
    if w == 0 || h == 0 {
        return;
    }

    let columns = plan.columns as usize;
    let first = band.row as usize * columns;
    let (top, bottom) = plan.row_span(band.row);
    for idx in first..first + columns {
        let (idx, rows) = if idx < sprites.len() {
            match fill {
                Fill::Extend => (idx, top..bottom),
                Fill::Transparent => {
                    let y = plan.positions[idx].y;
                    (idx, y..y + h)
                }
            }
        } else if fill == Fill::Extend && idx >= columns && idx - columns < sprites.len() {
            // An empty cell leaves its share of the gap to the sprite above
            let lead = plan.padding - plan.padding / 2;
            (idx - columns, top..top + lead)
        } else {
            continue;
        };

        let sprite = &sprites[idx];
        let pos = plan.positions[idx];
        debug_assert_eq!(sprite.image.dimensions(), (w, h), "sprite of a wrong size");

        let (left, right) = match fill {
            Fill::Extend => plan.fill_columns(idx),
            Fill::Transparent => (pos.x, pos.x + w),
        };

        let src = sprite.image.as_raw();
        let src_stride = w as usize * CHANNELS;
        for y in rows {
            let sy = clamp(y, pos.y, h);
            let src_row = &src[sy * src_stride..][..src_stride];
            let dst_row = &mut band.pixels[(y - band.top) as usize * stride..][..stride];

            let x = pos.x as usize * CHANNELS;
            dst_row[x..x + src_stride].copy_from_slice(src_row);

            let (first_px, last_px) = (&src_row[..CHANNELS], &src_row[src_stride - CHANNELS..]);
            for px in dst_row[left as usize * CHANNELS..x].chunks_exact_mut(CHANNELS) {
                px.copy_from_slice(first_px);
            }

            let end = x + src_stride;
            for px in dst_row[end..right as usize * CHANNELS].chunks_exact_mut(CHANNELS) {
                px.copy_from_slice(last_px);
            }
        }
    }
}

/// Index of the sprite pixel nearest to the sheet coordinate `v`.
fn clamp(v: u32, start: u32, len: u32) -> usize {
    (i64::from(v) - i64::from(start)).clamp(0, i64::from(len) - 1) as usize
}
