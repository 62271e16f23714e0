//! Per-well cropping
//!
//! Cuts one rectangular image per well out of a plate region. Wells are
//! numbered from 1; the numbering follows the chosen [`WellOrder`].

use crate::error::GridResult;
use crate::geometry::CalibratedGeometry;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wellplate_core::{Box, Pix, Pixa};

/// Traversal order of the wells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WellOrder {
    /// Rows outer, columns inner: index `i + cols*(j-1)`
    #[default]
    RowMajor,
    /// Columns outer, rows inner: index `j + rows*(i-1)`
    ColumnMajor,
}

impl WellOrder {
    /// 1-based index of the well at column `i`, row `j`
    pub fn index(self, i: u32, j: u32, cols: u32, rows: u32) -> u32 {
        match self {
            WellOrder::RowMajor => i + cols * (j - 1),
            WellOrder::ColumnMajor => j + rows * (i - 1),
        }
    }

    /// Grid cells `(i, j)` in traversal order
    fn cells(self, cols: u32, rows: u32) -> Vec<(u32, u32)> {
        match self {
            WellOrder::RowMajor => (1..=rows)
                .flat_map(|j| (1..=cols).map(move |i| (i, j)))
                .collect(),
            WellOrder::ColumnMajor => (1..=cols)
                .flat_map(|i| (1..=rows).map(move |j| (i, j)))
                .collect(),
        }
    }
}

/// One cropped well
#[derive(Debug, Clone)]
pub struct WellImage {
    /// 1-based position in the grid's order
    pub index: u32,
    /// Column of the well (1-based)
    pub col: u32,
    /// Row of the well (1-based)
    pub row: u32,
    /// Region of the source the image was copied from
    pub region: Box,
    /// Independent copy of the source pixels, labelled `"well k of n"`
    pub image: Pix,
}

/// Cropped wells of a plate in traversal order
#[derive(Debug, Clone)]
pub struct WellGrid {
    rows: u32,
    cols: u32,
    order: WellOrder,
    wells: Vec<WellImage>,
}

impl WellGrid {
    /// Number of well rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of well columns
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Traversal order
    pub fn order(&self) -> WellOrder {
        self.order
    }

    /// Number of wells
    pub fn len(&self) -> usize {
        self.wells.len()
    }

    /// Check if the grid is empty
    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    /// Well by its 1-based index
    pub fn well(&self, index: u32) -> Option<&WellImage> {
        let k = index.checked_sub(1)?;
        self.wells.get(k as usize)
    }

    /// Wells in traversal order
    pub fn wells(&self) -> &[WellImage] {
        &self.wells
    }

    /// Iterate over the wells in traversal order
    pub fn iter(&self) -> std::slice::Iter<'_, WellImage> {
        self.wells.iter()
    }

    /// Collect the well images and their regions into a `Pixa`.
    pub fn to_pixa(&self) -> Pixa {
        let mut pixa = Pixa::with_capacity(self.wells.len());
        for well in &self.wells {
            pixa.push_with_box(well.image.clone(), well.region);
        }
        pixa
    }
}

impl<'a> IntoIterator for &'a WellGrid {
    type Item = &'a WellImage;
    type IntoIter = std::slice::Iter<'a, WellImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.wells.iter()
    }
}

/// Label attached to the `index`-th of `total` wells
pub fn well_label(index: u32, total: u32) -> String {
    format!("well {} of {}", index, total)
}

/// Crop every well of a `cols x rows` grid out of `source`.
///
/// Each well covers `[cx, cx + trunc(diameter_w)) x [cy, cy + trunc(diameter_h))`
/// with `(cx, cy)` from the geometry, clamped to the image. Wells that
/// fall entirely outside the image are an error.
///
/// # Errors
///
/// Returns [`crate::GridError::DegenerateGeometry`] before any cropping if
/// a truncated diameter is below one pixel, and
/// [`crate::GridError::Core`] if a well lies outside the image.
pub fn crop_wells(
    source: &Pix,
    rows: u32,
    cols: u32,
    geometry: &CalibratedGeometry,
    order: WellOrder,
) -> GridResult<WellGrid> {
    geometry.well_size()?;

    let total = rows * cols;
    let mut wells = Vec::with_capacity(total as usize);
    for (i, j) in order.cells(cols, rows) {
        let index = order.index(i, j, cols, rows);
        let cell = geometry.cell_box(i, j)?;
        let (image, region) = source.clip_box(&cell)?;
        debug!(index, x = region.x, y = region.y, w = region.w, h = region.h, "well crop");

        let mut image = image.to_mut();
        image.set_text(Some(well_label(index, total)));
        wells.push(WellImage {
            index,
            col: i,
            row: j,
            region,
            image: image.into(),
        });
    }

    Ok(WellGrid {
        rows,
        cols,
        order,
        wells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridError;
    use wellplate_core::{PixMut, PixelDepth};

    fn ramp(w: u32, h: u32) -> Pix {
        let mut pm = PixMut::new(w, h, PixelDepth::Bit8).unwrap();
        for y in 0..h {
            for x in 0..w {
                pm.set_pixel_unchecked(x, y, (x + 7 * y) % 256);
            }
        }
        pm.into()
    }

    fn geometry() -> CalibratedGeometry {
        CalibratedGeometry::new(50.0, 40.0, 0.06263, 0.04535)
    }

    #[test]
    fn test_crop_corners() {
        let g = geometry();
        let src = ramp(240, 160);
        let grid = crop_wells(&src, 3, 4, &g, WellOrder::RowMajor).unwrap();
        assert_eq!(grid.len(), 12);

        let first = grid.well(1).unwrap();
        assert_eq!((first.region.x, first.region.y), (g.center_x(1), g.center_y(1)));
        assert_eq!((first.col, first.row), (1, 1));

        let last = grid.well(12).unwrap();
        assert_eq!((last.region.x, last.region.y), (g.center_x(4), g.center_y(3)));
        assert_eq!((last.region.w, last.region.h), (50, 40));
        assert_eq!(last.image.text(), Some("well 12 of 12"));

        // Pixels are copied from the source
        let (x0, y0) = (last.region.x as u32, last.region.y as u32);
        assert_eq!(last.image.get_pixel(5, 7), src.get_pixel(x0 + 5, y0 + 7));
    }

    #[test]
    fn test_row_major_indices() {
        let grid = crop_wells(&ramp(240, 160), 3, 4, &geometry(), WellOrder::RowMajor).unwrap();
        let idx: Vec<u32> = grid.iter().map(|w| w.index).collect();
        assert_eq!(idx, (1..=12).collect::<Vec<_>>());
        // Second well is column 2 of row 1
        let w = grid.well(2).unwrap();
        assert_eq!((w.col, w.row), (2, 1));
        let w = grid.well(5).unwrap();
        assert_eq!((w.col, w.row), (1, 2));
    }

    #[test]
    fn test_column_major_indices() {
        let grid =
            crop_wells(&ramp(240, 160), 3, 4, &geometry(), WellOrder::ColumnMajor).unwrap();
        let idx: Vec<u32> = grid.iter().map(|w| w.index).collect();
        assert_eq!(idx, (1..=12).collect::<Vec<_>>());
        let w = grid.well(2).unwrap();
        assert_eq!((w.col, w.row), (1, 2));
        let w = grid.well(4).unwrap();
        assert_eq!((w.col, w.row), (2, 1));
    }

    #[test]
    fn test_crop_clamped_at_edge() {
        // Wells of the last column run past the right edge of a narrow image
        let g = geometry();
        let grid = crop_wells(&ramp(200, 160), 3, 4, &g, WellOrder::RowMajor).unwrap();
        let w = grid.well(4).unwrap();
        assert_eq!(w.region.x, g.center_x(4));
        assert_eq!(w.region.w, 200 - g.center_x(4));
        assert_eq!(w.image.width(), w.region.w as u32);
    }

    #[test]
    fn test_crop_degenerate() {
        let g = CalibratedGeometry::new(50.0, 0.4, 0.1, 0.05);
        assert!(matches!(
            crop_wells(&ramp(100, 100), 2, 2, &g, WellOrder::RowMajor),
            Err(GridError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_to_pixa() {
        let grid = crop_wells(&ramp(240, 160), 3, 4, &geometry(), WellOrder::RowMajor).unwrap();
        let pixa = grid.to_pixa();
        assert_eq!(pixa.len(), 12);
        assert_eq!(pixa.get(0).and_then(|p| p.text()), Some("well 1 of 12"));
        assert_eq!(pixa.get_box(11).map(|b| b.x), Some(geometry().center_x(4)));
    }

    #[test]
    fn test_well_out_of_range() {
        let grid = crop_wells(&ramp(240, 160), 3, 4, &geometry(), WellOrder::RowMajor).unwrap();
        assert!(grid.well(0).is_none());
        assert!(grid.well(13).is_none());
    }
}
