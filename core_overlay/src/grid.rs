//! 3×3 grid geometry around a focal point.

use overlay_runtime::{Bounds, DirectionalTag, Geometry, LatLng};
use serde::Serialize;

use crate::sector_config::DEFAULT_CELL_SIZE_DEG;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridCell {
    pub tag: DirectionalTag,
    pub bounds: Bounds,
}

/// Build the nine cells in [`DirectionalTag::ALL`] order.
///
/// Cell edges come from one shared set of four latitude and four longitude
/// lines, so neighbouring cells share edges exactly and the union is a single
/// block three cells wide centred on `focal`.
pub fn build_grid(focal: LatLng, cell_size_deg: f64) -> [GridCell; 9] {
    let cell = usable_cell_size(cell_size_deg);
    let half = cell / 2.0;
    let lat_edges = edges(focal.lat, half);
    let lng_edges = edges(focal.lng, half);

    DirectionalTag::ALL.map(|tag| {
        let (dlat, dlng) = tag.offset();
        let row = (dlat + 1) as usize;
        let col = (dlng + 1) as usize;
        GridCell {
            tag,
            bounds: Bounds {
                south: lat_edges[row],
                north: lat_edges[row + 1],
                west: lng_edges[col],
                east: lng_edges[col + 1],
            },
        }
    })
}

/// Bounds of the whole 3×3 block.
pub fn grid_extent(focal: LatLng, cell_size_deg: f64) -> Bounds {
    let half_block = usable_cell_size(cell_size_deg) * 1.5;
    Bounds::around(focal, half_block)
}

/// Tag of the cell containing `point`; points outside the block snap to the
/// nearest edge cell.
pub fn sector_for_point(point: LatLng, focal: LatLng, cell_size_deg: f64) -> DirectionalTag {
    if !(cell_size_deg.is_finite() && cell_size_deg > 0.0) {
        return DirectionalTag::C;
    }
    let step = |delta: f64| -> i8 {
        let cells = (delta / cell_size_deg).round();
        if cells.is_nan() {
            0
        } else {
            cells.clamp(-1.0, 1.0) as i8
        }
    };
    let dlat = step(point.lat - focal.lat);
    let dlng = step(point.lng - focal.lng);
    DirectionalTag::from_offset(dlat, dlng).unwrap_or(DirectionalTag::C)
}

/// Mean of every position in the geometry.
pub fn geometry_centroid(geometry: &Geometry) -> Option<LatLng> {
    let positions = geometry.positions();
    if positions.is_empty() {
        return None;
    }
    let count = positions.len() as f64;
    let (lat_sum, lng_sum) = positions
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(LatLng::new(lat_sum / count, lng_sum / count))
}

fn usable_cell_size(cell_size_deg: f64) -> f64 {
    if cell_size_deg.is_finite() && cell_size_deg > 0.0 {
        cell_size_deg
    } else {
        tracing::warn!(
            target: "tactical::sectors",
            cell_size_deg,
            fallback = DEFAULT_CELL_SIZE_DEG,
            "grid.cell_size_invalid"
        );
        DEFAULT_CELL_SIZE_DEG
    }
}

// South-to-north (or west-to-east) cell boundaries.
fn edges(center: f64, half: f64) -> [f64; 4] {
    [
        center - 3.0 * half,
        center - half,
        center + half,
        center + 3.0 * half,
    ]
}
