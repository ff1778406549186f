//! Triangle rasterization into the span heightfield
//!
//! Each triangle is clipped row by row along z, then column by column along
//! x. Every clipped piece becomes a span covering its y range.

use glam::Vec3;
use mazenav_common::is_walkable_triangle;

use super::heightfield::{Heightfield, NULL_AREA, SPAN_MAX_HEIGHT, WALKABLE_AREA};

#[derive(Debug, Clone, Copy)]
enum Axis {
    X = 0,
    Z = 2,
}

/// Area id per triangle: walkable when the face normal is within
/// `walkable_slope_angle` degrees of +Y
pub fn mark_walkable_triangles(triangles: &[[Vec3; 3]], walkable_slope_angle: f32) -> Vec<u8> {
    triangles
        .iter()
        .map(|&[a, b, c]| {
            if is_walkable_triangle(a, b, c, walkable_slope_angle) {
                WALKABLE_AREA
            } else {
                NULL_AREA
            }
        })
        .collect()
}

/// Splits a convex polygon by the plane `v[axis] == offset`.
///
/// Returns the part at or below the offset and the part at or above it.
/// Vertices on the plane go to both.
fn divide_poly(poly: &[Vec3], offset: f32, axis: Axis) -> (Vec<Vec3>, Vec<Vec3>) {
    let axis = axis as usize;
    let mut below = Vec::with_capacity(poly.len() + 2);
    let mut above = Vec::with_capacity(poly.len() + 2);
    let n = poly.len();
    if n == 0 {
        return (below, above);
    }

    let delta: Vec<f32> = poly.iter().map(|v| offset - v[axis]).collect();

    let mut b = n - 1;
    for a in 0..n {
        let same_side = (delta[a] >= 0.0) == (delta[b] >= 0.0);
        if !same_side {
            let s = delta[b] / (delta[b] - delta[a]);
            let cut = poly[b] + (poly[a] - poly[b]) * s;
            below.push(cut);
            above.push(cut);
            if delta[a] > 0.0 {
                below.push(poly[a]);
            } else if delta[a] < 0.0 {
                above.push(poly[a]);
            }
        } else if delta[a] >= 0.0 {
            below.push(poly[a]);
            if delta[a] == 0.0 {
                above.push(poly[a]);
            }
        } else {
            above.push(poly[a]);
        }
        b = a;
    }

    (below, above)
}

fn overlap_bounds(amin: Vec3, amax: Vec3, bmin: Vec3, bmax: Vec3) -> bool {
    amin.cmple(bmax).all() && amax.cmpge(bmin).all()
}

/// Rasterizes one triangle into `hf`
pub fn rasterize_triangle(
    hf: &mut Heightfield,
    tri: &[Vec3; 3],
    area: u8,
    merge_threshold: i32,
) {
    let [v0, v1, v2] = *tri;
    let tmin = v0.min(v1).min(v2);
    let tmax = v0.max(v1).max(v2);
    if hf.width == 0 || hf.height == 0 || !overlap_bounds(tmin, tmax, hf.bmin, hf.bmax) {
        return;
    }

    let ics = 1.0 / hf.cs;
    let ich = 1.0 / hf.ch;
    let by = hf.bmax.y - hf.bmin.y;

    let z0 = (((tmin.z - hf.bmin.z) * ics) as i32).clamp(-1, hf.height - 1);
    let z1 = (((tmax.z - hf.bmin.z) * ics) as i32).clamp(0, hf.height - 1);

    let mut remaining = vec![v0, v1, v2];
    for z in z0..=z1 {
        let cell_z = hf.bmin.z + z as f32 * hf.cs;
        let (row, rest) = divide_poly(&remaining, cell_z + hf.cs, Axis::Z);
        remaining = rest;
        if row.len() < 3 || z < 0 {
            continue;
        }

        let (min_x, max_x) = row
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v.x), hi.max(v.x)));
        let x0 = ((min_x - hf.bmin.x) * ics) as i32;
        let x1 = ((max_x - hf.bmin.x) * ics) as i32;
        if x1 < 0 || x0 >= hf.width {
            continue;
        }
        let x0 = x0.clamp(-1, hf.width - 1);
        let x1 = x1.clamp(0, hf.width - 1);

        let mut row = row;
        for x in x0..=x1 {
            let cell_x = hf.bmin.x + x as f32 * hf.cs;
            let (piece, rest) = divide_poly(&row, cell_x + hf.cs, Axis::X);
            row = rest;
            if piece.len() < 3 || x < 0 {
                continue;
            }

            let (lo, hi) = piece
                .iter()
                .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v.y), hi.max(v.y)));
            let lo = lo - hf.bmin.y;
            let hi = hi - hf.bmin.y;
            if hi < 0.0 || lo > by {
                continue;
            }
            let lo = lo.max(0.0);
            let hi = hi.min(by);

            let span_min = ((lo * ich).floor() as i32).clamp(0, SPAN_MAX_HEIGHT as i32);
            let span_max =
                ((hi * ich).ceil() as i32).clamp(span_min + 1, SPAN_MAX_HEIGHT as i32);
            hf.add_span(x, z, span_min as u16, span_max as u16, area, merge_threshold);
        }
    }
}

/// Rasterizes every triangle with its area id
pub fn rasterize_triangles(
    hf: &mut Heightfield,
    triangles: &[[Vec3; 3]],
    areas: &[u8],
    merge_threshold: i32,
) {
    for (tri, &area) in triangles.iter().zip(areas) {
        rasterize_triangle(hf, tri, area, merge_threshold);
    }
}
