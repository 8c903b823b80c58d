//! Neighbourhood operations used by the spatial detectors
//!
//! Binary dilation treats pixels outside the image as unset. The local mean
//! mirrors the border without repeating the edge pixel (`dcb|abcd|cba`).

use crate::types::{FireError, FireResult, Mask};
use ndarray::{Array2, Axis};

/// Largest structuring element or window side accepted
pub const MAX_KERNEL_SIZE: usize = 1001;

/// Flat rectangular structuring element with odd side lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuringElement {
    rows: usize,
    cols: usize,
}

impl StructuringElement {
    pub fn rect(rows: usize, cols: usize) -> FireResult<Self> {
        for (name, size) in [("rows", rows), ("cols", cols)] {
            if size == 0 || size % 2 == 0 {
                return Err(FireError::invalid_parameter(
                    format!("structuring_element.{}", name),
                    size,
                    "structuring element size must be a positive odd number",
                ));
            }
            if size > MAX_KERNEL_SIZE {
                return Err(FireError::invalid_parameter(
                    format!("structuring_element.{}", name),
                    size,
                    format!("structuring element size must not exceed {}", MAX_KERNEL_SIZE),
                ));
            }
        }
        Ok(Self { rows, cols })
    }

    pub fn square(size: usize) -> FireResult<Self> {
        Self::rect(size, size)
    }

    /// 3x3 element connecting the 8 neighbours of a pixel
    pub fn eight_connected() -> Self {
        Self { rows: 3, cols: 3 }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Half extents (row, col) around the centre
    pub fn radius(&self) -> (usize, usize) {
        (self.rows / 2, self.cols / 2)
    }
}

/// A pixel is set when any pixel under the element centred on it is set
pub fn binary_dilate(mask: &Mask, element: &StructuringElement) -> Mask {
    let (row_radius, col_radius) = element.radius();
    let horizontal = dilate_along(mask, Axis(1), col_radius);
    dilate_along(&horizontal, Axis(0), row_radius)
}

fn dilate_along(mask: &Mask, axis: Axis, radius: usize) -> Mask {
    if radius == 0 {
        return mask.clone();
    }

    let mut out = Array2::from_elem(mask.dim(), false);

    for (lane, mut out_lane) in mask.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let len = lane.len();

        // prefix[i] = number of set pixels in lane[..i]
        let mut prefix = Vec::with_capacity(len + 1);
        prefix.push(0usize);
        for &v in lane.iter() {
            let last = prefix[prefix.len() - 1];
            prefix.push(last + v as usize);
        }

        for (i, out_px) in out_lane.iter_mut().enumerate() {
            let start = i.saturating_sub(radius);
            let end = (i + radius + 1).min(len);
            *out_px = prefix[end] > prefix[start];
        }
    }

    out
}

/// Mean over a `size` x `size` window centred on every pixel
pub fn box_mean(image: &Array2<f32>, size: usize) -> FireResult<Array2<f32>> {
    let element = StructuringElement::square(size)?;
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return Ok(image.clone());
    }

    let radius = element.radius().0 as isize;
    let norm = size as f64 * size as f64;

    let mut horizontal = Array2::<f64>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut sum = 0.0f64;
            for dc in -radius..=radius {
                let cc = reflect_101(c as isize + dc, cols);
                sum += image[[r, cc]] as f64;
            }
            horizontal[[r, c]] = sum;
        }
    }

    let mut out = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut sum = 0.0f64;
            for dr in -radius..=radius {
                let rr = reflect_101(r as isize + dr, rows);
                sum += horizontal[[rr, c]];
            }
            out[[r, c]] = (sum / norm) as f32;
        }
    }

    Ok(out)
}

fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as usize
}
