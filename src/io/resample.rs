//! Grid resampling for sources without a native resampling read
//!
//! Output pixel centres are mapped onto the source grid the way GDAL's
//! RasterIO does it: `src = (dst + 0.5) * src_len / dst_len`, so a 2x
//! upsample repeats each source pixel twice under nearest neighbour.

use crate::types::{FireError, FireResult, Resampling};
use ndarray::Array2;
use num_traits::NumCast;

/// Resample `src` onto an `out_shape` (rows, cols) grid covering the same footprint
pub fn resample<T>(src: &Array2<T>, out_shape: (usize, usize), method: Resampling) -> FireResult<Array2<T>>
where
    T: Copy + NumCast,
{
    let (src_rows, src_cols) = src.dim();
    let (out_rows, out_cols) = out_shape;

    if out_rows == 0 || out_cols == 0 {
        return Err(FireError::invalid_parameter(
            "out_shape",
            format!("{}x{}", out_rows, out_cols),
            "output shape must be non-empty",
        ));
    }
    if src_rows == 0 || src_cols == 0 {
        return Err(FireError::invalid_parameter(
            "source_shape",
            format!("{}x{}", src_rows, src_cols),
            "cannot resample an empty raster",
        ));
    }

    if (src_rows, src_cols) == out_shape {
        return Ok(src.clone());
    }

    let row_ratio = src_rows as f64 / out_rows as f64;
    let col_ratio = src_cols as f64 / out_cols as f64;

    let out = match method {
        Resampling::Nearest => Array2::from_shape_fn(out_shape, |(r, c)| {
            let sr = nearest_index(r, row_ratio, src_rows);
            let sc = nearest_index(c, col_ratio, src_cols);
            src[[sr, sc]]
        }),
        Resampling::Bilinear => {
            let mut failed = false;
            let out = Array2::from_shape_fn(out_shape, |(r, c)| {
                let (r0, r1, wr) = bilinear_taps(r, row_ratio, src_rows);
                let (c0, c1, wc) = bilinear_taps(c, col_ratio, src_cols);

                let v00 = to_f64(src[[r0, c0]]);
                let v01 = to_f64(src[[r0, c1]]);
                let v10 = to_f64(src[[r1, c0]]);
                let v11 = to_f64(src[[r1, c1]]);

                let top = v00 * (1.0 - wc) + v01 * wc;
                let bottom = v10 * (1.0 - wc) + v11 * wc;
                let value = top * (1.0 - wr) + bottom * wr;

                match from_f64::<T>(value) {
                    Some(v) => v,
                    None => {
                        failed = true;
                        src[[r0, c0]]
                    }
                }
            });
            if failed {
                return Err(FireError::UpstreamIo(
                    "bilinear interpolation produced a value outside the sample type range".to_string(),
                ));
            }
            out
        }
    };

    Ok(out)
}

fn nearest_index(dst: usize, ratio: f64, len: usize) -> usize {
    let src = ((dst as f64 + 0.5) * ratio).floor() as usize;
    src.min(len - 1)
}

/// Lower tap, upper tap and weight of the upper tap
fn bilinear_taps(dst: usize, ratio: f64, len: usize) -> (usize, usize, f64) {
    let max = (len - 1) as f64;
    let pos = ((dst as f64 + 0.5) * ratio - 0.5).clamp(0.0, max);
    let lower = pos.floor();
    let upper = (lower + 1.0).min(max);
    (lower as usize, upper as usize, pos - lower)
}

fn to_f64<T: NumCast + Copy>(value: T) -> f64 {
    <f64 as NumCast>::from(value).unwrap_or(0.0)
}

fn from_f64<T: NumCast + Copy>(value: f64) -> Option<T> {
    // Integer sample types round to nearest; float types take the value as is
    let integer_samples = T::from(0.5)
        .and_then(|half| <f64 as NumCast>::from(half))
        .map_or(true, |half| half != 0.5);

    if integer_samples {
        T::from(value.round())
    } else {
        T::from(value)
    }
}
