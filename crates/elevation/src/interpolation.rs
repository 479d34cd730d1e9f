//! Interpolation kernels over a row-major raster.
//!
//! Fractional `(col, row)` positions are clamped into the grid before lookup,
//! so queries beyond an edge read the nearest edge cell. No-data is `NaN`.

use serde::{Deserialize, Serialize};

/// How a fractional raster position is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Nearest cell (preserves exact values).
    Nearest,
    /// Weighted average of the four enclosing cells.
    #[default]
    Bilinear,
}

impl InterpolationMethod {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nearest" => Self::Nearest,
            _ => Self::Bilinear,
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

fn clamp_index(v: f64, dim: usize) -> f64 {
    v.clamp(0.0, (dim - 1) as f64)
}

/// Nearest neighbor lookup.
pub fn nearest_interpolate(data: &[f32], width: usize, height: usize, col: f64, row: f64) -> f32 {
    let c = clamp_index(col, width).round() as usize;
    let r = clamp_index(row, height).round() as usize;
    data[r * width + c]
}

/// Bilinear interpolation.
///
/// Returns `NaN` if any of the four enclosing cells is no-data.
pub fn bilinear_interpolate(data: &[f32], width: usize, height: usize, col: f64, row: f64) -> f32 {
    let col = clamp_index(col, width);
    let row = clamp_index(row, height);

    let x0 = col.floor() as usize;
    let y0 = row.floor() as usize;
    let x1 = (col.ceil() as usize).min(width - 1);
    let y1 = (row.ceil() as usize).min(height - 1);

    let xf = (col - x0 as f64) as f32;
    let yf = (row - y0 as f64) as f32;

    let v00 = data[y0 * width + x0];
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}

/// Look up a fractional position with the given method.
pub fn interpolate(
    data: &[f32],
    width: usize,
    height: usize,
    col: f64,
    row: f64,
    method: InterpolationMethod,
) -> f32 {
    match method {
        InterpolationMethod::Nearest => nearest_interpolate(data, width, height, col, row),
        InterpolationMethod::Bilinear => bilinear_interpolate(data, width, height, col, row),
    }
}

/// Resample a grid to a new size, corner cells aligned.
///
/// # Arguments
/// * `data` - Source grid data
/// * `src_width` - Source width
/// * `src_height` - Source height
/// * `dst_width` - Destination width
/// * `dst_height` - Destination height
/// * `method` - Interpolation method
pub fn resample_grid(
    data: &[f32],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
    method: InterpolationMethod,
) -> Vec<f32> {
    let mut output = Vec::with_capacity(dst_width * dst_height);

    let scale_x = (src_width - 1) as f64 / (dst_width - 1).max(1) as f64;
    let scale_y = (src_height - 1) as f64 / (dst_height - 1).max(1) as f64;

    for dy in 0..dst_height {
        for dx in 0..dst_width {
            let sx = dx as f64 * scale_x;
            let sy = dy as f64 * scale_y;
            output.push(interpolate(data, src_width, src_height, sx, sy, method));
        }
    }

    output
}
