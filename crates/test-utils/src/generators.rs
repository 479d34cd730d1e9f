//! Synthetic elevation rasters.
//!
//! All grids are row-major with row 0 at the north edge.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid filled with one value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid with NaN values at specified positions.
///
/// Useful for testing no-data handling.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `nan_positions` - List of (col, row) positions that should be NaN
///
/// # Returns
///
/// A `Vec<f32>` with NaN at specified positions, zeros elsewhere.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// West-to-east ramp: each cell holds its column index.
pub fn create_ramp_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            data.push(col as f32);
        }
    }
    data
}

/// Square grid with a cone-shaped hill in the middle.
///
/// The summit of height `peak` sits on the centre cell and the slope drops
/// one unit per cell of distance down to zero.
pub fn create_hill_grid(size: usize, peak: f32) -> Vec<f32> {
    let centre = (size as f32 - 1.0) / 2.0;
    let mut data = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let dx = col as f32 - centre;
            let dy = row as f32 - centre;
            data.push((peak - (dx * dx + dy * dy).sqrt()).max(0.0));
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(3, 2);
        assert_eq!(grid, vec![0.0, 1000.0, 2000.0, 1.0, 1001.0, 2001.0]);
    }

    #[test]
    fn test_create_grid_with_nans() {
        let grid = create_grid_with_nans(3, 3, &[(1, 1), (5, 5)]);
        assert!(grid[4].is_nan());
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 1);
    }

    #[test]
    fn test_create_hill_grid() {
        let grid = create_hill_grid(5, 10.0);
        assert_eq!(grid[12], 10.0);
        assert_eq!(grid[0], 10.0 - 8.0f32.sqrt());
    }
}
