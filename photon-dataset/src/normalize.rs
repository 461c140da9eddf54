use crate::tensor::SampleTensor;

/// Leading channels treated as spatial coordinates by [`normalize`].
pub const POSITION_CHANNELS: usize = 3;

/// Rescales the first three channels of `points` to [-1, 1] per axis, in
/// place, and returns the per-axis (min, max) used for the rescale. Exact
/// extrema map to exactly -1 and +1; no clamping is applied. An axis with
/// zero range divides by zero and leaves NaN in that channel; any NaN in the
/// output marks the sample as failed.
pub fn normalize(points: &mut SampleTensor) -> ([f64; 3], [f64; 3]) {
    let mut mins = [f64::MAX; 3];
    let mut maxs = [f64::MIN; 3];

    for row in points.iter_rows() {
        for axis in 0..POSITION_CHANNELS {
            mins[axis] = mins[axis].min(row[axis]);
            maxs[axis] = maxs[axis].max(row[axis]);
        }
    }

    for index in 0..points.rows() {
        let row = points.row_mut(index);
        for axis in 0..POSITION_CHANNELS {
            row[axis] = 2.0 * ((row[axis] - mins[axis]) / (maxs[axis] - mins[axis])) - 1.0;
        }
    }

    (mins, maxs)
}

/// Exact inverse of [`normalize`] given the bounds it returned.
pub fn denormalize(points: &mut SampleTensor, mins: &[f64; 3], maxs: &[f64; 3]) {
    for index in 0..points.rows() {
        let row = points.row_mut(index);
        for axis in 0..POSITION_CHANNELS {
            row[axis] = (row[axis] + 1.0) / 2.0 * (maxs[axis] - mins[axis]) + mins[axis];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor_from_rows(rows: &[[f64; 3]]) -> SampleTensor {
        let mut tensor = SampleTensor::with_capacity(rows.len(), 3);
        for row in rows {
            tensor.push_row(row);
        }
        tensor
    }

    #[test]
    fn output_spans_unit_interval_per_axis() {
        let mut points = tensor_from_rows(&[
            [430.0, 7650.0, -12.5],
            [431.0, 7655.0, -2.0],
            [432.5, 7652.0, 3.25],
        ]);

        let (mins, maxs) = normalize(&mut points);

        assert_eq!(mins, [430.0, 7650.0, -12.5]);
        assert_eq!(maxs, [432.5, 7655.0, 3.25]);
        for row in points.iter_rows() {
            for axis in 0..3 {
                assert!(row[axis] >= -1.0 && row[axis] <= 1.0);
            }
        }
        // exact extrema map to exactly -1 and +1
        assert_eq!(points.row(0), &[-1.0, -1.0, -1.0]);
        assert_eq!(points.row(2)[0], 1.0);
        assert_eq!(points.row(1)[1], 1.0);
        assert_eq!(points.row(2)[2], 1.0);
    }

    #[test]
    fn normalization_is_invertible() {
        let original = tensor_from_rows(&[
            [100.25, -40.0, 3.5],
            [101.75, -38.5, -7.25],
            [100.9, -39.1, 0.0],
        ]);
        let mut points = original.clone();

        let (mins, maxs) = normalize(&mut points);
        denormalize(&mut points, &mins, &maxs);

        for (restored, source) in points.iter_rows().zip(original.iter_rows()) {
            for axis in 0..3 {
                assert!((restored[axis] - source[axis]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn degenerate_axis_produces_nan() {
        let mut points = tensor_from_rows(&[[1.0, 5.0, 2.0], [2.0, 5.0, 3.0]]);

        normalize(&mut points);

        assert!(points.row(0)[1].is_nan());
        assert!(points.row(1)[1].is_nan());
        // the remaining axes are unaffected
        assert_eq!(points.row(0)[0], -1.0);
        assert_eq!(points.row(1)[0], 1.0);
    }

    #[test]
    fn interior_values_map_linearly() {
        let mut points = tensor_from_rows(&[[0.0, 0.0, 0.0], [5.0, 2.0, 1.0], [10.0, 4.0, 2.0]]);

        normalize(&mut points);

        assert_eq!(points.row(1), &[0.0, 0.0, 0.0]);
    }
}
