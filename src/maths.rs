//! Small numeric helpers used by the deformation engine.

/// Normalize `val` into [0, 1] relative to the `[min_val, max_val]` range.
///
/// Values outside the range extrapolate (no clamping).
pub fn fractionate(val: f32, min_val: f32, max_val: f32) -> f32 {
    (val - min_val) / (max_val - min_val)
}

/// Affine remap of `val` from `[min_val, max_val]` into `[out_min, out_max]`.
///
/// Inputs outside the source range extrapolate linearly, so the output is
/// not clamped to `[out_min, out_max]` either.
pub fn modulate(val: f32, min_val: f32, max_val: f32, out_min: f32, out_max: f32) -> f32 {
    let fr = fractionate(val, min_val, max_val);
    let delta = out_max - out_min;
    out_min + fr * delta
}

/// Arithmetic mean of a byte slice.
pub fn avg(values: &[u8]) -> f32 {
    let total: u32 = values.iter().map(|&v| v as u32).sum();
    total as f32 / values.len() as f32
}

/// Maximum element of a byte slice.
pub fn max_value(values: &[u8]) -> u8 {
    values.iter().copied().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractionate_endpoints() {
        assert_eq!(fractionate(0.0, 0.0, 10.0), 0.0);
        assert_eq!(fractionate(10.0, 0.0, 10.0), 1.0);
        assert_eq!(fractionate(5.0, 0.0, 10.0), 0.5);
    }

    #[test]
    fn test_modulate_is_affine() {
        // Endpoints map exactly
        assert_eq!(modulate(0.0, 0.0, 1.0, 0.5, 8.0), 0.5);
        assert_eq!(modulate(1.0, 0.0, 1.0, 0.5, 8.0), 8.0);

        // Midpoint maps to midpoint
        let mid = modulate(0.5, 0.0, 1.0, 0.5, 4.0);
        assert!((mid - 2.25).abs() < 1e-6);
    }

    #[test]
    fn test_modulate_extrapolates() {
        // Inputs beyond the source range are not clamped
        let out = modulate(2.0, 0.0, 1.0, 0.0, 4.0);
        assert!((out - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_avg() {
        assert_eq!(avg(&[0, 0, 0, 0]), 0.0);
        assert_eq!(avg(&[1, 2, 3, 4]), 2.5);
        assert_eq!(avg(&[255]), 255.0);
    }

    #[test]
    fn test_max_value() {
        assert_eq!(max_value(&[3, 200, 17]), 200);
        assert_eq!(max_value(&[0, 0]), 0);
        assert_eq!(max_value(&[]), 0);
    }
}
