//! Double coordinate rotation
//!
//! First about z so the mean cross-wind vanishes, then about the new y so
//! the mean vertical wind vanishes.

use crate::stats::mean;

/// Rotated wind components
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedWind {
    pub u2: Vec<f64>,
    pub v2: Vec<f64>,
    pub w2: Vec<f64>,
    /// First rotation angle (rad)
    pub theta_z: f64,
    /// Second rotation angle (rad)
    pub theta_y: f64,
}

/// Rotate `(u, v, w)` into the mean-streamline frame
pub fn double_rotate(u: &[f64], v: &[f64], w: &[f64]) -> RotatedWind {
    let theta_z = mean(v).atan2(mean(u));
    let (sin_z, cos_z) = theta_z.sin_cos();

    let u_rot: Vec<f64> = u.iter().zip(v).map(|(u, v)| u * cos_z + v * sin_z).collect();
    let v2: Vec<f64> = u.iter().zip(v).map(|(u, v)| -u * sin_z + v * cos_z).collect();

    let theta_y = mean(w).atan2(mean(&u_rot));
    let (sin_y, cos_y) = theta_y.sin_cos();

    let u2 = u_rot.iter().zip(w).map(|(u, w)| u * cos_y + w * sin_y).collect();
    let w2 = u_rot.iter().zip(w).map(|(u, w)| -u * sin_y + w * cos_y).collect();

    RotatedWind {
        u2,
        v2,
        w2,
        theta_z,
        theta_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_zeroes_mean_cross_and_vertical_wind() {
        let n = 600;
        let u: Vec<f64> = (0..n).map(|i| 2.0 + 0.3 * (i as f64 * 0.11).sin()).collect();
        let v: Vec<f64> = (0..n).map(|i| 1.1 + 0.2 * (i as f64 * 0.07).cos()).collect();
        let w: Vec<f64> = (0..n).map(|i| 0.25 + 0.1 * (i as f64 * 0.19).sin()).collect();

        let rotated = double_rotate(&u, &v, &w);
        assert!(mean(&rotated.v2).abs() < 1e-9);
        assert!(mean(&rotated.w2).abs() < 1e-9);
        assert!(mean(&rotated.u2) > 0.0);
        assert!(rotated.theta_z > 0.0);
    }

    #[test]
    fn test_aligned_wind_is_unchanged() {
        let u = [1.0, 2.0, 3.0];
        let v = [0.0, 0.0, 0.0];
        let w = [0.0, 0.0, 0.0];
        let rotated = double_rotate(&u, &v, &w);
        assert_eq!(rotated.theta_z, 0.0);
        assert_eq!(rotated.theta_y, 0.0);
        assert_eq!(rotated.u2, u.to_vec());
    }
}
