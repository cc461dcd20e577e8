// SPDX-License-Identifier: GPL-3.0-only

//! Pinhole camera intrinsics
//!
//! Matrices are stored row-major in the layout the AR session hands out
//! (the transpose of the textbook K matrix):
//!
//! ```text
//! [[fx, 0,  0],
//!  [0,  fy, 0],
//!  [cx, cy, 1]]
//! ```
//!
//! so `fx = m[0][0]`, `fy = m[1][1]`, `cx = m[2][0]`, `cy = m[2][1]`.

use crate::constants::fallback_intrinsics;
use crate::errors::FrameError;
use serde::Serialize;

/// Camera intrinsics for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Intrinsics {
    matrix: [[f32; 3]; 3],
}

impl Intrinsics {
    /// Build from a 3x3 matrix in the AR-session layout
    ///
    /// Rejects non-finite entries, non-positive focal lengths and any
    /// matrix not in that layout. A textbook K (`cx`, `cy` in the last
    /// column) fails here instead of reading as a zero principal point.
    pub fn from_matrix(matrix: [[f32; 3]; 3]) -> Result<Self, FrameError> {
        if matrix.iter().flatten().any(|v| !v.is_finite()) {
            return Err(FrameError::InvalidMatrix(
                "matrix contains non-finite values".to_string(),
            ));
        }
        let off_axis = [matrix[0][1], matrix[0][2], matrix[1][0], matrix[1][2]];
        if off_axis.iter().any(|&v| v != 0.0) || matrix[2][2] != 1.0 {
            return Err(FrameError::InvalidMatrix(format!(
                "expected [[fx,0,0],[0,fy,0],[cx,cy,1]] layout, got {:?}",
                matrix
            )));
        }
        let (fx, fy) = (matrix[0][0], matrix[1][1]);
        if fx <= 0.0 || fy <= 0.0 {
            return Err(FrameError::InvalidMatrix(format!(
                "focal lengths must be positive (fx={}, fy={})",
                fx, fy
            )));
        }
        Ok(Self { matrix })
    }

    /// Build from nested rows as they appear in frame metadata JSON
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, FrameError> {
        if rows.len() != 3 || rows.iter().any(|r| r.len() != 3) {
            let shape: Vec<usize> = rows.iter().map(|r| r.len()).collect();
            return Err(FrameError::InvalidMatrix(format!(
                "expected 3x3 rows, got {} rows with lengths {:?}",
                rows.len(),
                shape
            )));
        }
        let mut matrix = [[0.0f32; 3]; 3];
        for (dst, src) in matrix.iter_mut().zip(rows) {
            dst.copy_from_slice(src);
        }
        Self::from_matrix(matrix)
    }

    /// Build directly from focal lengths and principal point
    pub fn from_parameters(fx: f32, fy: f32, cx: f32, cy: f32) -> Result<Self, FrameError> {
        Self::from_matrix([[fx, 0.0, 0.0], [0.0, fy, 0.0], [cx, cy, 1.0]])
    }

    /// Reference-device fallback (fx = fy = 1580, cx = 960, cy = 720)
    ///
    /// Calibrated for one 1920x1440 phone sensor, not a universal constant.
    /// Callers ask for it explicitly so missing calibration is never hidden.
    pub fn fallback() -> Self {
        Self {
            matrix: [
                [fallback_intrinsics::FX, 0.0, 0.0],
                [0.0, fallback_intrinsics::FY, 0.0],
                [fallback_intrinsics::CX, fallback_intrinsics::CY, 1.0],
            ],
        }
    }

    /// (fx, fy, cx, cy)
    pub fn extract(&self) -> (f32, f32, f32, f32) {
        (self.fx(), self.fy(), self.cx(), self.cy())
    }

    pub fn fx(&self) -> f32 {
        self.matrix[0][0]
    }

    pub fn fy(&self) -> f32 {
        self.matrix[1][1]
    }

    pub fn cx(&self) -> f32 {
        self.matrix[2][0]
    }

    pub fn cy(&self) -> f32 {
        self.matrix[2][1]
    }

    /// Intrinsics for the same camera at another resolution
    ///
    /// Focal lengths and principal point scale with the image axes.
    pub fn rescaled(&self, from: (u32, u32), to: (u32, u32)) -> Self {
        let sx = to.0 as f32 / from.0 as f32;
        let sy = to.1 as f32 / from.1 as f32;
        Self {
            matrix: [
                [self.fx() * sx, 0.0, 0.0],
                [0.0, self.fy() * sy, 0.0],
                [self.cx() * sx, self.cy() * sy, 1.0],
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_values() {
        let (fx, fy, cx, cy) = Intrinsics::fallback().extract();
        assert_eq!((fx, fy, cx, cy), (1580.0, 1580.0, 960.0, 720.0));
    }

    #[test]
    fn test_extract_uses_transposed_layout() {
        let k = Intrinsics::from_matrix([[1000.0, 0.0, 0.0], [0.0, 900.0, 0.0], [320.0, 240.0, 1.0]])
            .unwrap();
        assert_eq!(k.extract(), (1000.0, 900.0, 320.0, 240.0));
    }

    #[test]
    fn test_from_rows_rejects_bad_shape() {
        let rows = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]];
        assert!(matches!(
            Intrinsics::from_rows(&rows),
            Err(FrameError::InvalidMatrix(_))
        ));
        let rows = vec![vec![1.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        assert!(Intrinsics::from_rows(&rows).is_err());
    }

    #[test]
    fn test_from_matrix_rejects_degenerate() {
        assert!(Intrinsics::from_parameters(0.0, 1.0, 0.0, 0.0).is_err());
        assert!(Intrinsics::from_parameters(1.0, f32::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_from_rows_matches_fallback() {
        let rows = vec![
            vec![1580.0, 0.0, 0.0],
            vec![0.0, 1580.0, 0.0],
            vec![960.0, 720.0, 1.0],
        ];
        assert_eq!(Intrinsics::from_rows(&rows).unwrap(), Intrinsics::fallback());
    }

    #[test]
    fn test_textbook_layout_is_rejected() {
        let textbook = [[1580.0, 0.0, 960.0], [0.0, 1580.0, 720.0], [0.0, 0.0, 1.0]];
        assert!(matches!(
            Intrinsics::from_matrix(textbook),
            Err(FrameError::InvalidMatrix(_))
        ));
    }

    #[test]
    fn test_projective_row_must_end_in_one() {
        let scaled = [[1580.0, 0.0, 0.0], [0.0, 1580.0, 0.0], [960.0, 720.0, 2.0]];
        assert!(Intrinsics::from_matrix(scaled).is_err());
    }

    #[test]
    fn test_rescaled_to_analysis_grid() {
        let k = Intrinsics::fallback().rescaled((1920, 1440), (448, 448));
        let (fx, fy, cx, cy) = k.extract();
        assert!((cx - 224.0).abs() < 1e-3);
        assert!((cy - 224.0).abs() < 1e-3);
        assert!((fx - 1580.0 * 448.0 / 1920.0).abs() < 1e-3);
        assert!((fy - 1580.0 * 448.0 / 1440.0).abs() < 1e-3);
    }
}
