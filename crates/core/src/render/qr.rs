//! QR module matrix and its vector layout.

use qrcode::{Color, EcLevel, QrCode};

use super::error::RenderError;
use super::types::QrGeometry;

/// Light modules kept around the symbol on every side.
pub const QUIET_ZONE: usize = 4;

/// Dark/light modules of an encoded symbol, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

/// Filled rectangle in page units: `[x, y, width, height]`.
pub type Rect = [f32; 4];

impl QrMatrix {
    /// Encodes `data` with the highest error-correction level so cards stay
    /// scannable when printed small or partially covered.
    pub fn encode(data: &str) -> Result<Self, RenderError> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H).map_err(|e| {
            RenderError::QrEncoding {
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            width: code.width(),
            modules: code
                .to_colors()
                .into_iter()
                .map(|c| c == Color::Dark)
                .collect(),
        })
    }

    /// Modules per side, quiet zone excluded.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, col: usize, row: usize) -> bool {
        col < self.width && row < self.width && self.modules[row * self.width + col]
    }

    /// Dark modules as filled rectangles scaled into `geometry`, with
    /// horizontal runs merged into one rectangle each.
    pub fn rects(&self, geometry: &QrGeometry) -> Vec<Rect> {
        let module = geometry.size / (self.width + 2 * QUIET_ZONE) as f32;
        let top = geometry.y + geometry.size;
        let mut rects = Vec::new();

        for row in 0..self.width {
            let y = top - (row + QUIET_ZONE + 1) as f32 * module;
            let mut col = 0;
            while col < self.width {
                if !self.is_dark(col, row) {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < self.width && self.is_dark(col, row) {
                    col += 1;
                }
                rects.push([
                    geometry.x + (start + QUIET_ZONE) as f32 * module,
                    y,
                    (col - start) as f32 * module,
                    module,
                ]);
            }
        }

        rects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> QrGeometry {
        QrGeometry {
            x: 100.0,
            y: 50.0,
            size: 150.0,
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = QrMatrix::encode("20123456789").unwrap();
        let b = QrMatrix::encode("20123456789").unwrap();
        assert_eq!(a, b);
        // Version 1 symbols are 21 modules wide
        assert!(a.width() >= 21);
        assert_ne!(a, QrMatrix::encode("20123456790").unwrap());
    }

    #[test]
    fn test_finder_pattern_corner_is_dark() {
        let matrix = QrMatrix::encode("A1").unwrap();
        assert!(matrix.is_dark(0, 0));
        assert!(matrix.is_dark(6, 0));
        assert!(!matrix.is_dark(7, 0));
        assert!(!matrix.is_dark(matrix.width(), 0));
    }

    #[test]
    fn test_rects_stay_inside_quiet_zone() {
        let matrix = QrMatrix::encode("20123456789").unwrap();
        let geometry = geometry();
        let module = geometry.size / (matrix.width() + 2 * QUIET_ZONE) as f32;
        let margin = QUIET_ZONE as f32 * module - 0.001;

        let rects = matrix.rects(&geometry);
        assert!(!rects.is_empty());
        for [x, y, w, h] in rects {
            assert!(x >= geometry.x + margin);
            assert!(y >= geometry.y + margin);
            assert!(x + w <= geometry.x + geometry.size - margin);
            assert!(y + h <= geometry.y + geometry.size - margin);
        }
    }

    #[test]
    fn test_first_rect_is_top_left_finder_row() {
        let matrix = QrMatrix::encode("A1").unwrap();
        let geometry = geometry();
        let module = geometry.size / (matrix.width() + 2 * QUIET_ZONE) as f32;

        let [x, y, w, h] = matrix.rects(&geometry)[0];
        assert!((x - (geometry.x + 4.0 * module)).abs() < 1e-3);
        assert!((y - (geometry.y + geometry.size - 5.0 * module)).abs() < 1e-3);
        // The finder pattern's top edge is seven dark modules
        assert!((w - 7.0 * module).abs() < 1e-3);
        assert!((h - module).abs() < 1e-3);
    }
}
