//! Bar model shared by every symbology.
//!
//! # Responsibilities
//! - Hold the dark/light module grid produced by an encoder
//! - Scale a grid to a requested pixel size
//!
//! # Design Decisions
//! - Linear codes are one module tall; scaling stretches them vertically
//! - Matrix codes keep their aspect ratio; the smaller factor wins
//! - Scaled output is centered on a light background
//! - Only integral factors, so every module keeps the same pixel width

use thiserror::Error;

/// Largest pixel count a scale request may produce.
pub const MAX_SCALED_PIXELS: u64 = 4096 * 4096;

/// How the modules of a symbol are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One row of bars (Code 39, Code 128, EAN).
    Linear,
    /// Stacked rows (PDF417).
    Matrix,
}

/// Errors raised while scaling a bar model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScaleError {
    #[error("can not scale barcode to an image smaller than {width}x{height}")]
    TooSmall { width: u32, height: u32 },

    #[error("can not scale barcode to a zero-sized image")]
    ZeroDimension,

    #[error("requested image {width}x{height} exceeds the pixel limit")]
    TooLarge { width: u32, height: u32 },
}

/// A grid of modules; `true` is a dark module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarModel {
    layout: Layout,
    width: u32,
    height: u32,
    modules: Vec<bool>,
}

impl BarModel {
    /// Build a single-row model from module values.
    pub fn linear(modules: Vec<bool>) -> Self {
        Self {
            layout: Layout::Linear,
            width: modules.len() as u32,
            height: 1,
            modules,
        }
    }

    /// Build a stacked model. Rows must all have the same length.
    pub fn matrix(rows: Vec<Vec<bool>>) -> Option<Self> {
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return None;
        }
        let height = rows.len() as u32;
        Some(Self {
            layout: Layout::Matrix,
            width: width as u32,
            height,
            modules: rows.into_iter().flatten().collect(),
        })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the module at (x, y) is dark. Out of range reads as light.
    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.modules[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Scale to exactly `width` x `height` pixels.
    pub fn scale(&self, width: u32, height: u32) -> Result<BarModel, ScaleError> {
        if width == 0 || height == 0 {
            return Err(ScaleError::ZeroDimension);
        }
        if u64::from(width) * u64::from(height) > MAX_SCALED_PIXELS {
            return Err(ScaleError::TooLarge { width, height });
        }

        let factor = match self.layout {
            Layout::Linear => width / self.width,
            Layout::Matrix => (width / self.width).min(height / self.height),
        };
        if factor == 0 {
            return Err(ScaleError::TooSmall {
                width: self.width,
                height: self.height,
            });
        }

        let offset_x = (width - self.width * factor) / 2;
        let offset_y = match self.layout {
            Layout::Linear => 0,
            Layout::Matrix => (height - self.height * factor) / 2,
        };

        let mut modules = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                let dark = if x < offset_x || y < offset_y {
                    false
                } else {
                    let src_x = (x - offset_x) / factor;
                    let src_y = match self.layout {
                        Layout::Linear => 0,
                        Layout::Matrix => (y - offset_y) / factor,
                    };
                    self.is_dark(src_x, src_y)
                };
                modules.push(dark);
            }
        }

        Ok(BarModel {
            layout: self.layout,
            width,
            height,
            modules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(pattern: &str) -> BarModel {
        BarModel::linear(pattern.chars().map(|c| c == '1').collect())
    }

    #[test]
    fn test_linear_scale_stretches_and_centers() {
        let model = bars("101");
        let scaled = model.scale(8, 4).unwrap();

        assert_eq!(scaled.width(), 8);
        assert_eq!(scaled.height(), 4);
        // factor 2, offset 1: . X X . . X X .
        for y in 0..4 {
            let row: String = (0..8)
                .map(|x| if scaled.is_dark(x, y) { '1' } else { '0' })
                .collect();
            assert_eq!(row, "01100110");
        }
    }

    #[test]
    fn test_linear_scale_too_narrow() {
        let model = bars("10101");
        assert_eq!(
            model.scale(4, 10),
            Err(ScaleError::TooSmall { width: 5, height: 1 })
        );
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let model = bars("1");
        assert_eq!(model.scale(0, 10), Err(ScaleError::ZeroDimension));
        assert_eq!(model.scale(10, 0), Err(ScaleError::ZeroDimension));
    }

    #[test]
    fn test_pixel_limit() {
        let model = bars("1");
        assert!(matches!(
            model.scale(100_000, 100_000),
            Err(ScaleError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_matrix_scale_keeps_aspect() {
        let model = BarModel::matrix(vec![vec![true, false], vec![false, true]]).unwrap();
        let scaled = model.scale(6, 4).unwrap();

        // factor min(3, 2) = 2, offset (1, 0)
        assert!(!scaled.is_dark(0, 0));
        assert!(scaled.is_dark(1, 0));
        assert!(scaled.is_dark(2, 1));
        assert!(!scaled.is_dark(3, 0));
        assert!(scaled.is_dark(3, 2));
        assert!(scaled.is_dark(4, 3));
        assert!(!scaled.is_dark(5, 3));
    }

    #[test]
    fn test_matrix_rejects_ragged_rows() {
        assert!(BarModel::matrix(vec![vec![true], vec![true, false]]).is_none());
        assert!(BarModel::matrix(Vec::new()).is_none());
    }
}
