use serde::{Deserialize, Serialize};

use super::FilterError;

/// A 2D coordinate in image space, `x` along the columns and `y` along the rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Column coordinate.
    pub x: f32,
    /// Row coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    ///
    /// # Examples
    ///
    /// ```
    /// use focal_imgproc::filter::Point;
    ///
    /// let d = Point::new(0.0, 0.0).distance(&Point::new(3.0, 4.0));
    /// assert_eq!(d, 5.0);
    /// ```
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f32; 2]> for Point {
    fn from(p: [f32; 2]) -> Self {
        Self { x: p[0], y: p[1] }
    }
}

/// A square convolution kernel.
///
/// The weights are stored row-major in a `width * width` vector. The weighted sum
/// of a neighbourhood is divided by `divider` to produce the output sample. A kernel
/// may be tagged with a position in image space, which makes it a reference kernel
/// for the spatially varying filters.
///
/// # Example
///
/// ```rust
/// use focal_imgproc::filter::Kernel;
///
/// let kernel = Kernel::rect(3).unwrap();
/// assert_eq!(kernel.width(), 3);
/// assert_eq!(kernel.half(), 1);
/// assert_eq!(kernel.divider(), 9.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Vec<f32>,
    width: usize,
    divider: f32,
    position: Option<Point>,
}

impl Kernel {
    /// Create a kernel from row-major weights and a divider.
    ///
    /// # Errors
    ///
    /// The weights must form an odd-sized square matrix and the divider must be finite
    /// and non-zero.
    pub fn new(weights: Vec<f32>, divider: f32) -> Result<Self, FilterError> {
        let width = (weights.len() as f64).sqrt().round() as usize;
        if width * width != weights.len() {
            return Err(FilterError::NonSquareKernel(weights.len()));
        }
        check_width(width)?;
        if divider == 0.0 || !divider.is_finite() {
            return Err(FilterError::InvalidDivider(divider));
        }

        Ok(Self {
            weights,
            width,
            divider,
            position: None,
        })
    }

    /// Build a kernel from already normalized weights of a known odd width.
    pub(crate) fn from_normalized(weights: Vec<f32>, width: usize) -> Self {
        debug_assert_eq!(weights.len(), width * width);
        Self {
            weights,
            width,
            divider: 1.0,
            position: None,
        }
    }

    /// Create an identity kernel: a single 1 at the center, divider 1.
    pub fn identity(width: usize) -> Result<Self, FilterError> {
        check_width(width)?;
        let half = width / 2;
        let mut weights = vec![0.0; width * width];
        weights[half * width + half] = 1.0;
        Self::new(weights, 1.0)
    }

    /// Create a box (RECT) blur kernel: all ones, divider `width * width`.
    pub fn rect(width: usize) -> Result<Self, FilterError> {
        check_width(width)?;
        Self::new(vec![1.0; width * width], (width * width) as f32)
    }

    /// Tag the kernel with a position in image space.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// The row-major weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    // scratch kernels are refilled in place, the width never changes
    pub(crate) fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// The side length of the kernel.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The number of pixels between the center and the edge of the kernel.
    pub fn half(&self) -> usize {
        self.width / 2
    }

    /// The normalization denominator.
    pub fn divider(&self) -> f32 {
        self.divider
    }

    /// The position of a reference kernel, if any.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// The weight at column `x` and row `y` of the kernel.
    ///
    /// # Panics
    ///
    /// If `x` or `y` is outside the kernel.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.weights[y * self.width + x]
    }

    /// The sum of all weights.
    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// The weights divided by the divider.
    pub fn normalized_weights(&self) -> Vec<f32> {
        self.weights.iter().map(|w| w / self.divider).collect()
    }
}

fn check_width(width: usize) -> Result<(), FilterError> {
    if width == 0 || width % 2 == 0 {
        return Err(FilterError::InvalidKernelWidth(width));
    }
    Ok(())
}
