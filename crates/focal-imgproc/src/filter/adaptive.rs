use focal_image::{ImageSize, Rgba8Image};

use super::{convolve_with, FilterError, Kernel, KernelSelection, Point};
use crate::parallel::ExecutionStrategy;

/// A kernel that carries a cached sequence of kernels of increasing extent.
///
/// The sequence is built once, at construction, and is read-only afterwards. The
/// convolution picks one entry per pixel from the distance between the pixel and
/// [`AdaptiveKernel::position`], so pixels far from the focus point are blurred with
/// wider kernels than pixels close to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveKernel {
    variants: Vec<Kernel>,
    position: Point,
}

impl AdaptiveKernel {
    /// Create a bokeh kernel centred at `position`.
    ///
    /// The cache holds box kernels of widths `1, 3, 5, …, width`, i.e.
    /// `ceil(width / 2)` entries.
    ///
    /// # Example
    ///
    /// ```
    /// use focal_imgproc::filter::{AdaptiveKernel, Point};
    ///
    /// let kernel = AdaptiveKernel::bokeh(5, Point::new(10.0, 10.0)).unwrap();
    /// assert_eq!(kernel.cache_count(), 3);
    /// assert_eq!(kernel.variant(2).unwrap().width(), 5);
    /// ```
    pub fn bokeh(width: usize, position: Point) -> Result<Self, FilterError> {
        if width == 0 || width % 2 == 0 {
            return Err(FilterError::InvalidKernelWidth(width));
        }

        let variants = (1..=width)
            .step_by(2)
            .map(Kernel::rect)
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "bokeh kernel at ({}, {}) with {} cached variants",
            position.x,
            position.y,
            variants.len()
        );

        Ok(Self { variants, position })
    }

    /// The focus point of the kernel.
    pub fn position(&self) -> Point {
        self.position
    }

    /// The number of cached kernels.
    pub fn cache_count(&self) -> usize {
        self.variants.len()
    }

    /// The cached kernels, narrowest first.
    pub fn variants(&self) -> &[Kernel] {
        &self.variants
    }

    /// The cached kernel at `index`, if any.
    pub fn variant(&self, index: usize) -> Option<&Kernel> {
        self.variants.get(index)
    }

    /// The width of the widest cached kernel.
    pub fn width(&self) -> usize {
        self.variants.last().map_or(1, Kernel::width)
    }

    /// The half width of the widest cached kernel.
    pub fn half(&self) -> usize {
        self.width() / 2
    }

    /// The largest distance between the focus point and a corner pixel of an image.
    pub fn max_distance(&self, size: ImageSize) -> f32 {
        let right = size.width.saturating_sub(1) as f32;
        let bottom = size.height.saturating_sub(1) as f32;
        [
            Point::new(0.0, 0.0),
            Point::new(right, 0.0),
            Point::new(0.0, bottom),
            Point::new(right, bottom),
        ]
        .iter()
        .map(|corner| self.position.distance(corner))
        .fold(0.0, f32::max)
    }

    /// Map a distance to an index into the cache.
    ///
    /// The mapping is monotonic: `0` maps to the first entry and `max_distance` to
    /// the last. A zero `max_distance` always selects the first entry.
    pub fn index_for_distance(&self, distance: f32, max_distance: f32) -> usize {
        let last = self.variants.len().saturating_sub(1);
        if max_distance <= 0.0 {
            return 0;
        }
        let index = (distance / max_distance * self.variants.len() as f32).round();
        (index.max(0.0) as usize).min(last)
    }

    /// The cached kernel to use at `point`.
    pub fn select(&self, point: Point, max_distance: f32) -> &Kernel {
        let index = self.index_for_distance(self.position.distance(&point), max_distance);
        &self.variants[index]
    }
}

/// Apply an adaptive kernel to an RGBA image.
///
/// Each interior pixel is convolved with the cached kernel picked from its distance to
/// the kernel position. The border skip is the half width of the widest cached kernel;
/// border pixels of `dst` are left untouched.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, same size as `src`.
/// * `kernel` - The adaptive kernel.
/// * `strategy` - The execution strategy.
pub fn convolve_adaptive(
    src: &Rgba8Image,
    dst: &mut Rgba8Image,
    kernel: &AdaptiveKernel,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    let max_distance = kernel.max_distance(src.size());
    log::debug!(
        "adaptive convolution on {} with max distance {max_distance}",
        src.size()
    );

    convolve_with(src, dst, kernel.half(), strategy, |x, y| {
        KernelSelection::Borrowed(kernel.select(Point::new(x as f32, y as f32), max_distance))
    })
}
