use focal_image::Rgba8Image;

use super::convolution::{check_sizes, filter_pixel, CHANNELS};
use super::{FilterError, Kernel, Point};
use crate::parallel::{self, ExecutionStrategy};

// below this the reference triangle is treated as a line
const MIN_TRIANGLE_AREA: f32 = 1e-6;

/// Three reference kernels that define a plane of focus.
///
/// The kernel for a pixel is a blend of the three references weighted by the
/// barycentric coordinates of the pixel in the triangle spanned by the reference
/// positions. Negative coordinates, i.e. pixels outside the triangle, are clamped to
/// zero and the rest renormalized, so the blend is continuous everywhere and equals
/// reference `k` at the position of reference `k`.
///
/// All references are normalized (`weights / divider`) and zero padded to the widest
/// reference, so the blended kernel has divider 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarKernels {
    positions: [Point; 3],
    padded: [Vec<f32>; 3],
    width: usize,
    area: f32,
}

impl PlanarKernels {
    /// Create a plane of focus from three positioned reference kernels.
    ///
    /// # Errors
    ///
    /// * [`FilterError::UnsupportedKernelCount`] unless exactly three kernels are given.
    /// * [`FilterError::MissingKernelPosition`] if a reference has no position.
    /// * [`FilterError::DegenerateGeometry`] if the positions are collinear.
    pub fn new(references: Vec<Kernel>) -> Result<Self, FilterError> {
        if references.len() != 3 {
            return Err(FilterError::UnsupportedKernelCount(references.len()));
        }

        let mut positions = [Point::default(); 3];
        for (i, (kernel, position)) in references.iter().zip(positions.iter_mut()).enumerate() {
            *position = kernel
                .position()
                .ok_or(FilterError::MissingKernelPosition(i))?;
        }

        let [p0, p1, p2] = positions;
        let area = (p1.y - p2.y) * (p0.x - p2.x) + (p2.x - p1.x) * (p0.y - p2.y);
        if area.abs() < MIN_TRIANGLE_AREA {
            return Err(FilterError::DegenerateGeometry);
        }

        let width = references.iter().map(Kernel::width).max().unwrap_or(1);
        let padded = [
            pad_normalized(&references[0], width),
            pad_normalized(&references[1], width),
            pad_normalized(&references[2], width),
        ];

        log::debug!("plane of focus through {positions:?} with {width}x{width} kernels");

        Ok(Self {
            positions,
            padded,
            width,
            area,
        })
    }

    /// The width of every blended kernel.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The half width of every blended kernel.
    pub fn half(&self) -> usize {
        self.width / 2
    }

    /// The blend weights of the three references at `point`.
    ///
    /// The weights are non-negative and sum to one.
    pub fn barycentric(&self, point: Point) -> [f32; 3] {
        let [p0, p1, p2] = self.positions;
        let l0 = ((p1.y - p2.y) * (point.x - p2.x) + (p2.x - p1.x) * (point.y - p2.y)) / self.area;
        let l1 = ((p2.y - p0.y) * (point.x - p2.x) + (p0.x - p2.x) * (point.y - p2.y)) / self.area;
        let l2 = 1.0 - l0 - l1;

        let clamped = [l0.max(0.0), l1.max(0.0), l2.max(0.0)];
        let sum: f32 = clamped.iter().sum();
        clamped.map(|l| l / sum)
    }

    /// The blended kernel for `point`.
    pub fn kernel_at(&self, point: Point) -> Kernel {
        let mut weights = vec![0.0; self.width * self.width];
        self.blend_into(point, &mut weights);
        Kernel::from_normalized(weights, self.width)
    }

    // `weights` holds `width * width` entries
    fn blend_into(&self, point: Point, weights: &mut [f32]) {
        let lambdas = self.barycentric(point);
        weights.fill(0.0);
        for (lambda, padded) in lambdas.iter().zip(&self.padded) {
            if *lambda == 0.0 {
                continue;
            }
            weights
                .iter_mut()
                .zip(padded)
                .for_each(|(w, p)| *w += lambda * p);
        }
    }
}

/// Normalize a kernel and center it in a `width * width` matrix of zeros.
fn pad_normalized(kernel: &Kernel, width: usize) -> Vec<f32> {
    let offset = (width - kernel.width()) / 2;
    let normalized = kernel.normalized_weights();
    let mut padded = vec![0.0; width * width];
    for (ky, row) in normalized.chunks_exact(kernel.width()).enumerate() {
        let start = (ky + offset) * width + offset;
        padded[start..start + kernel.width()].copy_from_slice(row);
    }
    padded
}

/// Apply a plane of focus to an RGBA image.
///
/// Every interior pixel is convolved with [`PlanarKernels::kernel_at`]. The border
/// skip is the half width of the widest reference. The blended kernel is refilled in
/// place for every pixel of a row.
pub fn convolve_planar(
    src: &Rgba8Image,
    dst: &mut Rgba8Image,
    planar: &PlanarKernels,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    check_sizes(src, dst)?;
    log::debug!("planar convolution on {}", src.size());

    let (cols, rows) = (src.cols(), src.rows());
    let half = planar.half();
    let stride = cols * CHANNELS;

    parallel::for_each_row(dst.as_slice_mut(), stride, strategy, |y, row| {
        if y < half || y + half >= rows {
            return;
        }
        let mut scratch = Kernel::from_normalized(vec![0.0; planar.width.pow(2)], planar.width);
        for x in half..cols.saturating_sub(half) {
            planar.blend_into(Point::new(x as f32, y as f32), scratch.weights_mut());
            filter_pixel(src, x, y, &scratch, row);
        }
    })?;

    Ok(())
}
