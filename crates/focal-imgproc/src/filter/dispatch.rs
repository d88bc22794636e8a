use focal_image::Rgba8Image;

use super::{
    convolve, convolve_adaptive, convolve_planar, convolve_with, AdaptiveKernel, FilterError,
    FilterKernel, FilterKind, Kernel, KernelSelection, PlanarKernels, Point,
};
use crate::parallel::ExecutionStrategy;

/// Two reference kernels describing a radial effect.
///
/// Pixels within the distance between the two reference positions, measured from the
/// center kernel, use the center kernel; pixels farther away use the outer kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialKernels {
    center: Kernel,
    outer: Kernel,
    origin: Point,
    radius: f32,
}

impl RadialKernels {
    /// Create a radial effect from a center and an outer kernel, both positioned.
    pub fn new(center: Kernel, outer: Kernel) -> Result<Self, FilterError> {
        let origin = center
            .position()
            .ok_or(FilterError::MissingKernelPosition(0))?;
        let edge = outer
            .position()
            .ok_or(FilterError::MissingKernelPosition(1))?;
        let radius = origin.distance(&edge);

        Ok(Self {
            center,
            outer,
            origin,
            radius,
        })
    }

    /// The distance from the center position where the outer kernel takes over.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// The kernel to use at `point`.
    pub fn select(&self, point: Point) -> &Kernel {
        if self.origin.distance(&point) > self.radius {
            &self.outer
        } else {
            &self.center
        }
    }

    /// The larger half width of the two kernels.
    pub fn half(&self) -> usize {
        self.center.half().max(self.outer.half())
    }
}

/// How a [`MultiKernelFilter`] picks the kernel of a pixel.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelMode {
    /// No reference kernel: the identity.
    Identity(Kernel),
    /// One kernel for every pixel.
    Single(Kernel),
    /// Two kernels, center and outside.
    Radial(RadialKernels),
    /// Three kernels spanning a plane of focus.
    Planar(PlanarKernels),
}

/// A filter driven by up to three reference kernels.
///
/// The number of references picks the mode: zero is the identity, one is plain
/// convolution, two is radial and three is planar.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiKernelFilter {
    mode: KernelMode,
}

impl MultiKernelFilter {
    /// Create the filter from its reference kernels.
    ///
    /// # Errors
    ///
    /// More than three references yield [`FilterError::UnsupportedKernelCount`]. The
    /// radial and planar modes additionally require positioned references.
    ///
    /// # Example
    ///
    /// ```
    /// use focal_imgproc::filter::{Kernel, KernelMode, MultiKernelFilter};
    ///
    /// let filter = MultiKernelFilter::new(vec![Kernel::rect(3).unwrap()]).unwrap();
    /// assert!(matches!(filter.mode(), KernelMode::Single(_)));
    /// ```
    pub fn new(references: Vec<Kernel>) -> Result<Self, FilterError> {
        let count = references.len();
        let mut references = references.into_iter();
        let mode = match (count, references.next(), references.next()) {
            (0, _, _) => KernelMode::Identity(Kernel::identity(1)?),
            (1, Some(kernel), _) => KernelMode::Single(kernel),
            (2, Some(center), Some(outer)) => {
                KernelMode::Radial(RadialKernels::new(center, outer)?)
            }
            (3, Some(first), Some(second)) => {
                let mut kernels = vec![first, second];
                kernels.extend(references);
                KernelMode::Planar(PlanarKernels::new(kernels)?)
            }
            _ => return Err(FilterError::UnsupportedKernelCount(count)),
        };

        log::debug!("multi kernel filter with {count} references");

        Ok(Self { mode })
    }

    /// The selected mode.
    pub fn mode(&self) -> &KernelMode {
        &self.mode
    }

    /// The kernel for the pixel at `point`.
    pub fn kernel_at(&self, point: Point) -> KernelSelection<'_> {
        match &self.mode {
            KernelMode::Identity(kernel) | KernelMode::Single(kernel) => {
                KernelSelection::Borrowed(kernel)
            }
            KernelMode::Radial(radial) => KernelSelection::Borrowed(radial.select(point)),
            KernelMode::Planar(planar) => KernelSelection::Owned(planar.kernel_at(point)),
        }
    }

    /// Apply the filter to an RGBA image.
    pub fn apply(
        &self,
        src: &Rgba8Image,
        dst: &mut Rgba8Image,
        strategy: ExecutionStrategy,
    ) -> Result<(), FilterError> {
        match &self.mode {
            KernelMode::Identity(kernel) | KernelMode::Single(kernel) => {
                convolve(src, dst, kernel, strategy)
            }
            KernelMode::Radial(radial) => {
                log::debug!(
                    "radial convolution on {} with radius {}",
                    src.size(),
                    radial.radius()
                );
                convolve_with(src, dst, radial.half(), strategy, |x, y| {
                    KernelSelection::Borrowed(radial.select(Point::new(x as f32, y as f32)))
                })
            }
            KernelMode::Planar(planar) => convolve_planar(src, dst, planar, strategy),
        }
    }
}

/// A filter selected by [`FilterKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Convolution with zero to three reference kernels.
    Convolution(MultiKernelFilter),
    /// Distance dependent blur.
    Bokeh(AdaptiveKernel),
    /// Plane of focus.
    Scheimpflug(PlanarKernels),
}

impl Filter {
    /// Build a filter of the given kind from kernels made by the factory.
    ///
    /// # Errors
    ///
    /// * A bokeh filter takes exactly one adaptive kernel.
    /// * Convolution and Scheimpflug filters take uniform kernels only; Scheimpflug
    ///   needs exactly three.
    pub fn new(kind: FilterKind, kernels: Vec<FilterKernel>) -> Result<Self, FilterError> {
        match kind {
            FilterKind::Convolution => {
                let kernels = uniform_kernels(kind, kernels)?;
                Ok(Filter::Convolution(MultiKernelFilter::new(kernels)?))
            }
            FilterKind::Scheimpflug => {
                let kernels = uniform_kernels(kind, kernels)?;
                Ok(Filter::Scheimpflug(PlanarKernels::new(kernels)?))
            }
            FilterKind::Bokeh => {
                if kernels.len() != 1 {
                    return Err(FilterError::UnsupportedKernelCount(kernels.len()));
                }
                match kernels.into_iter().next() {
                    Some(FilterKernel::Adaptive(kernel)) => Ok(Filter::Bokeh(kernel)),
                    _ => Err(FilterError::UnsupportedKernelType(format!(
                        "uniform kernel in a {kind} filter"
                    ))),
                }
            }
        }
    }

    /// The kind of the filter.
    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::Convolution(_) => FilterKind::Convolution,
            Filter::Bokeh(_) => FilterKind::Bokeh,
            Filter::Scheimpflug(_) => FilterKind::Scheimpflug,
        }
    }

    /// Apply the filter to an RGBA image.
    ///
    /// # Arguments
    ///
    /// * `src` - The source image.
    /// * `dst` - The destination image, same size as `src`. Border pixels are left
    ///   untouched.
    /// * `strategy` - The execution strategy.
    pub fn apply(
        &self,
        src: &Rgba8Image,
        dst: &mut Rgba8Image,
        strategy: ExecutionStrategy,
    ) -> Result<(), FilterError> {
        match self {
            Filter::Convolution(filter) => filter.apply(src, dst, strategy),
            Filter::Bokeh(kernel) => convolve_adaptive(src, dst, kernel, strategy),
            Filter::Scheimpflug(planar) => convolve_planar(src, dst, planar, strategy),
        }
    }
}

fn uniform_kernels(
    kind: FilterKind,
    kernels: Vec<FilterKernel>,
) -> Result<Vec<Kernel>, FilterError> {
    kernels
        .into_iter()
        .map(|kernel| match kernel {
            FilterKernel::Uniform(kernel) => Ok(kernel),
            FilterKernel::Adaptive(_) => Err(FilterError::UnsupportedKernelType(format!(
                "adaptive kernel in a {kind} filter"
            ))),
        })
        .collect()
}
