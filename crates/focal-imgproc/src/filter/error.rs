use focal_image::{ImageError, ImageSize};

use crate::parallel::ParallelError;

/// An error type for the filter module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The kernel type has no construction rule.
    #[error("Unsupported kernel type: {0}")]
    UnsupportedKernelType(String),

    /// The filter type is not known.
    #[error("Unsupported filter type: {0}")]
    UnsupportedFilterType(String),

    /// The number of reference kernels is not handled by the filter.
    #[error("Unsupported number of kernels: {0}")]
    UnsupportedKernelCount(usize),

    /// The kernel width is even, zero, or does not match the weights.
    #[error("Invalid kernel width: {0}, it must be odd and >= 1")]
    InvalidKernelWidth(usize),

    /// The weights do not form a square matrix.
    #[error("Kernel weights of length {0} do not form a square matrix")]
    NonSquareKernel(usize),

    /// The kernel divider is zero or not finite.
    #[error("Invalid kernel divider: {0}")]
    InvalidDivider(f32),

    /// A reference kernel needs a position to take part in the filter.
    #[error("Reference kernel #{0} has no position")]
    MissingKernelPosition(usize),

    /// The reference positions do not span a plane.
    #[error("Reference kernel positions are collinear and do not define a plane")]
    DegenerateGeometry,

    /// Source and destination images differ in size.
    #[error("Source size {0} does not match destination size {1}")]
    ImageSizeMismatch(ImageSize, ImageSize),

    /// Error from the parallel execution layer.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// Error from the image module.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The filter configuration could not be read or parsed.
    #[error("Invalid filter configuration: {0}")]
    Config(String),
}
