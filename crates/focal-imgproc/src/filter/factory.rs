use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{AdaptiveKernel, FilterError, Kernel, Point};

/// The kernel types a user can select.
///
/// Names are matched ignoring case, both when parsed and when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum KernelKind {
    /// A single 1 at the center.
    Identity,
    /// Box blur, all ones, also named `blur`.
    Rect,
    /// 3x3 sharpening kernel.
    Sharpen,
    /// 3x3 eight-connectivity laplacian.
    Laplacian,
    /// Distance dependent blur around a focus point.
    Bokeh,
    /// Horizontal sobel derivative, reserved.
    SobelX,
    /// Vertical sobel derivative, reserved.
    SobelY,
    /// Gaussian blur, reserved.
    Gaussian,
    /// User supplied weights.
    Custom,
}

impl KernelKind {
    /// The name used on the command line and in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            KernelKind::Identity => "identity",
            KernelKind::Rect => "rect",
            KernelKind::Sharpen => "sharpen",
            KernelKind::Laplacian => "laplacian",
            KernelKind::Bokeh => "bokeh",
            KernelKind::SobelX => "sobel_x",
            KernelKind::SobelY => "sobel_y",
            KernelKind::Gaussian => "gaussian",
            KernelKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for KernelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_lowercase().as_str() {
            "identity" => KernelKind::Identity,
            "rect" | "blur" => KernelKind::Rect,
            "sharpen" => KernelKind::Sharpen,
            "laplacian" => KernelKind::Laplacian,
            "bokeh" => KernelKind::Bokeh,
            "sobel_x" => KernelKind::SobelX,
            "sobel_y" => KernelKind::SobelY,
            "gaussian" => KernelKind::Gaussian,
            "custom" => KernelKind::Custom,
            _ => return Err(FilterError::UnsupportedKernelType(s.to_string())),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for KernelKind {
    type Error = FilterError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The filter types a user can select, matched ignoring case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum FilterKind {
    /// Plain convolution with zero to three reference kernels.
    Convolution,
    /// Distance dependent blur with one adaptive kernel.
    Bokeh,
    /// Plane of focus blending of three reference kernels.
    Scheimpflug,
}

impl FilterKind {
    /// The name used on the command line and in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Convolution => "convolution",
            FilterKind::Bokeh => "bokeh",
            FilterKind::Scheimpflug => "scheimpflug",
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "convolution" => Ok(FilterKind::Convolution),
            "bokeh" => Ok(FilterKind::Bokeh),
            "scheimpflug" => Ok(FilterKind::Scheimpflug),
            _ => Err(FilterError::UnsupportedFilterType(s.to_string())),
        }
    }
}

impl TryFrom<String> for FilterKind {
    type Error = FilterError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A kernel produced by [`create_kernel`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKernel {
    /// The same kernel is used for every pixel.
    Uniform(Kernel),
    /// The kernel is picked per pixel from a cached sequence.
    Adaptive(AdaptiveKernel),
}

impl FilterKernel {
    /// The widest kernel that can be applied to a pixel.
    pub fn width(&self) -> usize {
        match self {
            FilterKernel::Uniform(kernel) => kernel.width(),
            FilterKernel::Adaptive(kernel) => kernel.width(),
        }
    }
}

#[rustfmt::skip]
const SHARPEN_3X3: [f32; 9] = [
    -1.0, -1.0, -1.0,
    -1.0,  9.0, -1.0,
    -1.0, -1.0, -1.0,
];

#[rustfmt::skip]
const LAPLACIAN_3X3: [f32; 9] = [
    -1.0, -1.0, -1.0,
    -1.0,  8.0, -1.0,
    -1.0, -1.0, -1.0,
];

/// Create a kernel of the given type.
///
/// # Arguments
///
/// * `kind` - The kernel type.
/// * `width` - The kernel width, ignored by the fixed 3x3 kernels.
/// * `position` - Optional position in image space. Bokeh kernels default to the origin.
///
/// # Errors
///
/// Reserved types (sobel, gaussian) and `Custom`, which needs explicit weights, are
/// reported as [`FilterError::UnsupportedKernelType`].
///
/// # Example
///
/// ```
/// use focal_imgproc::filter::{create_kernel, FilterKernel, KernelKind};
///
/// let FilterKernel::Uniform(kernel) = create_kernel(KernelKind::Rect, 5, None).unwrap() else {
///     panic!("rect kernels are uniform");
/// };
/// assert_eq!(kernel.divider(), 25.0);
/// ```
pub fn create_kernel(
    kind: KernelKind,
    width: usize,
    position: Option<Point>,
) -> Result<FilterKernel, FilterError> {
    let kernel = match kind {
        KernelKind::Identity => Kernel::identity(width)?,
        KernelKind::Rect => Kernel::rect(width)?,
        KernelKind::Sharpen => Kernel::new(SHARPEN_3X3.to_vec(), 1.0)?,
        KernelKind::Laplacian => Kernel::new(LAPLACIAN_3X3.to_vec(), 1.0)?,
        KernelKind::Bokeh => {
            let kernel = AdaptiveKernel::bokeh(width, position.unwrap_or_default())?;
            return Ok(FilterKernel::Adaptive(kernel));
        }
        KernelKind::SobelX | KernelKind::SobelY | KernelKind::Gaussian | KernelKind::Custom => {
            return Err(FilterError::UnsupportedKernelType(kind.to_string()));
        }
    };

    Ok(FilterKernel::Uniform(match position {
        Some(position) => kernel.with_position(position),
        None => kernel,
    }))
}
