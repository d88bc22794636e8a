use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{create_kernel, Filter, FilterError, FilterKernel, FilterKind, Kernel, KernelKind};
use crate::parallel::ExecutionStrategy;

fn default_width() -> usize {
    3
}

/// Description of one kernel in a filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// The kernel type.
    pub kind: KernelKind,
    /// The kernel width.
    #[serde(default = "default_width")]
    pub width: usize,
    /// The position of the kernel in image space, `[x, y]`.
    #[serde(default)]
    pub position: Option<[f32; 2]>,
    /// Row-major weights of a custom kernel.
    #[serde(default)]
    pub weights: Option<Vec<f32>>,
    /// Divider of a custom kernel, defaults to the sum of the weights or 1 when that
    /// sum is zero.
    #[serde(default)]
    pub divider: Option<f32>,
}

impl KernelConfig {
    /// Create the kernel this entry describes.
    ///
    /// `weights` and `divider` are only accepted for custom kernels.
    pub fn build(&self) -> Result<FilterKernel, FilterError> {
        let position = self.position.map(Into::into);
        if self.kind != KernelKind::Custom {
            if self.weights.is_some() || self.divider.is_some() {
                return Err(FilterError::Config(format!(
                    "weights and divider are only valid for custom kernels, not {}",
                    self.kind
                )));
            }
            return create_kernel(self.kind, self.width, position);
        }

        let weights = self
            .weights
            .clone()
            .ok_or_else(|| FilterError::Config("custom kernel without weights".to_string()))?;
        let sum: f32 = weights.iter().sum();
        let divider = match self.divider {
            Some(divider) => divider,
            None if sum == 0.0 => 1.0,
            None => sum,
        };
        let kernel = Kernel::new(weights, divider)?;

        Ok(FilterKernel::Uniform(match position {
            Some(position) => kernel.with_position(position),
            None => kernel,
        }))
    }
}

/// A filter and its kernels, as read from a JSON file.
///
/// # Example
///
/// ```
/// use focal_imgproc::filter::{FilterConfig, FilterKind};
///
/// let config = FilterConfig::from_json_str(
///     r#"{
///         "filter": "bokeh",
///         "kernels": [{ "kind": "bokeh", "width": 7, "position": [32, 24] }]
///     }"#,
/// ).unwrap();
/// assert_eq!(config.filter, FilterKind::Bokeh);
///
/// let filter = config.build().unwrap();
/// assert_eq!(filter.kind(), FilterKind::Bokeh);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// The filter type.
    pub filter: FilterKind,
    /// The kernels of the filter, in reference order.
    #[serde(default)]
    pub kernels: Vec<KernelConfig>,
    /// How to schedule the work, defaults to parallel rows.
    #[serde(default)]
    pub strategy: ExecutionStrategy,
}

impl FilterConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, FilterError> {
        serde_json::from_str(json).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Read and parse a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FilterError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| FilterError::Config(format!("{}: {e}", path.display())))?;
        log::debug!("loaded filter configuration from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Build the filter described by the configuration.
    pub fn build(&self) -> Result<Filter, FilterError> {
        let kernels = self
            .kernels
            .iter()
            .map(KernelConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        Filter::new(self.filter, kernels)
    }
}
