use std::borrow::Cow;

use focal_image::Rgba8Image;

use super::{FilterError, Kernel};
use crate::parallel::{self, ExecutionStrategy};

/// The kernel chosen for one pixel.
///
/// Borrowed when it comes from an immutable kernel or cache, owned when it was
/// computed for the pixel. A selection never mutates a shared kernel.
pub type KernelSelection<'a> = Cow<'a, Kernel>;

/// Number of interleaved channels of the images the filters operate on.
pub(crate) const CHANNELS: usize = 4;

/// Apply one kernel to every interior pixel of an RGBA image.
///
/// A pixel is interior when the full kernel window lies inside the image. Border
/// pixels of `dst` are left untouched. The red, green and blue channels are the
/// weighted sum divided by the kernel divider, rounded and clamped to `[0, 255]`;
/// alpha is set to 255.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, same size as `src`.
/// * `kernel` - The kernel to apply.
/// * `strategy` - The execution strategy.
///
/// # Example
///
/// ```
/// use focal_image::Rgba8Image;
/// use focal_imgproc::{filter::{convolve, Kernel}, parallel::ExecutionStrategy};
///
/// let src = Rgba8Image::from_size_pixel([4, 4].into(), [50, 60, 70, 255]).unwrap();
/// let mut dst = Rgba8Image::from_size_val([4, 4].into(), 0).unwrap();
///
/// convolve(&src, &mut dst, &Kernel::rect(3).unwrap(), ExecutionStrategy::Serial).unwrap();
/// assert_eq!(dst.get_pixel(1, 2).unwrap(), [50, 60, 70, 255]);
/// assert_eq!(dst.get_pixel(0, 0).unwrap(), [0, 0, 0, 0]);
/// ```
pub fn convolve(
    src: &Rgba8Image,
    dst: &mut Rgba8Image,
    kernel: &Kernel,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    log::debug!(
        "convolution on {} with a {}x{} kernel",
        src.size(),
        kernel.width(),
        kernel.width()
    );
    convolve_with(src, dst, kernel.half(), strategy, |_, _| {
        KernelSelection::Borrowed(kernel)
    })
}

/// Convolve every interior pixel with a kernel chosen per pixel.
///
/// `select` is called with the column and row of each pixel that lies at least
/// `border` pixels away from every image edge. The selected kernel must fit in that
/// border; a pixel whose window would leave the image is skipped.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, same size as `src`.
/// * `border` - The number of rows and columns on each side that are left untouched.
/// * `strategy` - The execution strategy.
/// * `select` - Returns the kernel for a pixel.
pub fn convolve_with<'k, F>(
    src: &Rgba8Image,
    dst: &mut Rgba8Image,
    border: usize,
    strategy: ExecutionStrategy,
    select: F,
) -> Result<(), FilterError>
where
    F: Fn(usize, usize) -> KernelSelection<'k> + Send + Sync,
{
    check_sizes(src, dst)?;

    let (cols, rows) = (src.cols(), src.rows());
    let stride = cols * CHANNELS;

    parallel::for_each_row(dst.as_slice_mut(), stride, strategy, |y, row| {
        if y < border || y + border >= rows {
            return;
        }
        for x in border..cols.saturating_sub(border) {
            filter_pixel(src, x, y, &select(x, y), row);
        }
    })?;

    Ok(())
}

pub(crate) fn check_sizes(src: &Rgba8Image, dst: &Rgba8Image) -> Result<(), FilterError> {
    if src.size() != dst.size() {
        return Err(FilterError::ImageSizeMismatch(src.size(), dst.size()));
    }
    Ok(())
}

/// Filter the pixel at column `x` and row `y` of `src` into `dst_row`.
///
/// Pixels whose kernel window leaves the image are skipped.
pub(crate) fn filter_pixel(
    src: &Rgba8Image,
    x: usize,
    y: usize,
    kernel: &Kernel,
    dst_row: &mut [u8],
) {
    let (cols, rows) = (src.cols(), src.rows());
    let half = kernel.half();
    if x < half || y < half || x + half >= cols || y + half >= rows {
        return;
    }

    let src_data = src.as_slice();
    let mut sum = [0f32; 3];
    for ky in 0..kernel.width() {
        let src_row = (y - half + ky) * cols;
        for kx in 0..kernel.width() {
            let weight = kernel.at(kx, ky);
            if weight == 0.0 {
                continue;
            }
            let offset = (src_row + x - half + kx) * CHANNELS;
            for (acc, &val) in sum.iter_mut().zip(&src_data[offset..offset + 3]) {
                *acc += weight * val as f32;
            }
        }
    }

    let dst_pixel = &mut dst_row[x * CHANNELS..(x + 1) * CHANNELS];
    for (out, acc) in dst_pixel.iter_mut().zip(sum) {
        *out = (acc / kernel.divider()).round().clamp(0.0, 255.0) as u8;
    }
    dst_pixel[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{create_kernel, FilterKernel, KernelKind};
    use focal_image::ImageSize;

    fn ramp(size: ImageSize) -> Result<Rgba8Image, FilterError> {
        let data = (0..size.width * size.height)
            .flat_map(|i| [i as u8, (2 * i) as u8, 100, 30])
            .collect();
        Ok(Rgba8Image::new(size, data)?)
    }

    fn uniform(kind: KernelKind) -> Result<Kernel, FilterError> {
        match create_kernel(kind, 3, None)? {
            FilterKernel::Uniform(kernel) => Ok(kernel),
            FilterKernel::Adaptive(_) => panic!("expected a uniform kernel"),
        }
    }

    #[test]
    fn test_identity_preserves_interior() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 6,
            height: 5,
        };
        let src = ramp(size)?;
        let mut dst = Rgba8Image::from_size_val(size, 0)?;
        let kernel = Kernel::identity(3)?;

        convolve(&src, &mut dst, &kernel, ExecutionStrategy::Serial)?;

        for y in 1..4 {
            for x in 1..5 {
                let [r, g, b, _] = src.get_pixel(x, y)?;
                assert_eq!(dst.get_pixel(x, y)?, [r, g, b, 255]);
            }
        }
        assert_eq!(dst.get_pixel(0, 0)?, [0, 0, 0, 0]);
        assert_eq!(dst.get_pixel(5, 4)?, [0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_box_blur_values() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let src = ramp(size)?;
        let mut dst = Rgba8Image::from_size_val(size, 7)?;

        convolve(&src, &mut dst, &Kernel::rect(3)?, ExecutionStrategy::Serial)?;

        // mean of the 3x3 ramp neighbourhood is the center value
        #[rustfmt::skip]
        assert_eq!(
            dst.as_slice(),
            &[
                7, 7, 7, 7,   7, 7, 7, 7,     7, 7, 7, 7,     7, 7, 7, 7,
                7, 7, 7, 7,   5, 10, 100, 255, 6, 12, 100, 255, 7, 7, 7, 7,
                7, 7, 7, 7,   7, 7, 7, 7,     7, 7, 7, 7,     7, 7, 7, 7,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_laplacian_flat_gray() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 5,
            height: 5,
        };
        let src = Rgba8Image::from_size_pixel(size, [100, 100, 100, 255])?;
        let mut dst = Rgba8Image::from_size_pixel(size, [100, 100, 100, 255])?;
        let kernel = uniform(KernelKind::Laplacian)?;

        convolve(&src, &mut dst, &kernel, ExecutionStrategy::Serial)?;

        // 8 * 100 - 8 * 100 = 0 in the interior, the border keeps its gray
        for y in 0..5 {
            for x in 0..5 {
                let expected = if (1..4).contains(&x) && (1..4).contains(&y) {
                    [0, 0, 0, 255]
                } else {
                    [100, 100, 100, 255]
                };
                assert_eq!(dst.get_pixel(x, y)?, expected, "pixel ({x}, {y})");
            }
        }
        Ok(())
    }

    #[test]
    fn test_sharpen_clamps() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 3,
            height: 3,
        };
        let mut src = Rgba8Image::from_size_pixel(size, [100, 100, 100, 255])?;
        src.set_pixel(1, 1, [200, 50, 100, 255])?;
        let mut dst = Rgba8Image::from_size_val(size, 0)?;
        let kernel = uniform(KernelKind::Sharpen)?;

        convolve(&src, &mut dst, &kernel, ExecutionStrategy::Serial)?;

        // 9 * 200 - 800 = 1000 -> 255, 9 * 50 - 800 = -350 -> 0, 900 - 800 = 100
        assert_eq!(dst.get_pixel(1, 1)?, [255, 0, 100, 255]);
        Ok(())
    }

    #[test]
    fn test_kernel_larger_than_image() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        let src = ramp(size)?;
        let mut dst = Rgba8Image::from_size_val(size, 9)?;

        convolve(&src, &mut dst, &Kernel::rect(5)?, ExecutionStrategy::Serial)?;
        assert!(dst.as_slice().iter().all(|&v| v == 9));
        Ok(())
    }

    #[test]
    fn test_size_mismatch() -> Result<(), FilterError> {
        let src = Rgba8Image::from_size_val([4, 4].into(), 0)?;
        let mut dst = Rgba8Image::from_size_val([4, 3].into(), 0)?;
        let res = convolve(&src, &mut dst, &Kernel::rect(3)?, ExecutionStrategy::Serial);
        assert_eq!(
            res,
            Err(FilterError::ImageSizeMismatch(src.size(), dst.size()))
        );
        Ok(())
    }

    #[test]
    fn test_strategies_agree() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 17,
            height: 11,
        };
        let src = ramp(size)?;
        let kernel = Kernel::rect(5)?;

        let mut serial = Rgba8Image::from_size_val(size, 0)?;
        convolve(&src, &mut serial, &kernel, ExecutionStrategy::Serial)?;

        for strategy in [ExecutionStrategy::ParallelRows, ExecutionStrategy::Fixed(3)] {
            let mut dst = Rgba8Image::from_size_val(size, 0)?;
            convolve(&src, &mut dst, &kernel, strategy)?;
            assert_eq!(dst, serial, "{strategy:?}");
        }
        Ok(())
    }
}
