use focal_image::{ImageSize, Rgba8Image};
use focal_imgproc::filter::{
    create_kernel, AdaptiveKernel, Filter, FilterConfig, FilterError, FilterKernel, FilterKind,
    Kernel, KernelKind, KernelMode, MultiKernelFilter, Point,
};
use focal_imgproc::parallel::ExecutionStrategy;
use rand::Rng;

fn random_image(size: ImageSize) -> Rgba8Image {
    let mut rng = rand::rng();
    let data = (0..size.width * size.height * 4)
        .map(|_| rng.random::<u8>())
        .collect();
    Rgba8Image::new(size, data).unwrap()
}

fn interior(size: ImageSize, half: usize) -> Vec<(usize, usize)> {
    let mut pixels = Vec::new();
    for y in half..size.height - half {
        for x in half..size.width - half {
            pixels.push((x, y));
        }
    }
    pixels
}

#[test]
fn identity_preserves_random_images() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 31,
        height: 17,
    };
    for width in [1, 3, 5] {
        let src = random_image(size);
        let mut dst = Rgba8Image::from_size_val(size, 0)?;
        let kernel = create_kernel(KernelKind::Identity, width, None)?;
        assert!(matches!(kernel, FilterKernel::Uniform(_)));

        let filter = Filter::new(FilterKind::Convolution, vec![kernel])?;
        filter.apply(&src, &mut dst, ExecutionStrategy::ParallelRows)?;

        for (x, y) in interior(size, width / 2) {
            let [r, g, b, _] = src.get_pixel(x, y)?;
            assert_eq!(dst.get_pixel(x, y)?, [r, g, b, 255], "pixel ({x}, {y})");
        }
    }
    Ok(())
}

#[test]
fn blur_keeps_uniform_color() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 9,
        height: 8,
    };
    let color = [37, 142, 250, 255];
    let src = Rgba8Image::from_size_pixel(size, color)?;

    for width in [3, 5, 7] {
        let mut dst = Rgba8Image::from_size_val(size, 0)?;
        let filter = MultiKernelFilter::new(vec![Kernel::rect(width)?])?;
        filter.apply(&src, &mut dst, ExecutionStrategy::Serial)?;
        for (x, y) in interior(size, width / 2) {
            assert_eq!(dst.get_pixel(x, y)?, color);
        }
    }
    Ok(())
}

#[test]
fn bokeh_keeps_uniform_color() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 24,
        height: 16,
    };
    let color = [200, 10, 90, 255];
    let src = Rgba8Image::from_size_pixel(size, color)?;
    let mut dst = Rgba8Image::from_size_val(size, 0)?;

    let config = FilterConfig::from_json_str(
        r#"{
            "filter": "bokeh",
            "kernels": [{ "kind": "bokeh", "width": 5, "position": [12, 8] }]
        }"#,
    )?;
    let filter = config.build()?;
    filter.apply(&src, &mut dst, config.strategy)?;

    for (x, y) in interior(size, 2) {
        assert_eq!(dst.get_pixel(x, y)?, color);
    }
    assert_eq!(dst.get_pixel(1, 1)?, [0, 0, 0, 0]);
    Ok(())
}

#[test]
fn bokeh_blurs_more_with_distance() -> Result<(), Box<dyn std::error::Error>> {
    // a checkerboard: the sharper the kernel, the larger the deviation from the mean
    let size = ImageSize {
        width: 41,
        height: 41,
    };
    let mut src = Rgba8Image::from_size_val(size, 255)?;
    for (x, y) in interior(size, 0) {
        let v = if (x + y) % 2 == 0 { 0 } else { 200 };
        src.set_pixel(x, y, [v, v, v, 255])?;
    }

    let kernel = AdaptiveKernel::bokeh(9, Point::new(20.0, 20.0))?;
    let mut dst = Rgba8Image::from_size_val(size, 0)?;
    let filter = Filter::Bokeh(kernel);
    filter.apply(&src, &mut dst, ExecutionStrategy::Fixed(2))?;

    let contrast = |x: usize, y: usize| -> Result<i32, focal_image::ImageError> {
        Ok((dst.get_pixel(x, y)?[0] as i32 - 100).abs())
    };
    assert_eq!(contrast(20, 20)?, 100);
    assert!(contrast(30, 20)? < contrast(20, 20)?);
    assert!(contrast(36, 36)? <= contrast(30, 20)?);
    Ok(())
}

#[test]
fn dispatcher_routes_by_count() -> Result<(), FilterError> {
    let refs = [
        Kernel::rect(1)?.with_position(Point::new(0.0, 0.0)),
        Kernel::rect(3)?.with_position(Point::new(8.0, 0.0)),
        Kernel::rect(5)?.with_position(Point::new(0.0, 8.0)),
        Kernel::rect(3)?.with_position(Point::new(8.0, 8.0)),
    ];

    let mode = |n: usize| -> Result<KernelMode, FilterError> {
        Ok(MultiKernelFilter::new(refs[..n].to_vec())?.mode().clone())
    };
    let modes = (0..=4).map(mode).collect::<Vec<_>>();

    assert!(matches!(modes[0], Ok(KernelMode::Identity(_))));
    assert!(matches!(modes[1], Ok(KernelMode::Single(_))));
    assert!(matches!(modes[2], Ok(KernelMode::Radial(_))));
    assert!(matches!(modes[3], Ok(KernelMode::Planar(_))));
    assert_eq!(modes[4], Err(FilterError::UnsupportedKernelCount(4)));
    Ok(())
}

#[test]
fn laplacian_on_flat_gray() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 5,
        height: 5,
    };
    let src = Rgba8Image::from_size_pixel(size, [100, 100, 100, 255])?;
    let mut dst = Rgba8Image::from_size_val(size, 0)?;

    let config = FilterConfig::from_json_str(
        r#"{ "filter": "convolution", "kernels": [{ "kind": "laplacian" }] }"#,
    )?;
    let filter = config.build()?;
    filter.apply(&src, &mut dst, ExecutionStrategy::Serial)?;

    #[rustfmt::skip]
    let expected: Vec<u8> = [
        [0, 0, 0, 0], [0, 0, 0, 0],     [0, 0, 0, 0],     [0, 0, 0, 0],     [0, 0, 0, 0],
        [0, 0, 0, 0], [0, 0, 0, 255],   [0, 0, 0, 255],   [0, 0, 0, 255],   [0, 0, 0, 0],
        [0, 0, 0, 0], [0, 0, 0, 255],   [0, 0, 0, 255],   [0, 0, 0, 255],   [0, 0, 0, 0],
        [0, 0, 0, 0], [0, 0, 0, 255],   [0, 0, 0, 255],   [0, 0, 0, 255],   [0, 0, 0, 0],
        [0, 0, 0, 0], [0, 0, 0, 0],     [0, 0, 0, 0],     [0, 0, 0, 0],     [0, 0, 0, 0],
    ]
    .concat();
    assert_eq!(dst.as_slice(), expected.as_slice());
    Ok(())
}

#[test]
fn strategies_agree_on_planar() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 33,
        height: 21,
    };
    let src = random_image(size);
    let filter = Filter::new(
        FilterKind::Scheimpflug,
        vec![
            FilterKernel::Uniform(Kernel::identity(3)?.with_position(Point::new(0.0, 0.0))),
            FilterKernel::Uniform(Kernel::rect(3)?.with_position(Point::new(32.0, 0.0))),
            FilterKernel::Uniform(Kernel::rect(5)?.with_position(Point::new(16.0, 20.0))),
        ],
    )?;

    let mut serial = Rgba8Image::from_size_val(size, 0)?;
    filter.apply(&src, &mut serial, ExecutionStrategy::Serial)?;
    let mut parallel = Rgba8Image::from_size_val(size, 0)?;
    filter.apply(&src, &mut parallel, ExecutionStrategy::ParallelRows)?;

    assert_eq!(serial, parallel);
    Ok(())
}

#[test]
fn strategies_agree_on_bokeh_and_radial() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 29,
        height: 19,
    };
    let src = random_image(size);
    let radial = MultiKernelFilter::new(vec![
        Kernel::identity(1)?.with_position(Point::new(14.0, 9.0)),
        Kernel::rect(5)?.with_position(Point::new(20.0, 9.0)),
    ])?;
    let filters = [
        Filter::Bokeh(AdaptiveKernel::bokeh(7, Point::new(3.0, 4.0))?),
        Filter::Convolution(radial),
    ];

    for filter in &filters {
        let mut serial = Rgba8Image::from_size_val(size, 0)?;
        filter.apply(&src, &mut serial, ExecutionStrategy::Serial)?;

        for strategy in [ExecutionStrategy::ParallelRows, ExecutionStrategy::Fixed(3)] {
            let mut dst = Rgba8Image::from_size_val(size, 0)?;
            filter.apply(&src, &mut dst, strategy)?;
            assert_eq!(dst, serial, "{} {strategy:?}", filter.kind());
        }
    }
    Ok(())
}
