use argh::FromArgs;
use std::path::PathBuf;

use focal::{
    image::Rgba8Image,
    imgproc::{
        filter::{FilterConfig, FilterKind, KernelConfig, KernelKind},
        parallel::ExecutionStrategy,
    },
    io::functional as F,
};

#[derive(FromArgs)]
/// Apply a convolution, bokeh or plane of focus filter to an image
struct Args {
    /// path to an input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// path to the output png image
    #[argh(option, short = 'o')]
    output_path: PathBuf,

    /// the filter to apply, any case: convolution, bokeh, scheimpflug (default: bokeh)
    #[argh(option, default = "String::from(\"bokeh\")")]
    filter: String,

    /// the kernel type, any case: identity, rect, sharpen, laplacian, bokeh (default: bokeh)
    #[argh(option, short = 'k', default = "String::from(\"bokeh\")")]
    kernel: String,

    /// the kernel width (default: 9)
    #[argh(option, short = 'w', default = "9")]
    width: usize,

    /// column of the kernel position, defaults to the image center
    #[argh(option)]
    x: Option<f32>,

    /// row of the kernel position, defaults to the image center
    #[argh(option)]
    y: Option<f32>,

    /// a JSON filter configuration, replaces the filter and kernel options
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// run on the current thread only
    #[argh(switch)]
    serial: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let src = F::read_image_rgba8(&args.image_path)?;
    log::info!(
        "loaded {} with size {}",
        args.image_path.display(),
        src.size()
    );

    let mut config = match &args.config {
        Some(path) => FilterConfig::from_json_file(path)?,
        None => FilterConfig {
            filter: args.filter.parse::<FilterKind>()?,
            kernels: vec![KernelConfig {
                kind: args.kernel.parse::<KernelKind>()?,
                width: args.width,
                position: Some([
                    args.x.unwrap_or(src.width() as f32 / 2.0),
                    args.y.unwrap_or(src.height() as f32 / 2.0),
                ]),
                weights: None,
                divider: None,
            }],
            strategy: ExecutionStrategy::default(),
        },
    };
    if args.serial {
        config.strategy = ExecutionStrategy::Serial;
    }

    let filter = config.build()?;

    // border pixels keep the source values
    let mut dst: Rgba8Image = src.clone();
    let start = std::time::Instant::now();
    filter.apply(&src, &mut dst, config.strategy)?;
    log::info!("applied {} filter in {:?}", filter.kind(), start.elapsed());

    F::write_image_png_rgba8(&args.output_path, &dst)?;
    log::info!("wrote {}", args.output_path.display());

    Ok(())
}
