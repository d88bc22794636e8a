#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use focal_image as image;

#[doc(inline)]
pub use focal_imgproc as imgproc;

#[doc(inline)]
pub use focal_io as io;
