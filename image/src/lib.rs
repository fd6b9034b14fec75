mod frame;
mod image1;
mod image3;
mod preprocess;
mod traits;

pub use frame::{Frame, FRAME_SIZE};
pub use image1::{ImageOwned1, ImageRef1, Luma};
pub use image3::{Color3, ImageOwned3, ImageRef3};
pub use preprocess::{preprocess, preprocess_raw};
pub use traits::{ImageOwned, ImageRef};

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("frame of {width}x{height} needs {expected} RGB bytes, got {actual}")]
    MalformedFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame of {width}x{height} has no pixels")]
    EmptyImage { width: u32, height: u32 },
}
