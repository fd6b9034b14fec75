use super::{ImageError, ImageOwned, ImageOwned1, ImageRef, Luma};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Color3(pub u8, pub u8, pub u8);

impl Color3 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }
    // ITU-R 601-2 luma transform, in the fixed-point form used by common
    // imaging libraries so that results are reproducible bit for bit
    pub fn luma(self) -> Luma {
        let weighted =
            u32::from(self.0) * 19595 + u32::from(self.1) * 38470 + u32::from(self.2) * 7471;
        Luma(((weighted + 0x8000) >> 16) as u8)
    }
}

fn check_dims(width: u32, height: u32, data_len: usize) -> Result<(), ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::EmptyImage { width, height });
    }
    let expected = 3 * width as usize * height as usize;
    if data_len != expected {
        return Err(ImageError::MalformedFrame {
            width,
            height,
            expected,
            actual: data_len,
        });
    }
    Ok(())
}

/// Borrowed `height x width x 3` row-major RGB bytes.
#[derive(Clone, Copy, Debug)]
pub struct ImageRef3<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl ImageRef3<'_> {
    pub fn new(width: u32, height: u32, data: &[u8]) -> Result<ImageRef3, ImageError> {
        check_dims(width, height, data.len())?;
        Ok(ImageRef3 {
            width,
            height,
            data,
        })
    }
    pub fn data(&self) -> &[u8] {
        self.data
    }
    pub fn to_grayscale(&self) -> ImageOwned1 {
        self.map_to(Color3::luma)
    }
}

impl ImageRef for ImageRef3<'_> {
    type Owned = ImageOwned3;
    type Color = Color3;
    fn get_pixel_color(&self, x: u32, y: u32) -> Self::Color {
        let pixel = (3 * (x + y * self.width)) as usize;
        Self::Color::new(self.data[pixel], self.data[pixel + 1], self.data[pixel + 2])
    }
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
}

/// An owned RGB frame, as produced by an environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageOwned3 {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageOwned3 {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        check_dims(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }
    pub fn filled(width: u32, height: u32, color: Color3) -> Self {
        let mut image = Self::zeroed(width, height);
        image.fill_rect(0, 0, width, height, color);
        image
    }
    /// Fills the rectangle `[x0, x1) x [y0, y1)`, clipped to the image bounds.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Color3) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_pixel_color(x, y, color);
            }
        }
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl ImageRef for ImageOwned3 {
    type Owned = Self;
    type Color = Color3;
    fn get_pixel_color(&self, x: u32, y: u32) -> Self::Color {
        self.as_ref().get_pixel_color(x, y)
    }
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
}

impl ImageOwned for ImageOwned3 {
    type Ref<'a> = ImageRef3<'a>;
    fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (3 * width * height) as usize],
        }
    }
    fn as_ref(&self) -> Self::Ref<'_> {
        ImageRef3 {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
    fn set_pixel_color(&mut self, x: u32, y: u32, color: Self::Color) {
        let pixel = (3 * (x + y * self.width)) as usize;
        self.data[pixel] = color.0;
        self.data[pixel + 1] = color.1;
        self.data[pixel + 2] = color.2;
    }
}
