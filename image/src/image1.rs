use super::{ImageOwned, ImageRef};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Luma(pub u8);

pub struct ImageRef1<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl ImageRef1<'_> {
    pub fn data(&self) -> &[u8] {
        self.data
    }
    /// Resamples to `new_width x new_height` by averaging every source pixel
    /// that the destination pixel covers, weighted by the covered area.
    ///
    /// For integer factors this reduces to a plain block average; fractional
    /// factors and upscaling are handled by the same coverage weights.
    pub fn resize_by_area_average(&self, new_width: u32, new_height: u32) -> ImageOwned1 {
        assert!(
            new_width > 0 && new_height > 0,
            "attempted to resize to an empty image"
        );
        let x_weights = coverage_weights(self.width, new_width);
        let y_weights = coverage_weights(self.height, new_height);
        let mut resized = ImageOwned1::zeroed(new_width, new_height);
        for (y, row_weights) in y_weights.iter().enumerate() {
            for (x, column_weights) in x_weights.iter().enumerate() {
                let mut sum = 0.0;
                let mut area = 0.0;
                for &(src_y, wy) in row_weights {
                    for &(src_x, wx) in column_weights {
                        let Luma(value) = self.get_pixel_color(src_x, src_y);
                        sum += f64::from(value) * wx * wy;
                        area += wx * wy;
                    }
                }
                let average = (sum / area).round().clamp(0.0, 255.0) as u8;
                resized.set_pixel_color(x as u32, y as u32, Luma(average));
            }
        }
        resized
    }
}

// for every destination index, the source indices it overlaps and by how much
fn coverage_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(u32, f64)>> {
    let scale = f64::from(src_len) / f64::from(dst_len);
    (0..dst_len)
        .map(|dst| {
            let start = f64::from(dst) * scale;
            let end = f64::from(dst + 1) * scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_len);
            (first..last)
                .filter_map(|src| {
                    let overlap = end.min(f64::from(src + 1)) - start.max(f64::from(src));
                    (overlap > 1e-9).then_some((src, overlap))
                })
                .collect()
        })
        .collect()
}

impl ImageRef for ImageRef1<'_> {
    type Owned = ImageOwned1;
    type Color = Luma;
    fn get_pixel_color(&self, x: u32, y: u32) -> Self::Color {
        Luma(self.data[(x + y * self.width) as usize])
    }
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
}

/// A single-channel 8-bit image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageOwned1 {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageOwned1 {
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl ImageRef for ImageOwned1 {
    type Owned = Self;
    type Color = Luma;
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

impl ImageOwned for ImageOwned1 {
    type Ref<'a> = ImageRef1<'a>;
    fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height) as usize],
        }
    }
    fn as_ref(&self) -> Self::Ref<'_> {
        ImageRef1 {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
    fn set_pixel_color(&mut self, x: u32, y: u32, color: Self::Color) {
        self.data[(x + y * self.width) as usize] = color.0;
    }
}
