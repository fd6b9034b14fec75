use super::{ImageOwned1, ImageRef};

/// Side length of a preprocessed frame.
pub const FRAME_SIZE: u32 = 84;

/// A preprocessed observation: one `84 x 84` luma plane.
///
/// The plane is kept as bytes; [`Frame::to_tensor`] yields the
/// `[1, 84, 84]` tensor scaled to `[0, 1]`, which is exact since the scaling
/// is a division by 255.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame(ImageOwned1);

impl Frame {
    pub const SHAPE: [usize; 3] = [1, FRAME_SIZE as usize, FRAME_SIZE as usize];
    pub const LEN: usize = (FRAME_SIZE * FRAME_SIZE) as usize;

    pub fn pixels(&self) -> &[u8] {
        self.0.data()
    }
    pub fn to_tensor(&self) -> Vec<f32> {
        let mut values = Vec::with_capacity(Self::LEN);
        self.extend_tensor(&mut values);
        values
    }
    pub fn extend_tensor(&self, values: &mut Vec<f32>) {
        values.extend(self.pixels().iter().map(|&p| f32::from(p) / 255.0));
    }
}

impl TryFrom<ImageOwned1> for Frame {
    type Error = ImageOwned1;
    fn try_from(image: ImageOwned1) -> Result<Self, Self::Error> {
        if image.width() == FRAME_SIZE && image.height() == FRAME_SIZE {
            Ok(Self(image))
        } else {
            Err(image)
        }
    }
}
