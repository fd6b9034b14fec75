pub trait ImageRef {
    type Owned: ImageOwned<Color = Self::Color>;
    type Color: PartialEq + Copy;
    fn get_pixel_color(&self, x: u32, y: u32) -> Self::Color;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn map_to<O, F>(&self, f: F) -> O
    where
        O: ImageOwned,
        F: Fn(Self::Color) -> O::Color,
    {
        let mut mapped = O::zeroed(self.width(), self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                mapped.set_pixel_color(x, y, f(self.get_pixel_color(x, y)));
            }
        }
        mapped
    }
}

pub trait ImageOwned
where
    Self: ImageRef,
{
    type Ref<'a>: ImageRef
    where
        Self: 'a;
    fn zeroed(width: u32, height: u32) -> Self;
    fn set_pixel_color(&mut self, x: u32, y: u32, color: Self::Color);
    fn as_ref(&self) -> Self::Ref<'_>;
}
