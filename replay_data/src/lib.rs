mod action;
mod state;
mod transition;

pub use action::Action;
pub use image::Frame;
pub use state::{State, STACK_LEN};
pub use transition::Transition;

#[cfg(test)]
pub(crate) fn test_frame(value: u8) -> Frame {
    use image::{Color3, ImageOwned, ImageOwned3};
    let raw = ImageOwned3::filled(84, 84, Color3::new(value, value, value));
    image::preprocess(&raw.as_ref()).unwrap()
}
