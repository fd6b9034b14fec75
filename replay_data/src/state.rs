use image::Frame;

/// Number of consecutive frames that make up a [`State`].
pub const STACK_LEN: usize = 4;

/// The `STACK_LEN` most recent preprocessed frames, oldest first.
///
/// Every state owns its frames outright; pushing a frame produces a new
/// state and never touches the frames held by earlier states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    frames: [Frame; STACK_LEN],
}

impl State {
    pub const SHAPE: [usize; 3] = [STACK_LEN, Frame::SHAPE[1], Frame::SHAPE[2]];
    pub const LEN: usize = STACK_LEN * Frame::LEN;

    /// The state at the start of a run: the same frame stacked `STACK_LEN` times.
    pub fn repeat(frame: Frame) -> Self {
        Self {
            frames: std::array::from_fn(|_| frame.clone()),
        }
    }
    /// Drops the oldest frame and appends `frame`.
    pub fn push(&self, frame: Frame) -> Self {
        let mut frames = self.frames.clone();
        frames.rotate_left(1);
        frames[STACK_LEN - 1] = frame;
        Self { frames }
    }
    pub fn frames(&self) -> &[Frame; STACK_LEN] {
        &self.frames
    }
    pub fn newest(&self) -> &Frame {
        &self.frames[STACK_LEN - 1]
    }
    pub fn to_tensor(&self) -> Vec<f32> {
        let mut values = Vec::with_capacity(Self::LEN);
        self.extend_tensor(&mut values);
        values
    }
    pub fn extend_tensor(&self, values: &mut Vec<f32>) {
        for frame in &self.frames {
            frame.extend_tensor(values);
        }
    }
}

impl From<[Frame; STACK_LEN]> for State {
    fn from(frames: [Frame; STACK_LEN]) -> Self {
        Self { frames }
    }
}
