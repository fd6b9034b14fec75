use candle_core::{Module, Result, Tensor};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};
use replay_data::STACK_LEN;

// 84 -> (84 - 8) / 4 + 1 = 20 -> (20 - 4) / 2 + 1 = 9
const CONV_OUT_SIDE: usize = 9;
const CONV_OUT_CHANNELS: usize = 32;
const HIDDEN: usize = 256;

/// Two strided convolutions over the stacked frames followed by two dense
/// layers producing one value per action.
#[derive(Debug)]
pub struct QNetwork {
    conv1: Conv2d,
    conv2: Conv2d,
    fc1: Linear,
    fc2: Linear,
}

impl QNetwork {
    pub fn new(vb: VarBuilder, n_actions: usize) -> Result<Self> {
        let conv1 = conv2d(
            STACK_LEN,
            16,
            8,
            Conv2dConfig {
                stride: 4,
                ..Default::default()
            },
            vb.pp("conv1"),
        )?;
        let conv2 = conv2d(
            16,
            CONV_OUT_CHANNELS,
            4,
            Conv2dConfig {
                stride: 2,
                ..Default::default()
            },
            vb.pp("conv2"),
        )?;
        let fc1 = linear(
            CONV_OUT_CHANNELS * CONV_OUT_SIDE * CONV_OUT_SIDE,
            HIDDEN,
            vb.pp("fc1"),
        )?;
        let fc2 = linear(HIDDEN, n_actions, vb.pp("fc2"))?;
        Ok(Self {
            conv1,
            conv2,
            fc1,
            fc2,
        })
    }
}

impl Module for QNetwork {
    /// `[batch, 4, 84, 84]` -> `[batch, n_actions]`
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let xs = self.conv1.forward(xs)?.relu()?;
        let xs = self.conv2.forward(&xs)?.relu()?;
        let xs = xs.flatten_from(1)?;
        self.fc2.forward(&self.fc1.forward(&xs)?)
    }
}
