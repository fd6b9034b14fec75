use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NamedTensor {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

impl NamedTensor {
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.shape == other.shape
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

/// Named tensors in a stable (name-sorted) order.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Params(pub Vec<NamedTensor>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&NamedTensor> {
        self.0.iter().find(|tensor| tensor.name == name)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Equality that also distinguishes `-0.0`/`0.0` and NaN payloads.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.0.iter().zip(&other.0).all(|(a, b)| a.bit_eq(b))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OptimizerState {
    pub step: u64,
    pub buffers: Params,
}
