use crate::{ModelError, NamedTensor, OptimizerState, Params};
use candle_core::backprop::GradStore;
use candle_core::{Device, Result, Tensor, Var};
use candle_nn::Optimizer;

#[derive(Clone, Debug)]
pub struct ParamsAdam {
    pub lr: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub eps: f64,
}

impl Default for ParamsAdam {
    fn default() -> Self {
        Self {
            lr: 1e-4,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
        }
    }
}

#[derive(Debug)]
struct VarAdam {
    name: String,
    var: Var,
    first_moment: Var,
    second_moment: Var,
}

/// Adam whose moment buffers and step counter can be exported and restored,
/// so a resumed run continues with the same update statistics.
#[derive(Debug)]
pub struct Adam {
    vars: Vec<VarAdam>,
    step_t: u64,
    params: ParamsAdam,
}

impl Adam {
    pub fn new_named(named_vars: Vec<(String, Var)>, params: ParamsAdam) -> Result<Self> {
        let vars = named_vars
            .into_iter()
            .filter(|(_, var)| var.dtype().is_float())
            .map(|(name, var)| {
                let first_moment = Var::zeros(var.shape(), var.dtype(), var.device())?;
                let second_moment = Var::zeros(var.shape(), var.dtype(), var.device())?;
                Ok(VarAdam {
                    name,
                    var,
                    first_moment,
                    second_moment,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            vars,
            step_t: 0,
            params,
        })
    }

    pub fn export_state(&self) -> std::result::Result<OptimizerState, ModelError> {
        let mut buffers = Vec::with_capacity(2 * self.vars.len());
        for var in &self.vars {
            buffers.push(to_named(format!("{}.m", var.name), var.first_moment.as_tensor())?);
            buffers.push(to_named(format!("{}.v", var.name), var.second_moment.as_tensor())?);
        }
        Ok(OptimizerState {
            step: self.step_t,
            buffers: Params(buffers),
        })
    }

    pub fn import_state(
        &mut self,
        state: &OptimizerState,
        device: &Device,
    ) -> std::result::Result<(), ModelError> {
        if state.buffers.len() != 2 * self.vars.len() {
            return Err(ModelError::ParamMismatch(format!(
                "optimizer expects {} buffers, got {}",
                2 * self.vars.len(),
                state.buffers.len()
            )));
        }
        for var in &self.vars {
            for (suffix, target) in [("m", &var.first_moment), ("v", &var.second_moment)] {
                let name = format!("{}.{suffix}", var.name);
                let saved = state.buffers.get(&name).ok_or_else(|| {
                    ModelError::ParamMismatch(format!("missing optimizer buffer '{name}'"))
                })?;
                set_from_named(target, saved, device)?;
            }
        }
        self.step_t = state.step;
        Ok(())
    }
}

impl Optimizer for Adam {
    type Config = ParamsAdam;

    fn new(vars: Vec<Var>, params: ParamsAdam) -> Result<Self> {
        let named = vars
            .into_iter()
            .enumerate()
            .map(|(i, var)| (format!("var_{i}"), var))
            .collect();
        Self::new_named(named, params)
    }

    fn learning_rate(&self) -> f64 {
        self.params.lr
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.params.lr = lr
    }

    fn step(&mut self, grads: &GradStore) -> Result<()> {
        self.step_t += 1;
        let lr = self.params.lr;
        let beta1 = self.params.beta1;
        let beta2 = self.params.beta2;
        let t = self.step_t as f64;
        let scale_m = 1f64 / (1f64 - beta1.powf(t));
        let scale_v = 1f64 / (1f64 - beta2.powf(t));
        for var in self.vars.iter() {
            let theta = &var.var;
            let m = &var.first_moment;
            let v = &var.second_moment;
            if let Some(g) = grads.get(theta) {
                let next_m = ((m.as_tensor() * beta1)? + (g * (1.0 - beta1))?)?;
                let next_v = ((v.as_tensor() * beta2)? + (g.sqr()? * (1.0 - beta2))?)?;
                let m_hat = (&next_m * scale_m)?;
                let v_hat = (&next_v * scale_v)?;
                let adjusted_grad = (m_hat / (v_hat.sqrt()? + self.params.eps)?)?;
                let next_theta = (theta.as_tensor() - (adjusted_grad * lr)?)?;
                m.set(&next_m)?;
                v.set(&next_v)?;
                theta.set(&next_theta)?;
            }
        }
        Ok(())
    }
}

pub(super) fn to_named(name: String, tensor: &Tensor) -> Result<NamedTensor> {
    Ok(NamedTensor {
        name,
        shape: tensor.dims().to_vec(),
        values: tensor.flatten_all()?.to_vec1::<f32>()?,
    })
}

pub(super) fn set_from_named(
    var: &Var,
    saved: &NamedTensor,
    device: &Device,
) -> std::result::Result<(), ModelError> {
    if var.dims() != saved.shape.as_slice() {
        return Err(ModelError::ParamMismatch(format!(
            "'{}' has shape {:?}, expected {:?}",
            saved.name,
            saved.shape,
            var.dims()
        )));
    }
    let tensor = Tensor::from_vec(saved.values.clone(), saved.shape.as_slice(), device)?;
    var.set(&tensor)?;
    Ok(())
}
