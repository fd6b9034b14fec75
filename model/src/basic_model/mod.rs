mod adam;
mod device;
mod network;

use super::traits::{Learner, Persistable, ValueModel};
use super::{LearningStepInfo, ModelError, OptimizerState, Params, TrainingBatch};
use adam::{set_from_named, to_named, Adam, ParamsAdam};
use candle_core::{DType, Device, Module, Tensor, Var};
use candle_nn::{VarBuilder, VarMap};
pub use device::ModelDevice;
use network::QNetwork;
use replay_data::State;

fn sorted_named_vars(varmap: &VarMap) -> Vec<(String, Var)> {
    let data = varmap.data().lock().unwrap_or_else(|e| e.into_inner());
    let mut named: Vec<(String, Var)> = data
        .iter()
        .map(|(name, var)| (name.clone(), var.clone()))
        .collect();
    named.sort_by(|a, b| a.0.cmp(&b.0));
    named
}

pub struct BasicModel {
    varmap: VarMap,
    network: QNetwork,
    optimizer: Adam,
    device: Device,
    n_actions: u8,
}

impl BasicModel {
    pub fn new(n_actions: u8, learning_rate: f64, device: ModelDevice) -> Result<Self, ModelError> {
        let device = device.open()?;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let network = QNetwork::new(vb, usize::from(n_actions))?;
        let optimizer = Adam::new_named(
            sorted_named_vars(&varmap),
            ParamsAdam {
                lr: learning_rate,
                ..Default::default()
            },
        )?;
        Ok(Self {
            varmap,
            network,
            optimizer,
            device,
            n_actions,
        })
    }

    fn states_tensor(&self, states: &[&State]) -> Result<Tensor, ModelError> {
        let mut values = Vec::with_capacity(states.len() * State::LEN);
        for state in states {
            state.extend_tensor(&mut values);
        }
        let [frames, height, width] = State::SHAPE;
        Ok(Tensor::from_vec(
            values,
            (states.len(), frames, height, width),
            &self.device,
        )?)
    }
}

impl ValueModel for BasicModel {
    fn n_actions(&self) -> u8 {
        self.n_actions
    }
    fn evaluate(&self, state: &State) -> Result<Vec<f32>, ModelError> {
        let q_vals = self.network.forward(&self.states_tensor(&[state])?)?;
        Ok(q_vals.squeeze(0)?.to_vec1::<f32>()?)
    }
    fn evaluate_batch(&self, states: &[&State]) -> Result<Vec<Vec<f32>>, ModelError> {
        if states.is_empty() {
            return Ok(vec![]);
        }
        let q_vals = self.network.forward(&self.states_tensor(states)?)?;
        Ok(q_vals.to_vec2::<f32>()?)
    }
}

impl Learner for BasicModel {
    fn train_batch(&mut self, batch: &TrainingBatch) -> Result<LearningStepInfo, ModelError> {
        let batch_len = batch.len();
        if batch.is_empty() || batch.actions.len() != batch_len || batch.targets.len() != batch_len
        {
            return Err(ModelError::MalformedBatch {
                states: batch_len,
                actions: batch.actions.len(),
                targets: batch.targets.len(),
            });
        }
        let n_actions = usize::from(self.n_actions);
        let one_hot: Vec<f32> = batch
            .actions
            .iter()
            .flat_map(|action| action.one_hot())
            .collect();
        let actions = Tensor::from_vec(one_hot, (batch_len, n_actions), &self.device)?;
        let targets = Tensor::from_vec(batch.targets.clone(), batch_len, &self.device)?;

        let q_vals = self.network.forward(&self.states_tensor(&batch.states)?)?;
        let predicted = (&q_vals * &actions)?.sum(1)?;
        let loss = candle_nn::loss::mse(&predicted, &targets)?;
        let grads = loss.backward()?;
        candle_nn::Optimizer::step(&mut self.optimizer, &grads)?;

        Ok(LearningStepInfo {
            loss: loss.to_scalar::<f32>()?,
            average_q_val: q_vals.max(1)?.mean_all()?.to_scalar::<f32>()?,
        })
    }
}

impl Persistable for BasicModel {
    fn params(&self) -> Result<Params, ModelError> {
        let tensors = sorted_named_vars(&self.varmap)
            .into_iter()
            .map(|(name, var)| to_named(name, var.as_tensor()))
            .collect::<candle_core::Result<Vec<_>>>()?;
        Ok(Params(tensors))
    }
    fn set_params(&mut self, params: &Params) -> Result<(), ModelError> {
        let named_vars = sorted_named_vars(&self.varmap);
        if params.len() != named_vars.len() {
            return Err(ModelError::ParamMismatch(format!(
                "model has {} tensors, got {}",
                named_vars.len(),
                params.len()
            )));
        }
        for (name, var) in &named_vars {
            let saved = params
                .get(name)
                .ok_or_else(|| ModelError::ParamMismatch(format!("missing tensor '{name}'")))?;
            set_from_named(var, saved, &self.device)?;
        }
        Ok(())
    }
    fn optimizer_state(&self) -> Result<OptimizerState, ModelError> {
        self.optimizer.export_state()
    }
    fn set_optimizer_state(&mut self, state: &OptimizerState) -> Result<(), ModelError> {
        self.optimizer.import_state(state, &self.device)
    }
}
