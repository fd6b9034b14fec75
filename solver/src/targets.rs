use model::traits::ValueModel;
use model::ModelError;
use replay_data::Transition;

/// `reward` for a terminal transition, otherwise
/// `reward + gamma * max(next_q)`.
pub fn td_target(reward: f32, terminal: bool, gamma: f32, next_q: &[f32]) -> f32 {
    if terminal {
        reward
    } else {
        let max_next_q = next_q.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        reward + gamma * max_next_q
    }
}

/// TD targets for a sampled minibatch, evaluating every next state in one
/// batched call.
pub fn compute_targets<M: ValueModel + ?Sized>(
    model: &M,
    batch: &[&Transition],
    gamma: f32,
) -> Result<Vec<f32>, ModelError> {
    let next_states: Vec<_> = batch.iter().map(|t| &t.next_state).collect();
    let next_q = model.evaluate_batch(&next_states)?;
    Ok(batch
        .iter()
        .zip(&next_q)
        .map(|(t, q)| td_target(t.reward, t.terminal, gamma, q))
        .collect())
}
