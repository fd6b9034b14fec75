use rand::Rng;
use replay_data::Action;

/// Index of the largest value, the lowest index winning ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, best_value)| value > best_value) {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
}

/// Epsilon-greedy choice with frame-skip: a fresh decision is only taken on
/// frames that are multiples of `frames_per_action`, and the previous action
/// is repeated on all others.
#[derive(Clone, Debug)]
pub struct ActionSelector {
    frames_per_action: u64,
    n_actions: u8,
}

impl ActionSelector {
    pub fn new(frames_per_action: u64, n_actions: u8) -> Self {
        assert!(frames_per_action > 0);
        assert!(n_actions > 0);
        Self {
            frames_per_action,
            n_actions,
        }
    }
    pub fn is_decision_frame(&self, num_frames: u64) -> bool {
        num_frames % self.frames_per_action == 0
    }
    pub fn select<R: Rng + ?Sized>(
        &self,
        num_frames: u64,
        prev_action: Action,
        epsilon: f64,
        q_values: &[f32],
        rng: &mut R,
    ) -> Action {
        if !self.is_decision_frame(num_frames) {
            return prev_action;
        }
        if rng.gen::<f64>() < epsilon {
            return Action::new(rng.gen_range(0..self.n_actions), self.n_actions);
        }
        let best = argmax(q_values).map_or(0, |i| i as u8);
        Action::new(best, self.n_actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[f32::NAN, -1.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn greedy_when_epsilon_is_zero() {
        let selector = ActionSelector::new(1, 2);
        let mut rng = StdRng::seed_from_u64(3);
        for frame in 0..20 {
            let action = selector.select(frame, Action::noop(2), 0.0, &[0.1, 0.9], &mut rng);
            assert_eq!(action.index(), 1);
        }
    }

    #[test]
    fn random_when_epsilon_is_one() {
        let selector = ActionSelector::new(1, 2);
        let mut rng = StdRng::seed_from_u64(3);
        let mut counts = [0; 2];
        for frame in 0..200 {
            let action = selector.select(frame, Action::noop(2), 1.0, &[0.0, 9.0], &mut rng);
            counts[usize::from(action.index())] += 1;
        }
        assert!(counts[0] > 50 && counts[1] > 50, "{counts:?}");
    }

    #[test]
    fn actions_persist_for_frames_per_action() {
        let selector = ActionSelector::new(4, 2);
        let mut rng = StdRng::seed_from_u64(11);
        let mut prev = Action::new(1, 2);
        let mut history = vec![];
        for frame in 0..64 {
            prev = selector.select(frame, prev, 1.0, &[0.0, 0.0], &mut rng);
            history.push(prev);
        }
        for (frame, pair) in history.windows(2).enumerate() {
            let next_frame = frame + 1;
            if next_frame % 4 != 0 {
                assert_eq!(pair[0], pair[1], "action changed on frame {next_frame}");
            }
        }
        for block in history.chunks(4) {
            assert!(block.iter().all(|a| *a == block[0]));
        }
    }

    #[test]
    fn hold_frames_ignore_q_values_and_epsilon() {
        let selector = ActionSelector::new(3, 2);
        let mut rng = StdRng::seed_from_u64(0);
        let held = selector.select(4, Action::noop(2), 0.0, &[0.0, 100.0], &mut rng);
        assert_eq!(held, Action::noop(2));
    }
}
