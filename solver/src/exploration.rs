use super::SolverSettings;

/// Frame counter and epsilon of a run.
///
/// Epsilon stays at its initial value while observing and afterwards drops
/// by a fixed amount per training frame until it reaches the final value.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplorationSchedule {
    num_frames: u64,
    epsilon: f64,
    initial_epsilon: f64,
    final_epsilon: f64,
    epsilon_step: f64,
    observe_for: u64,
    observe_until: u64,
}

impl ExplorationSchedule {
    pub fn new(initial_epsilon: f64, final_epsilon: f64, observe_for: u64, explore: u64) -> Self {
        Self {
            num_frames: 0,
            epsilon: initial_epsilon,
            initial_epsilon,
            final_epsilon,
            epsilon_step: (initial_epsilon - final_epsilon) / explore as f64,
            observe_for,
            observe_until: observe_for,
        }
    }
    pub fn from_settings(settings: &SolverSettings) -> Self {
        Self::new(
            settings.initial_epsilon,
            settings.final_epsilon,
            settings.observe_for,
            settings.explore,
        )
    }
    /// Continues from a checkpoint. The replay memory starts out empty after
    /// a restart, so a fresh observation window follows `frame`.
    pub fn resume(&mut self, frame: u64, epsilon: f64) {
        self.num_frames = frame;
        self.epsilon = epsilon.clamp(self.final_epsilon, self.initial_epsilon);
        self.observe_until = frame + self.observe_for;
    }
    pub fn num_frames(&self) -> u64 {
        self.num_frames
    }
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
    pub fn is_observing(&self) -> bool {
        self.num_frames <= self.observe_until
    }
    pub fn decay_epsilon(&mut self) {
        if self.epsilon > self.final_epsilon {
            self.epsilon = (self.epsilon - self.epsilon_step).max(self.final_epsilon);
        }
    }
    pub fn step(&mut self) {
        self.num_frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observes_up_to_and_including_observe_for() {
        let mut schedule = ExplorationSchedule::new(0.5, 0.1, 3, 10);
        for _ in 0..=3 {
            assert!(schedule.is_observing());
            schedule.step();
        }
        assert!(!schedule.is_observing());
    }

    #[test]
    fn decays_linearly_to_the_floor() {
        let mut schedule = ExplorationSchedule::new(1.0, 0.2, 0, 4);
        let mut seen = vec![];
        for _ in 0..6 {
            schedule.decay_epsilon();
            seen.push(schedule.epsilon());
        }
        let expected = [0.8, 0.6, 0.4, 0.2, 0.2, 0.2];
        for (got, want) in seen.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{seen:?}");
        }
        assert!(seen.windows(2).all(|w| w[1] <= w[0]));
        assert!(seen.iter().all(|&e| e >= 0.2));
    }

    #[test]
    fn resume_opens_a_new_observation_window() {
        let mut schedule = ExplorationSchedule::new(0.5, 0.1, 10, 100);
        schedule.resume(1000, 0.3);
        assert_eq!(schedule.num_frames(), 1000);
        assert_eq!(schedule.epsilon(), 0.3);
        assert!(schedule.is_observing());
        for _ in 0..11 {
            schedule.step();
        }
        assert!(!schedule.is_observing());
    }

    #[test]
    fn resumed_epsilon_is_kept_within_bounds() {
        let mut schedule = ExplorationSchedule::new(0.5, 0.1, 10, 100);
        schedule.resume(20, 0.9);
        assert_eq!(schedule.epsilon(), 0.5);
        schedule.resume(20, 0.0);
        assert_eq!(schedule.epsilon(), 0.1);
    }
}
