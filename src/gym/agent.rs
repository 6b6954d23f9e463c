//! Controllers that consume environment steps.

use super::space::{Action, Space};
use super::bridge::StepState;

/// External controller driven by the bridge once per step.
pub trait Agent {
    /// Called once, before the first step, with the declared spaces.
    fn reset(&mut self, _observation_space: &Space, _action_space: &Space) {}

    /// Chooses the action for this step, or `None` to skip acting.
    fn act(&mut self, state: &StepState) -> Option<Action>;
}

/// Never acts.
#[derive(Debug, Default, Clone)]
pub struct IdleAgent;

impl Agent for IdleAgent {
    fn act(&mut self, _state: &StepState) -> Option<Action> {
        None
    }
}

/// Walks through the discrete actions in order, wrapping around.
#[derive(Debug, Default, Clone)]
pub struct CyclicAgent {
    n: usize,
    next: usize,
}

impl Agent for CyclicAgent {
    fn reset(&mut self, _observation_space: &Space, action_space: &Space) {
        self.n = match action_space {
            Space::Discrete { n } => *n,
            Space::Box { .. } => 0,
        };
        self.next = 0;
    }

    fn act(&mut self, _state: &StepState) -> Option<Action> {
        if self.n == 0 {
            return None;
        }
        let action = Action(self.next);
        self.next = (self.next + 1) % self.n;
        Some(action)
    }
}
