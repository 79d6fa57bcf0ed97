//! Behavior states driven by the control loop
//!
//! A behavior is entered once on transition and stepped once per control
//! loop iteration with the latest [`MotionSnapshot`]. Behaviors decide their
//! own successors by returning a [`Transition`].

use crate::processing::MotionSnapshot;

/// Outcome of one behavior step
pub enum Transition {
    /// Keep the current behavior
    Stay,
    /// Switch to another behavior before the next iteration
    Switch(Box<dyn BehaviorState>),
}

pub trait BehaviorState {
    /// Called once when the control loop switches to this behavior
    fn enter(&mut self) {}

    /// Called once per control loop iteration
    fn step(&mut self, motion: &MotionSnapshot) -> Transition;

    /// Name for logging
    fn name(&self) -> &'static str;
}

/// Owns the active behavior and dispatches to it
pub struct ControlLoop {
    current: Box<dyn BehaviorState>,
    iterations: u64,
}

impl ControlLoop {
    /// Start with `initial`, entering it immediately
    pub fn new(mut initial: Box<dyn BehaviorState>) -> Self {
        log::info!("Entering behavior {}", initial.name());
        initial.enter();
        Self {
            current: initial,
            iterations: 0,
        }
    }

    /// Replace the active behavior and enter the new one
    pub fn transition_to(&mut self, mut next: Box<dyn BehaviorState>) {
        log::info!("Behavior transition: {} -> {}", self.current.name(), next.name());
        next.enter();
        self.current = next;
    }

    /// Step the active behavior, applying any transition it requests
    pub fn step(&mut self, motion: &MotionSnapshot) {
        self.iterations += 1;
        if let Transition::Switch(next) = self.current.step(motion) {
            self.transition_to(next);
        }
    }

    pub fn current_name(&self) -> &'static str {
        self.current.name()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
