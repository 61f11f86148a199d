use crate::constants::{SPRING_DAMPING, SPRING_MASS, SPRING_STEP_SECS, SPRING_STIFFNESS, SPRING_THRESHOLD};

/// A spring-based animation value for smooth transitions.
///
/// Units are per second: `update` takes the elapsed wall-clock time and
/// integrates in fixed sub-steps so large gaps between samples stay stable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub position: f32,
    pub velocity: f32,
    pub target: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            stiffness: SPRING_STIFFNESS,
            damping: SPRING_DAMPING,
            mass: SPRING_MASS,
        }
    }
}

impl Spring {
    /// Creates a default spring resting at `value`.
    pub fn at_rest(value: f32) -> Self {
        Self {
            position: value,
            target: value,
            ..Default::default()
        }
    }

    /// Advances the spring by `dt` seconds. Returns true if still animating.
    pub fn update(&mut self, dt: f32) -> bool {
        let mut remaining = dt.max(0.0);

        while remaining > 0.0 && !self.is_at_rest() {
            let step = remaining.min(SPRING_STEP_SECS);
            let force = -self.stiffness * (self.position - self.target) - self.damping * self.velocity;
            self.velocity += force / self.mass * step;
            self.position += self.velocity * step;
            remaining -= step;

            // If very close to target and velocity is low, snap to target
            let distance = (self.target - self.position).abs();
            if distance < SPRING_THRESHOLD && self.velocity.abs() < SPRING_THRESHOLD {
                self.position = self.target;
                self.velocity = 0.0;
            }
        }

        !self.is_at_rest()
    }

    /// Sets the target value for the spring to animate towards.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jumps to `value` without animating and keeps the current target.
    pub fn snap_to(&mut self, value: f32) {
        self.position = value;
        self.velocity = 0.0;
    }

    /// Returns true once the spring sits on its target.
    pub fn is_at_rest(&self) -> bool {
        self.position == self.target && self.velocity == 0.0
    }
}
