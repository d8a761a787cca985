//! Closed-form motion of a body under linear air drag.
//!
//! Horizontal motion solves `dv/dt = -(K/M) v`, vertical motion solves
//! `dv/dt = -(K/M) v - G`. Velocities decay exponentially towards zero
//! (horizontal) or towards the terminal velocity `-(M*G)/K` (vertical).
//! Instead of stepping these equations numerically, every body stores the
//! velocity it had at its last impulse plus the time elapsed since, and its
//! pose is evaluated analytically from that.

use ultraviolet::Vec2;

/// Drag coefficient and gravity shared by every body in a world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drag {
    /// Linear drag coefficient `K`.
    pub k: f32,
    /// Downward gravitational acceleration `G`.
    pub g: f32,
}

impl Default for Drag {
    fn default() -> Self {
        Self { k: 0.3, g: 1.0 }
    }
}

/// Decay factor `exp(-(K/M) * T)`.
#[inline]
pub fn decay(k: f32, m: f32, t: f32) -> f32 {
    (-(k / m) * t).exp()
}

/// Horizontal velocity at time `t` after an impulse of `v0`.
pub fn horizontal_velocity(v0: f32, k: f32, m: f32, t: f32) -> f32 {
    v0 * decay(k, m, t)
}

/// Horizontal distance covered `t` after an impulse of `v0`.
pub fn horizontal_displacement(v0: f32, k: f32, m: f32, t: f32) -> f32 {
    (m / k) * v0 * (1.0 - decay(k, m, t))
}

/// Vertical velocity at time `t` after an impulse of `v0`.
pub fn vertical_velocity(v0: f32, k: f32, m: f32, t: f32, g: f32) -> f32 {
    let drift = (m * g) / k;
    (v0 + drift) * decay(k, m, t) - drift
}

/// Vertical distance covered `t` after an impulse of `v0`.
pub fn vertical_displacement(v0: f32, k: f32, m: f32, t: f32, g: f32) -> f32 {
    let drift = (m * g) / k;
    (m / k) * (v0 + drift) * (1.0 - decay(k, m, t)) - drift * t
}

/// The vertical velocity a falling body approaches as `t` grows.
pub fn terminal_velocity(k: f32, m: f32, g: f32) -> f32 {
    -(m * g) / k
}

/// One analytic arc: where it started, the impulse that started it and how
/// long it has been running.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Trajectory {
    /// Position snapshot taken at the last impulse.
    pub start: Vec2,
    /// Velocity given by the last impulse.
    pub launch: Vec2,
    /// Time elapsed since the last impulse.
    pub elapsed: f32,
}

impl Trajectory {
    /// A motionless arc pinned at `start`.
    pub fn at_rest(start: Vec2) -> Self {
        Self {
            start,
            launch: Vec2::zero(),
            elapsed: 0.0,
        }
    }

    /// Velocity after `elapsed` for a body of the given `mass`.
    pub fn velocity(&self, drag: Drag, mass: f32) -> Vec2 {
        Vec2::new(
            horizontal_velocity(self.launch.x, drag.k, mass, self.elapsed),
            vertical_velocity(self.launch.y, drag.k, mass, self.elapsed, drag.g),
        )
    }

    /// Offset from `start` after `elapsed`.
    pub fn displacement(&self, drag: Drag, mass: f32) -> Vec2 {
        Vec2::new(
            horizontal_displacement(self.launch.x, drag.k, mass, self.elapsed),
            vertical_displacement(self.launch.y, drag.k, mass, self.elapsed, drag.g),
        )
    }

    /// Absolute position after `elapsed`.
    pub fn position(&self, drag: Drag, mass: f32) -> Vec2 {
        self.start + self.displacement(drag, mass)
    }

    /// Starts a new arc from `position` with velocity `launch`.
    pub fn rebase(&mut self, position: Vec2, launch: Vec2) {
        self.start = position;
        self.launch = launch;
        self.elapsed = 0.0;
    }
}
