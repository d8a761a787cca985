use crate::{
    error::{PhysicsError, Result},
    kinematics::{Drag, Trajectory},
};
use serde::Deserialize;
use ultraviolet::Vec2;

/// Upper bound on proxy circles per body; collision tests are all-pairs.
pub const MAX_PROXIES: usize = 64;

/// Stable handle of a body inside a [`World`](crate::World).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u32);

impl BodyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Gameplay role of a body. Collision responses are looked up by the pair of
/// roles involved, see [`ResponseTable`](crate::ResponseTable).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Projectile,
    Floor,
    Ceiling,
    Wall,
    /// Static block or corner the projectile glances off.
    Obstacle,
    /// Movable block that trades momentum.
    Crate,
    /// Movable pillar that can be knocked over.
    Pillar,
    Pig,
    PowerUp,
    PowerDown,
    Sticky,
    /// Drawn but never collides.
    Scenery,
}

/// Motion state of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodyState {
    AtRest,
    InFlight,
    /// Falling over around `pivot` until the angle reaches `rest_angle`. The
    /// center sits `arm` along the forward axis from the pivot; negative when
    /// the forward axis points down.
    Toppling { pivot: Vec2, arm: f32, rest_angle: f32 },
    /// Finished toppling. Never moves or collides again.
    Settled,
}

/// A collision circle expressed in the body's local frame: `offset` along
/// the body's forward axis, then `radius`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ProxyCircle {
    pub offset: f32,
    pub radius: f32,
}

impl ProxyCircle {
    pub fn new(offset: f32, radius: f32) -> Self {
        Self { offset, radius }
    }

    /// A single circle on the body's origin.
    pub fn disc(radius: f32) -> Vec<ProxyCircle> {
        vec![Self::new(0.0, radius)]
    }

    /// Covers a rectangle of half size `half_length` x `half_thickness`,
    /// long side on the local x-axis, with a row of touching circles.
    pub fn strip(half_length: f32, half_thickness: f32) -> Result<Vec<ProxyCircle>> {
        let sized = |v: f32| v.is_finite() && v > 0.0;
        if !(sized(half_length) && sized(half_thickness)) {
            return Err(PhysicsError::InvalidBodyParameters(format!(
                "rectangle half sizes must be positive, got {} x {}",
                half_length, half_thickness
            )));
        }

        // Checked in f32 before the cast so a sliver cannot ask for billions of circles.
        let per_side = (half_length / (2.0 * half_thickness)).floor();
        if per_side > (MAX_PROXIES / 2) as f32 {
            return Err(PhysicsError::InvalidBodyParameters(format!(
                "rectangle {} x {} needs more than {} proxy circles",
                half_length, half_thickness, MAX_PROXIES
            )));
        }
        let per_side = per_side as usize;

        if per_side == 0 {
            let reach = half_length - half_thickness;
            if reach <= 0.0 {
                return Ok(Self::disc(half_thickness.max(half_length)));
            }
            return Ok(vec![
                Self::new(-reach, half_thickness),
                Self::new(reach, half_thickness),
            ]);
        }

        let left = (0..per_side).map(|j| Self::new(-(2.0 * j as f32 + 1.0) * half_thickness, half_thickness));
        let right = (0..per_side).map(|j| Self::new((2.0 * j as f32 + 1.0) * half_thickness, half_thickness));
        Ok(left.chain(right).collect())
    }
}

/// A proxy circle placed in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

/// What the renderer needs to draw a body.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    /// Degrees in `[0, 360)`.
    pub angle: f32,
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn normalize_angle(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Construction parameters for a body.
#[derive(Clone, Debug)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f32,
    pub mass: f32,
    pub movable: bool,
    pub proxies: Vec<ProxyCircle>,
    /// Half width/height of the drawn shape, in the local frame.
    pub half_extents: Vec2,
    pub velocity: Vec2,
    pub hit_limit: u32,
}

impl BodyDesc {
    pub fn new(kind: BodyKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            angle: 0.0,
            mass: 1.0,
            movable: false,
            proxies: Vec::new(),
            half_extents: Vec2::zero(),
            velocity: Vec2::zero(),
            hit_limit: 1,
        }
    }

    /// A circular body of `radius`.
    pub fn circle(kind: BodyKind, position: Vec2, radius: f32) -> Self {
        Self::new(kind, position)
            .with_proxies(ProxyCircle::disc(radius))
            .with_half_extents(Vec2::broadcast(radius))
    }

    /// A rectangle whose long side lies along its forward axis.
    pub fn rect(kind: BodyKind, position: Vec2, half_length: f32, half_thickness: f32) -> Result<Self> {
        Ok(Self::new(kind, position)
            .with_proxies(ProxyCircle::strip(half_length, half_thickness)?)
            .with_half_extents(Vec2::new(half_length, half_thickness)))
    }

    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn movable(mut self) -> Self {
        self.movable = true;
        self
    }

    pub fn with_proxies(mut self, proxies: Vec<ProxyCircle>) -> Self {
        self.proxies = proxies;
        self
    }

    pub fn with_half_extents(mut self, half_extents: Vec2) -> Self {
        self.half_extents = half_extents;
        self
    }

    /// Starts the body in flight with this velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Number of hits before the body is retired.
    pub fn with_hit_limit(mut self, hits: u32) -> Self {
        self.hit_limit = hits.max(1);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(PhysicsError::InvalidBodyParameters(format!(
                "{:?} mass must be positive, got {}",
                self.kind, self.mass
            )));
        }
        if self.proxies.is_empty() && self.kind != BodyKind::Scenery {
            return Err(PhysicsError::InvalidBodyParameters(format!(
                "{:?} needs at least one proxy circle",
                self.kind
            )));
        }
        if self.proxies.len() > MAX_PROXIES {
            return Err(PhysicsError::InvalidBodyParameters(format!(
                "{} proxy circles exceed the limit of {}",
                self.proxies.len(),
                MAX_PROXIES
            )));
        }
        if let Some(bad) = self
            .proxies
            .iter()
            .find(|p| !(p.radius.is_finite() && p.radius > 0.0 && p.offset.is_finite()))
        {
            return Err(PhysicsError::InvalidBodyParameters(format!(
                "bad proxy circle {:?}",
                bad
            )));
        }
        if !(self.position.x.is_finite() && self.position.y.is_finite() && self.angle.is_finite()) {
            return Err(PhysicsError::InvalidBodyParameters(format!(
                "{:?} pose must be finite",
                self.kind
            )));
        }
        if self.velocity != Vec2::zero() && !self.movable {
            return Err(PhysicsError::InvalidBodyParameters(format!(
                "static {:?} cannot start with a velocity",
                self.kind
            )));
        }
        Ok(())
    }
}

/// A simulated object: pose, mass and the analytic arc it is following.
#[derive(Clone, Debug)]
pub struct Body {
    pub id: BodyId,
    pub kind: BodyKind,
    /// Current position.
    pub position: Vec2,
    angle: f32,
    pub mass: f32,
    /// Static bodies never update their pose.
    pub movable: bool,
    pub proxies: Vec<ProxyCircle>,
    pub half_extents: Vec2,
    pub trajectory: Trajectory,
    pub state: BodyState,
    /// Multiplier on every proxy radius, changed by power markers.
    pub radius_scale: f32,
    /// Retired bodies are hidden and never collide.
    pub active: bool,
    pub hits: u32,
    pub hit_limit: u32,
}

impl Body {
    pub(crate) fn new(id: BodyId, desc: BodyDesc) -> Self {
        let state = if desc.velocity == Vec2::zero() {
            BodyState::AtRest
        } else {
            BodyState::InFlight
        };

        Self {
            id,
            kind: desc.kind,
            position: desc.position,
            angle: normalize_angle(desc.angle),
            mass: desc.mass,
            movable: desc.movable,
            proxies: desc.proxies,
            half_extents: desc.half_extents,
            trajectory: Trajectory {
                start: desc.position,
                launch: desc.velocity,
                elapsed: 0.0,
            },
            state,
            radius_scale: 1.0,
            active: true,
            hits: 0,
            hit_limit: desc.hit_limit,
        }
    }

    /// Orientation in degrees, always within `[0, 360)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_angle(&mut self, degrees: f32) {
        self.angle = normalize_angle(degrees);
    }

    pub fn pose(&self) -> Pose {
        Pose {
            x: self.position.x,
            y: self.position.y,
            angle: self.angle,
        }
    }

    /// Unit vector along the body's local x-axis.
    pub fn forward(&self) -> Vec2 {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        Vec2::new(cos, sin)
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == BodyState::InFlight
    }

    /// Movable and not toppling or settled.
    pub fn can_launch(&self) -> bool {
        self.movable && matches!(self.state, BodyState::AtRest | BodyState::InFlight)
    }

    /// Whether the body takes part in collision detection at all.
    pub fn can_collide(&self) -> bool {
        self.active
            && !self.proxies.is_empty()
            && matches!(self.state, BodyState::AtRest | BodyState::InFlight)
    }

    /// Current velocity; zero unless in flight.
    pub fn velocity(&self, drag: Drag) -> Vec2 {
        if self.is_in_flight() {
            self.trajectory.velocity(drag, self.mass)
        } else {
            Vec2::zero()
        }
    }

    /// Recomputes `position` from the trajectory.
    pub fn sync_position(&mut self, drag: Drag) {
        self.position = self.trajectory.position(drag, self.mass);
    }

    /// Applies an impulse at the current position. A zero impulse leaves the
    /// body resting.
    pub fn start_flight(&mut self, launch: Vec2) {
        self.trajectory.rebase(self.position, launch);
        self.state = if launch == Vec2::zero() {
            BodyState::AtRest
        } else {
            BodyState::InFlight
        };
    }

    /// Zeroes velocity and pins the body where it is.
    pub fn come_to_rest(&mut self) {
        self.trajectory = Trajectory::at_rest(self.position);
        self.state = BodyState::AtRest;
    }

    /// Begins falling over around the lower end of the body. It always falls
    /// towards +x: angles in `[0, 180)` come down to 0, the rest to 180.
    pub fn start_toppling(&mut self) {
        let (arm, rest_angle) = if self.angle >= 180.0 {
            (-self.half_extents.x, 180.0)
        } else {
            (self.half_extents.x, 0.0)
        };
        let pivot = self.position - self.forward() * arm;
        self.trajectory = Trajectory::at_rest(self.position);
        self.state = BodyState::Toppling { pivot, arm, rest_angle };
    }

    /// Rotates a toppling body by `rate` degrees towards its rest angle and
    /// moves it along its arc. Returns true once it has settled.
    pub fn topple_step(&mut self, rate: f32) -> bool {
        let BodyState::Toppling { pivot, arm, rest_angle } = self.state else {
            return false;
        };

        let angle = (self.angle - rate).max(rest_angle);
        self.angle = angle;
        self.position = pivot + self.forward() * arm;
        if angle == rest_angle {
            self.trajectory = Trajectory::at_rest(self.position);
            self.state = BodyState::Settled;
            return true;
        }
        false
    }

    /// Hides the body and removes it from collision.
    pub fn retire(&mut self) {
        self.active = false;
    }

    /// Proxy circles in world space under the current pose.
    pub fn world_proxies(&self) -> Vec<Circle> {
        crate::collision::proxy_world_positions(self)
    }

    /// Furthest point of any proxy from the body's center.
    pub fn reach(&self) -> f32 {
        self.proxies
            .iter()
            .map(|p| p.offset.abs() + p.radius * self.radius_scale)
            .fold(0.0, f32::max)
    }

    /// World-space bounding box of the proxies as `(min, max)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let mut min = Vec2::broadcast(f32::MAX);
        let mut max = Vec2::broadcast(f32::MIN);
        for circle in self.world_proxies() {
            let r = Vec2::broadcast(circle.radius);
            min = min.min_by_component(circle.center - r);
            max = max.max_by_component(circle.center + r);
        }
        if self.proxies.is_empty() {
            return (self.position, self.position);
        }
        (min, max)
    }
}
