//! Physics constants and scenario descriptions loaded from JSON.
//!
//! A scenario lists the bodies of a level plus, optionally, the cannon and
//! which body is the projectile:
//!
//! ```json
//! {
//!   "physics": { "drag": 0.3, "gravity": 1.0, "tick": 0.6 },
//!   "cannon": { "pivot": [-314.0, -180.0], "muzzle": 15.0, "max_speed": 25.0 },
//!   "bodies": [
//!     { "kind": "floor", "position": [0.0, -290.0],
//!       "shape": { "rect": { "half_length": 400.0, "half_thickness": 10.0 } } },
//!     { "kind": "projectile", "position": [0.0, 0.0], "mass": 250.0, "movable": true,
//!       "shape": { "circle": { "radius": 10.0 } } }
//!   ],
//!   "projectile": 1
//! }
//! ```
//!
//! Every physics field has a default, so `"physics": {}` is valid.

use crate::{
    body::{BodyDesc, BodyId, BodyKind, ProxyCircle},
    error::{PhysicsError, Result},
    kinematics::Drag,
    scene::Cannon,
    world::World,
};

use serde::Deserialize;
use ultraviolet::Vec2;

/// World-wide physics constants and tuning knobs.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Linear drag coefficient `K`, shared by both axes.
    pub drag: f32,
    /// Downward acceleration `G`.
    pub gravity: f32,
    /// Default time step for [`World::step`].
    pub tick: f32,
    /// Coefficient of restitution used by the standard rules.
    pub restitution: f32,
    /// Rebounds slower than this end in rest.
    pub rest_speed: f32,
    /// Elapsed-time increment of the separation loop.
    pub separation_step: f32,
    pub max_separation_steps: u32,
    /// Degrees per advance a toppling pillar turns.
    pub topple_rate: f32,
    /// Gap left between a deflected body and the obstacle.
    pub clearance: f32,
    pub pig_score: i32,
    pub topple_score: i32,
    pub power_up_scale: f32,
    pub power_down_scale: f32,
    /// Run the narrow-phase detect pass on rayon.
    pub parallel: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            drag: 0.3,
            gravity: 1.0,
            tick: 0.6,
            restitution: 0.6,
            rest_speed: 0.5,
            separation_step: 0.05,
            max_separation_steps: 400,
            topple_rate: 3.0,
            clearance: 1.0,
            pig_score: 100,
            topple_score: 50,
            power_up_scale: 1.6,
            power_down_scale: 0.6,
            parallel: false,
        }
    }
}

impl PhysicsConfig {
    pub fn drag(&self) -> Drag {
        Drag {
            k: self.drag,
            g: self.gravity,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("drag", self.drag),
            ("tick", self.tick),
            ("separation_step", self.separation_step),
            ("topple_rate", self.topple_rate),
            ("power_up_scale", self.power_up_scale),
            ("power_down_scale", self.power_down_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PhysicsError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("gravity", self.gravity),
            ("restitution", self.restitution),
            ("rest_speed", self.rest_speed),
            ("clearance", self.clearance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PhysicsError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Collision footprint of a configured body.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeConfig {
    Circle { radius: f32 },
    Rect { half_length: f32, half_thickness: f32 },
    /// Explicit proxy circles.
    Proxies { circles: Vec<ProxyCircle> },
    /// No collision footprint.
    None,
}

/// One body of a scenario.
#[derive(Clone, Debug, Deserialize)]
pub struct BodyConfig {
    pub kind: BodyKind,
    pub position: [f32; 2],
    #[serde(default)]
    pub angle: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default)]
    pub movable: bool,
    pub shape: ShapeConfig,
    #[serde(default)]
    pub velocity: [f32; 2],
    #[serde(default = "default_hit_limit")]
    pub hit_limit: u32,
}

fn default_mass() -> f32 {
    1.0
}

fn default_hit_limit() -> u32 {
    1
}

impl BodyConfig {
    pub fn to_desc(&self) -> Result<BodyDesc> {
        let position = Vec2::from(self.position);
        let mut desc = match &self.shape {
            ShapeConfig::Circle { radius } => BodyDesc::circle(self.kind, position, *radius),
            ShapeConfig::Rect {
                half_length,
                half_thickness,
            } => BodyDesc::rect(self.kind, position, *half_length, *half_thickness)?,
            ShapeConfig::Proxies { circles } => {
                let reach = circles
                    .iter()
                    .map(|c| c.offset.abs() + c.radius)
                    .fold(0.0, f32::max);
                BodyDesc::new(self.kind, position)
                    .with_proxies(circles.clone())
                    .with_half_extents(Vec2::broadcast(reach))
            }
            ShapeConfig::None => BodyDesc::new(self.kind, position),
        };

        desc = desc
            .with_angle(self.angle)
            .with_mass(self.mass)
            .with_velocity(Vec2::from(self.velocity))
            .with_hit_limit(self.hit_limit);
        if self.movable {
            desc = desc.movable();
        }
        Ok(desc)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CannonConfig {
    pub pivot: [f32; 2],
    pub muzzle: f32,
    pub max_speed: f32,
    #[serde(default = "default_max_pull")]
    pub max_pull: f32,
}

fn default_max_pull() -> f32 {
    Cannon::DEFAULT_MAX_PULL
}

/// Top-level scenario file.
#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub cannon: Option<CannonConfig>,
    pub bodies: Vec<BodyConfig>,
    /// Index into `bodies` of the projectile.
    #[serde(default)]
    pub projectile: Option<u32>,
}

impl ScenarioConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds a world with the standard response table.
    pub fn build(&self) -> Result<World> {
        let mut world = World::new(self.physics.clone())?;
        for body in &self.bodies {
            world.add_body(body.to_desc()?)?;
        }
        if let Some(cannon) = &self.cannon {
            world.set_cannon(Cannon {
                pivot: Vec2::from(cannon.pivot),
                muzzle: cannon.muzzle,
                max_speed: cannon.max_speed,
                max_pull: cannon.max_pull,
            });
        }
        if let Some(index) = self.projectile {
            world.set_projectile(BodyId(index))?;
        }
        Ok(world)
    }
}
