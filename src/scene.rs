use crate::{
    body::{BodyDesc, BodyKind, normalize_angle},
    config::PhysicsConfig,
    error::Result,
    world::World,
};
use ultraviolet::Vec2;

/// Aiming and power helpers for the launcher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cannon {
    /// Point the barrel rotates around.
    pub pivot: Vec2,
    /// Distance from the pivot to where the projectile rests.
    pub muzzle: f32,
    /// Launch speed at full pull.
    pub max_speed: f32,
    /// Pull distance that gives full power.
    pub max_pull: f32,
}

impl Cannon {
    pub const DEFAULT_MAX_PULL: f32 = 282.8;

    /// Where the projectile sits with the barrel at `angle` degrees.
    pub fn muzzle_position(&self, angle: f32) -> Vec2 {
        let (sin, cos) = normalize_angle(angle).to_radians().sin_cos();
        self.pivot + Vec2::new(cos, sin) * self.muzzle
    }

    /// Barrel angle in degrees pointing from the pivot at `target`.
    pub fn aim_at(&self, target: Vec2) -> f32 {
        let d = target - self.pivot;
        normalize_angle(d.y.atan2(d.x).to_degrees())
    }

    /// Launch speed for a pull of `pull` units. Power grows with the square
    /// of the pull and saturates at `max_pull`.
    pub fn speed_for_pull(&self, pull: f32) -> f32 {
        let max_sq = self.max_pull * self.max_pull;
        let pull_sq = (pull * pull).min(max_sq);
        self.max_speed * pull_sq / max_sq
    }
}

/// The standard level: a walled box with the cannon bottom left, two
/// pillars, a block with a crate on top, pigs, power markers and a net.
pub fn standard_level(config: PhysicsConfig) -> Result<World> {
    use BodyKind::*;

    let mut world = World::new(config)?;

    // Arena
    world.add_body(BodyDesc::rect(Floor, Vec2::new(0.0, -290.0), 400.0, 10.0)?)?;
    world.add_body(BodyDesc::rect(Ceiling, Vec2::new(0.0, 290.0), 400.0, 10.0)?)?;
    world.add_body(BodyDesc::rect(Wall, Vec2::new(-390.0, 0.0), 300.0, 10.0)?.with_angle(90.0))?;
    world.add_body(BodyDesc::rect(Wall, Vec2::new(390.0, 0.0), 300.0, 10.0)?.with_angle(90.0))?;

    let cannon = Cannon {
        pivot: Vec2::new(-314.0, -180.0),
        muzzle: 15.0,
        max_speed: 25.0,
        max_pull: Cannon::DEFAULT_MAX_PULL,
    };
    world.set_cannon(cannon);

    let projectile = world.add_body(
        BodyDesc::circle(Projectile, cannon.muzzle_position(60.0), 10.0)
            .with_mass(250.0)
            .movable(),
    )?;
    world.set_projectile(projectile)?;
    world.aim(60.0)?;

    // Pillars stand on the floor, long axis up.
    for x in [-50.0, 280.0] {
        world.add_body(
            BodyDesc::rect(Pillar, Vec2::new(x, -230.0), 50.0, 10.0)?
                .with_angle(90.0)
                .with_mass(250.0)
                .movable(),
        )?;
    }

    world.add_body(BodyDesc::rect(Obstacle, Vec2::new(120.0, -250.0), 40.0, 30.0)?)?;
    world.add_body(
        BodyDesc::rect(Crate, Vec2::new(120.0, -200.0), 20.0, 20.0)?
            .with_mass(150.0)
            .movable(),
    )?;

    world.add_body(BodyDesc::circle(Pig, Vec2::new(200.0, -265.0), 15.0))?;
    world.add_body(BodyDesc::circle(Pig, Vec2::new(330.0, -265.0), 15.0).with_hit_limit(2))?;
    world.add_body(BodyDesc::circle(Pig, Vec2::new(120.0, -165.0), 15.0))?;

    world.add_body(BodyDesc::circle(PowerUp, Vec2::new(-150.0, 50.0), 12.0))?;
    world.add_body(BodyDesc::circle(PowerDown, Vec2::new(100.0, 120.0), 12.0))?;

    world.add_body(BodyDesc::rect(Sticky, Vec2::new(250.0, 230.0), 40.0, 8.0)?)?;

    log::info!("standard level built with {} bodies", world.bodies().len());
    Ok(world)
}

/// A floor plus `n` crates dropped from random heights with random drift.
/// Deterministic for a given `seed`.
pub fn scatter_crates(config: PhysicsConfig, n: usize, seed: u64) -> Result<World> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut world = World::new(config)?;

    let half_width = (n as f32).sqrt() * 40.0 + 100.0;
    // Thick enough to stay within the proxy limit; its top sits at y = 0.
    let depth = (half_width / 30.0).max(10.0);
    world.add_body(BodyDesc::rect(BodyKind::Floor, Vec2::new(0.0, -depth), half_width, depth)?)?;

    for _ in 0..n {
        let x = (rng.f32() * 2.0 - 1.0) * (half_width - 20.0);
        let y = 20.0 + rng.f32() * 400.0;
        let size = 5.0 + rng.f32() * 10.0;
        let drift = Vec2::new(rng.f32() * 4.0 - 2.0, rng.f32() * 2.0);

        world.add_body(
            BodyDesc::rect(BodyKind::Crate, Vec2::new(x, y), size, size)?
                .with_angle(rng.f32() * 360.0)
                .with_mass(50.0 + rng.f32() * 200.0)
                .with_velocity(drift)
                .movable(),
        )?;
    }

    Ok(world)
}
