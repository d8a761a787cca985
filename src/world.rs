use crate::{
    body::{Body, BodyDesc, BodyId, BodyState, Pose},
    collision,
    config::PhysicsConfig,
    error::{PhysicsError, Result},
    kinematics::Drag,
    response::{self, Context, ResponseTable},
    scene::Cannon,
};

use std::collections::HashSet;
use ultraviolet::Vec2;

/// Owns every body of a level and advances them frame by frame.
#[derive(Debug)]
pub struct World {
    pub config: PhysicsConfig,
    /// Number of completed advances.
    pub frame: usize,
    /// Dense arena; a body's id is its index and bodies are never removed.
    bodies: Vec<Body>,
    rules: ResponseTable,
    projectile: Option<BodyId>,
    cannon: Option<Cannon>,
    aim: f32,
    score: i32,
    /// Pairs that were touching at the end of the last advance.
    contacts: HashSet<(BodyId, BodyId)>,
}

impl World {
    /// An empty world using the standard response table.
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        let rules = ResponseTable::standard(&config);
        Self::with_rules(config, rules)
    }

    pub fn with_rules(config: PhysicsConfig, rules: ResponseTable) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            frame: 0,
            bodies: Vec::new(),
            rules,
            projectile: None,
            cannon: None,
            aim: 0.0,
            score: 0,
            contacts: HashSet::new(),
        })
    }

    pub fn drag(&self) -> Drag {
        self.config.drag()
    }

    /// Validates `desc` and appends it, returning the new body's id.
    pub fn add_body(&mut self, desc: BodyDesc) -> Result<BodyId> {
        desc.validate()?;
        let id = BodyId(self.bodies.len() as u32);
        self.bodies.push(Body::new(id, desc));
        Ok(id)
    }

    pub fn body(&self, id: BodyId) -> Result<&Body> {
        self.bodies.get(id.index()).ok_or(PhysicsError::UnknownBody(id))
    }

    pub fn body_mut(&mut self, id: BodyId) -> Result<&mut Body> {
        self.bodies.get_mut(id.index()).ok_or(PhysicsError::UnknownBody(id))
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn rules_mut(&mut self) -> &mut ResponseTable {
        &mut self.rules
    }

    pub fn projectile(&self) -> Option<BodyId> {
        self.projectile
    }

    /// Marks a movable body as the one the cannon fires.
    pub fn set_projectile(&mut self, id: BodyId) -> Result<()> {
        if !self.body(id)?.movable {
            return Err(PhysicsError::Immovable(id));
        }
        self.projectile = Some(id);
        Ok(())
    }

    pub fn cannon(&self) -> Option<&Cannon> {
        self.cannon.as_ref()
    }

    pub fn set_cannon(&mut self, cannon: Cannon) {
        self.cannon = Some(cannon);
    }

    /// Current barrel angle in degrees.
    pub fn aim_angle(&self) -> f32 {
        self.aim
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn pose(&self, id: BodyId) -> Result<Pose> {
        Ok(self.body(id)?.pose())
    }

    /// Pairs touching at the end of the last advance, smaller id first.
    pub fn contacts(&self) -> &HashSet<(BodyId, BodyId)> {
        &self.contacts
    }

    /// Gives body `id` a launch velocity of `speed` at `angle` degrees from
    /// its current pose. A zero speed leaves it at rest. Static, toppling
    /// and settled bodies cannot be launched.
    pub fn launch(&mut self, id: BodyId, angle: f32, speed: f32) -> Result<()> {
        let body = self.body_mut(id)?;
        if !body.can_launch() {
            return Err(PhysicsError::Immovable(id));
        }

        let (sin, cos) = angle.to_radians().sin_cos();
        let launch = Vec2::new(speed * cos, speed * sin);
        body.radius_scale = 1.0;
        body.start_flight(launch);

        log::info!("launched {} at {} degrees, speed {}", id, angle, speed);
        Ok(())
    }

    /// Aims the barrel and fires the projectile from the muzzle. A projectile
    /// still in flight is reloaded first.
    pub fn launch_projectile(&mut self, angle: f32, speed: f32) -> Result<()> {
        let id = self.projectile.ok_or(PhysicsError::NoProjectile)?;
        self.aim(angle)?;
        self.reload()?;
        self.launch(id, angle, speed)
    }

    /// Turns the barrel. A resting projectile follows the muzzle.
    pub fn aim(&mut self, angle: f32) -> Result<()> {
        let id = self.projectile.ok_or(PhysicsError::NoProjectile)?;
        self.aim = crate::body::normalize_angle(angle);

        let Some(cannon) = self.cannon else {
            return Ok(());
        };
        let muzzle = cannon.muzzle_position(self.aim);
        let body = self.body_mut(id)?;
        if body.state == BodyState::AtRest {
            body.position = muzzle;
            body.come_to_rest();
        }
        Ok(())
    }

    /// Puts the projectile back in the barrel, resting and unpowered.
    pub fn reload(&mut self) -> Result<()> {
        let id = self.projectile.ok_or(PhysicsError::NoProjectile)?;
        let muzzle = self.cannon.map(|c| c.muzzle_position(self.aim));

        let body = self.body_mut(id)?;
        if let Some(muzzle) = muzzle {
            body.position = muzzle;
        }
        body.radius_scale = 1.0;
        body.active = true;
        body.come_to_rest();
        Ok(())
    }

    /// Advances by the configured tick.
    pub fn step(&mut self) {
        self.advance(self.config.tick);
    }

    /// Moves every body forward by `dt`, then detects and resolves
    /// collisions.
    pub fn advance(&mut self, dt: f32) {
        self.integrate(dt);
        let touching = collision::detect(&self.bodies, self.config.parallel);
        self.resolve(&touching);
        self.frame += 1;
    }

    /// Evaluates every flying body's arc at its new elapsed time and turns
    /// toppling bodies one notch.
    fn integrate(&mut self, dt: f32) {
        let drag = self.drag();
        let rate = self.config.topple_rate;

        for body in &mut self.bodies {
            match body.state {
                BodyState::InFlight if body.movable => {
                    body.trajectory.elapsed += dt;
                    body.sync_position(drag);

                    let velocity = body.trajectory.velocity(drag, body.mass);
                    let finite = body.position.x.is_finite()
                        && body.position.y.is_finite()
                        && velocity.x.is_finite()
                        && velocity.y.is_finite();
                    if !finite {
                        log::warn!("{} produced a non-finite state, resetting to rest", body.id);
                        body.position = body.trajectory.start;
                        body.come_to_rest();
                    }
                }
                BodyState::Toppling { .. } => {
                    if body.topple_step(rate) {
                        log::debug!("{} settled", body.id);
                    }
                }
                _ => {}
            }
        }
    }

    /// Applies the response rule of every touching pair in ascending order.
    fn resolve(&mut self, touching: &[(usize, usize)]) {
        let drag = self.drag();
        let mut contacts = HashSet::with_capacity(touching.len());

        for &(i, j) in touching {
            let (a, b) = pair_mut(&mut self.bodies, i, j);
            // An earlier response this frame may have moved or retired either.
            if !(a.can_collide() && b.can_collide()) || !collision::collides(a, b) {
                continue;
            }

            let key = (a.id, b.id);
            contacts.insert(key);

            let Some((rule, swapped)) = self.rules.lookup(a.kind, b.kind) else {
                continue;
            };
            let (actor, target) = if swapped { (b, a) } else { (a, b) };

            let ctx = Context {
                config: &self.config,
                drag,
                began: !self.contacts.contains(&key),
            };
            let outcome = response::apply(rule, actor, target, &ctx);
            if outcome.score != 0 {
                self.score += outcome.score;
                log::info!("score {:+} -> {}", outcome.score, self.score);
            }
        }

        self.contacts = contacts;
    }
}

/// Mutable references to two distinct bodies, `i < j`.
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert!(i < j);
    let (left, right) = bodies.split_at_mut(j);
    (&mut left[i], &mut right[0])
}
