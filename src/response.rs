//! Collision response rules and the table that picks one per pair of roles.

use crate::{
    body::{Body, BodyKind, BodyState},
    collision::{self, Side},
    config::PhysicsConfig,
    kinematics::Drag,
};

use std::collections::HashMap;
use ultraviolet::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// What happens when an actor (first role) touches a target (second role).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResponseRule {
    /// Reflect the velocity along `axis` off an immovable surface.
    Bounce { axis: Axis, restitution: f32 },
    /// Reflect off the side of an immovable block and clamp outside it.
    Deflect { restitution: f32 },
    /// The actor stops dead.
    Stick,
    /// Both bodies trade momentum along each axis.
    MomentumExchange { restitution: f32 },
    /// The target falls over if struck low; `score` is awarded once.
    Topple { score: i32 },
    /// Award `delta` on first contact and count a hit on the target.
    ScoreEvent { delta: i32 },
    /// One-shot marker that rescales the actor's proxy radii.
    Resize { scale: f32 },
}

/// Maps ordered `(actor, target)` kind pairs to a rule.
#[derive(Clone, Debug, Default)]
pub struct ResponseTable {
    rules: HashMap<(BodyKind, BodyKind), ResponseRule>,
}

impl ResponseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules of the standard cannon level.
    pub fn standard(config: &PhysicsConfig) -> Self {
        use BodyKind::*;

        let cor = config.restitution;
        let mut table = Self::new();
        for actor in [Projectile, Crate] {
            table.insert(actor, Floor, ResponseRule::Bounce { axis: Axis::Vertical, restitution: cor });
            table.insert(actor, Ceiling, ResponseRule::Bounce { axis: Axis::Vertical, restitution: cor });
            table.insert(actor, Wall, ResponseRule::Bounce { axis: Axis::Horizontal, restitution: cor });
            table.insert(actor, Obstacle, ResponseRule::Deflect { restitution: cor });
            table.insert(actor, Crate, ResponseRule::MomentumExchange { restitution: cor });
            table.insert(actor, Pillar, ResponseRule::Topple { score: config.topple_score });
            table.insert(actor, Sticky, ResponseRule::Stick);
        }
        table.insert(Projectile, Pig, ResponseRule::ScoreEvent { delta: config.pig_score });
        table.insert(Crate, Pig, ResponseRule::ScoreEvent { delta: config.pig_score });
        table.insert(Projectile, PowerUp, ResponseRule::Resize { scale: config.power_up_scale });
        table.insert(Projectile, PowerDown, ResponseRule::Resize { scale: config.power_down_scale });
        table
    }

    pub fn insert(&mut self, actor: BodyKind, target: BodyKind, rule: ResponseRule) {
        self.rules.insert((actor, target), rule);
    }

    /// Finds the rule for a pair in either order. The flag is true when the
    /// second body plays the actor.
    pub fn lookup(&self, a: BodyKind, b: BodyKind) -> Option<(ResponseRule, bool)> {
        if let Some(rule) = self.rules.get(&(a, b)) {
            return Some((*rule, false));
        }
        self.rules.get(&(b, a)).map(|rule| (*rule, true))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// One-dimensional momentum exchange with coefficient of restitution `cor`.
/// Returns the post-collision velocities `(v1, v2)`.
pub fn conserve_momentum(m1: f32, m2: f32, u1: f32, u2: f32, cor: f32) -> (f32, f32) {
    let total = m1 + m2;
    let v1 = ((m1 - cor * m2) * u1) / total + ((m2 + cor * m2) * u2) / total;
    let v2 = cor * (u1 - u2) + v1;
    (v1, v2)
}

/// Side effects of a response that the world must apply.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Outcome {
    pub score: i32,
}

/// Everything a rule needs besides the two bodies.
pub struct Context<'a> {
    pub config: &'a PhysicsConfig,
    pub drag: Drag,
    /// False when the pair already touched last frame.
    pub began: bool,
}

/// Applies `rule` to the colliding pair.
pub fn apply(rule: ResponseRule, actor: &mut Body, target: &mut Body, ctx: &Context) -> Outcome {
    log::debug!("{:?} {} hit {:?} {}: {:?}", actor.kind, actor.id, target.kind, target.id, rule);

    match rule {
        ResponseRule::Bounce { axis, restitution } => {
            bounce(actor, target, axis, restitution, ctx);
            Outcome::default()
        }
        ResponseRule::Deflect { restitution } => {
            deflect(actor, target, restitution, ctx);
            Outcome::default()
        }
        ResponseRule::Stick => {
            if actor.movable {
                actor.come_to_rest();
            }
            Outcome::default()
        }
        ResponseRule::MomentumExchange { restitution } => {
            exchange(actor, target, restitution, ctx);
            Outcome::default()
        }
        ResponseRule::Topple { score } => topple(actor, target, score, ctx),
        ResponseRule::ScoreEvent { delta } => {
            if !ctx.began {
                return Outcome::default();
            }
            target.hits += 1;
            if target.hits >= target.hit_limit {
                log::info!("{:?} {} retired after {} hits", target.kind, target.id, target.hits);
                target.retire();
            }
            Outcome { score: delta }
        }
        ResponseRule::Resize { scale } => {
            if target.active {
                actor.radius_scale = scale;
                target.retire();
                log::info!("{} picked up {:?}, radius scale {}", actor.id, target.kind, scale);
            }
            Outcome::default()
        }
    }
}

fn bounce(actor: &mut Body, target: &Body, axis: Axis, restitution: f32, ctx: &Context) {
    if !actor.movable || !actor.is_in_flight() {
        return;
    }

    let mut velocity = actor.velocity(ctx.drag);
    let (along, side) = match axis {
        Axis::Vertical => (velocity.y, actor.position.y - target.position.y),
        Axis::Horizontal => (velocity.x, actor.position.x - target.position.x),
    };
    // Already moving away from the surface.
    if along * side >= 0.0 {
        return;
    }

    let rebound = -restitution * along;
    if rebound.abs() < ctx.config.rest_speed {
        log::debug!("{} comes to rest on {}", actor.id, target.id);
        actor.come_to_rest();
        return;
    }

    match axis {
        Axis::Vertical => velocity.y = rebound,
        Axis::Horizontal => velocity.x = rebound,
    }
    actor.start_flight(velocity);

    // Ride the new arc until the proxies clear or the body turns back.
    let drag = ctx.drag;
    let leaving = |body: &Body| {
        let v = body.trajectory.velocity(drag, body.mass);
        let along = match axis {
            Axis::Vertical => v.y,
            Axis::Horizontal => v.x,
        };
        along * side > 0.0
    };
    separate(actor, Against::Fixed(target), ctx, leaving);
}

fn deflect(actor: &mut Body, target: &Body, restitution: f32, ctx: &Context) {
    if !actor.movable || !actor.is_in_flight() {
        return;
    }

    let (min, max) = target.bounds();
    let reach = actor.reach();
    let clearance = ctx.config.clearance;
    let mut velocity = actor.velocity(ctx.drag);
    let mut position = actor.position;

    match collision::approach_side(actor.position, min, max, reach) {
        Side::Left => {
            if velocity.x <= 0.0 {
                return;
            }
            velocity.x *= -restitution;
            position.x = min.x - reach - clearance;
        }
        Side::Right => {
            if velocity.x >= 0.0 {
                return;
            }
            velocity.x *= -restitution;
            position.x = max.x + reach + clearance;
        }
        Side::Top => {
            if velocity.y >= 0.0 {
                return;
            }
            velocity.y *= -restitution;
            position.y = max.y + reach + clearance;
        }
        Side::Bottom => {
            if velocity.y <= 0.0 {
                return;
            }
            velocity.y *= -restitution;
            position.y = min.y - reach - clearance;
        }
    }

    actor.position = position;
    if velocity.mag() < ctx.config.rest_speed {
        actor.come_to_rest();
    } else {
        actor.start_flight(velocity);
    }
}

fn exchange(actor: &mut Body, target: &mut Body, restitution: f32, ctx: &Context) {
    if !(actor.movable && target.movable) {
        log::debug!("momentum exchange needs two movable bodies, skipping {} {}", actor.id, target.id);
        return;
    }

    let u1 = actor.velocity(ctx.drag);
    let u2 = target.velocity(ctx.drag);
    // Already drifting apart along the line of centers.
    if (u1 - u2).dot(target.position - actor.position) <= 0.0 {
        return;
    }
    let (m1, m2) = (actor.mass, target.mass);

    let (x1, x2) = conserve_momentum(m1, m2, u1.x, u2.x, restitution);
    let (y1, y2) = conserve_momentum(m1, m2, u1.y, u2.y, restitution);

    actor.start_flight(Vec2::new(x1, y1));
    target.start_flight(Vec2::new(x2, y2));

    separate(actor, Against::Moving(target), ctx, |_| true);
}

fn topple(actor: &mut Body, target: &mut Body, score: i32, ctx: &Context) -> Outcome {
    // Only a strike below the pillar's middle knocks it over.
    let standing = target.movable && target.state == BodyState::AtRest;
    if !standing || actor.position.y > target.position.y {
        deflect(actor, target, ctx.config.restitution, ctx);
        return Outcome::default();
    }

    log::info!("{:?} {} knocked over by {}", target.kind, target.id, actor.id);
    target.start_toppling();
    Outcome { score }
}

/// What a body is being pulled apart from.
enum Against<'a> {
    Fixed(&'a Body),
    Moving(&'a mut Body),
}

/// Moves `actor` (and a moving partner) forward along their arcs in
/// `separation_step` increments while they still overlap and `keep_going`
/// holds. Bounded by `max_separation_steps`.
fn separate<F>(actor: &mut Body, mut other: Against, ctx: &Context, keep_going: F)
where
    F: Fn(&Body) -> bool,
{
    let step = ctx.config.separation_step;

    for _ in 0..ctx.config.max_separation_steps {
        let overlapping = match &other {
            Against::Fixed(body) => collision::collides(actor, body),
            Against::Moving(body) => collision::collides(actor, body),
        };
        if !overlapping || !keep_going(actor) {
            return;
        }
        if actor.is_in_flight() {
            actor.trajectory.elapsed += step;
            actor.sync_position(ctx.drag);
        }
        if let Against::Moving(body) = &mut other {
            if body.is_in_flight() {
                body.trajectory.elapsed += step;
                body.sync_position(ctx.drag);
            }
        }
    }
    log::debug!(
        "{} still overlapping after {} separation steps",
        actor.id,
        ctx.config.max_separation_steps
    );
}
