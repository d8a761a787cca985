//! Multi-circle proxy collision detection.
//!
//! Every body is approximated by a few circles offset along its forward
//! axis. Two bodies touch when any pair of their circles overlaps. A
//! `broccoli` tree over the proxies' bounding boxes prunes the body pairs
//! before the exact all-pairs circle test.

use crate::body::{Body, Circle};

use broccoli::aabb::Rect;
use rayon::prelude::*;
use ultraviolet::Vec2;

/// World-space proxy circles of `body` under its current pose.
pub fn proxy_world_positions(body: &Body) -> Vec<Circle> {
    let forward = body.forward();
    body.proxies
        .iter()
        .map(|proxy| Circle {
            center: body.position + forward * proxy.offset,
            radius: proxy.radius * body.radius_scale,
        })
        .collect()
}

/// Touching circles count as overlapping.
#[inline]
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    let r = a.radius + b.radius;
    (a.center - b.center).mag_sq() <= r * r
}

/// Whether any proxy of `a` overlaps any proxy of `b`.
pub fn collides(a: &Body, b: &Body) -> bool {
    let ca = proxy_world_positions(a);
    let cb = proxy_world_positions(b);
    ca.iter().any(|p| cb.iter().any(|q| circles_overlap(p, q)))
}

/// Body index pairs `(i, j)`, `i < j`, whose proxy bounding boxes overlap and
/// where at least one side is in flight. Sorted ascending.
pub fn candidate_pairs(bodies: &[Body]) -> Vec<(usize, usize)> {
    let mut rects = bodies
        .iter()
        .enumerate()
        .filter(|(_, body)| body.can_collide())
        .map(|(index, body)| {
            let (min, max) = body.bounds();
            (Rect::new(min.x, max.x, min.y, max.y), index)
        })
        .collect::<Vec<_>>();

    let mut pairs = Vec::new();
    let mut tree = broccoli::Tree::new(&mut rects);

    tree.find_colliding_pairs(|a, b| {
        let a = *a.unpack_inner();
        let b = *b.unpack_inner();
        if bodies[a].is_in_flight() || bodies[b].is_in_flight() {
            pairs.push((a.min(b), a.max(b)));
        }
    });

    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

/// Narrow phase over the broad phase's candidates. Reads only, so it may
/// run on the rayon pool.
pub fn detect(bodies: &[Body], parallel: bool) -> Vec<(usize, usize)> {
    let candidates = candidate_pairs(bodies);
    if parallel {
        candidates
            .into_par_iter()
            .filter(|&(i, j)| collides(&bodies[i], &bodies[j]))
            .collect()
    } else {
        candidates
            .into_iter()
            .filter(|&(i, j)| collides(&bodies[i], &bodies[j]))
            .collect()
    }
}

/// Axis-aligned side of an obstacle an incoming body arrived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Classifies where `point` sits around the box `(min, max)` grown by
/// `margin`, comparing normalized distances from the center.
pub fn approach_side(point: Vec2, min: Vec2, max: Vec2, margin: f32) -> Side {
    let center = (min + max) * 0.5;
    let half = (max - min) * 0.5 + Vec2::broadcast(margin);
    let d = point - center;
    let nx = d.x / half.x.max(f32::EPSILON);
    let ny = d.y / half.y.max(f32::EPSILON);
    if nx.abs() > ny.abs() {
        if nx < 0.0 { Side::Left } else { Side::Right }
    } else if ny >= 0.0 {
        Side::Top
    } else {
        Side::Bottom
    }
}
