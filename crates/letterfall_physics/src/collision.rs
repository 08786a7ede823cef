//! Letters colliding with each other.
//!
//! Only used when `pairwise_collisions` is enabled. Every body is treated as a circle of radius
//! `half_extent`. This is deliberately much cruder than the walls and floor: overlaps are pushed
//! apart in one pass, with no iteration towards a stable stack.

use std::collections::VecDeque;

use glam::Vec2;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::particle::Particle;

/// A body's centre in the spatial index, tagged with its index in the live set.
type IndexedPoint = GeomWithData<[f32; 2], usize>;

/// Push overlapping bodies apart and exchange an impulse along the contact normal.
///
/// Lighter bodies move further. Returns the number of contacts that were resolved.
pub fn resolve_pairs(particles: &mut VecDeque<Particle>, restitution: f32) -> usize {
    if particles.len() < 2 {
        return 0;
    }

    let largest_half = particles
        .iter()
        .map(Particle::half_extent)
        .fold(0.0_f32, f32::max);
    let tree = RTree::bulk_load(
        particles
            .iter()
            .enumerate()
            .map(|(index, particle)| {
                IndexedPoint::new([particle.position.x, particle.position.y], index)
            })
            .collect(),
    );

    let mut contacts = 0;
    for index in 0..particles.len() {
        let Some(particle) = particles.get(index) else {
            continue;
        };
        let reach = particle.half_extent() + largest_half;
        let centre = [particle.position.x, particle.position.y];

        let mut neighbours: Vec<usize> = tree
            .locate_within_distance(centre, reach * reach)
            .map(|point| point.data)
            .filter(|other| *other > index)
            .collect();
        neighbours.sort_unstable();

        for other in neighbours {
            if resolve_pair(particles, index, other, restitution) {
                contacts += 1;
            }
        }
    }

    if contacts > 0 {
        tracing::trace!("Resolved {contacts} letter contacts");
    }
    contacts
}

/// Resolve a single pair, returning whether they were touching.
fn resolve_pair(
    particles: &mut VecDeque<Particle>,
    first: usize,
    second: usize,
    restitution: f32,
) -> bool {
    let (Some(a), Some(b)) = (particles.get(first), particles.get(second)) else {
        return false;
    };

    let offset = b.position - a.position;
    let distance = offset.length();
    let touching = a.half_extent() + b.half_extent();
    if distance >= touching {
        return false;
    }

    // Coincident centres have no meaningful normal, so just separate them vertically.
    let normal = if distance > f32::EPSILON {
        offset / distance
    } else {
        Vec2::Y
    };

    let weight_a = inverse_mass(a.mass);
    let weight_b = inverse_mass(b.mass);
    let total_weight = weight_a + weight_b;
    if total_weight <= 0.0 {
        return false;
    }

    let penetration = touching - distance;
    let approach = (b.velocity - a.velocity).dot(normal);
    let impulse = if approach < 0.0 {
        -(1.0 + restitution) * approach / total_weight
    } else {
        0.0
    };

    if let Some(a) = particles.get_mut(first) {
        a.position -= normal * penetration * (weight_a / total_weight);
        a.velocity -= normal * impulse * weight_a;
    }
    if let Some(b) = particles.get_mut(second) {
        b.position += normal * penetration * (weight_b / total_weight);
        b.velocity += normal * impulse * weight_b;
    }

    true
}

/// Bodies without a positive mass are treated as immovable.
fn inverse_mass(mass: f32) -> f32 {
    if mass > 0.0 {
        1.0 / mass
    } else {
        0.0
    }
}
