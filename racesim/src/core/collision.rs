use helpers::geometry::{Point2d, Vector2d};
use serde::Deserialize;
use std::cmp::Ordering;

/// Bounding shape of a vehicle or an obstacle. Rectangles are oriented by the heading of the body
/// they belong to (length along the heading, width perpendicular to it).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: f64 },
    Rect { length: f64, width: f64 },
}

impl Shape {
    /// is_degenerate returns true if the shape has no positive, finite extent.
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Shape::Circle { radius } => !(radius.is_finite() && radius > 0.0),
            Shape::Rect { length, width } => {
                !(length.is_finite() && length > 0.0 && width.is_finite() && width > 0.0)
            }
        }
    }

    /// min_half_extent returns the smallest distance between the center and the boundary.
    pub fn min_half_extent(&self) -> f64 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Rect { length, width } => 0.5 * length.min(width),
        }
    }

    /// bounding_radius returns the radius of the smallest circle around the center that contains
    /// the shape.
    pub fn bounding_radius(&self) -> f64 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Rect { length, width } => 0.5 * (length.powi(2) + width.powi(2)).sqrt(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub center: Point2d,
    pub heading: f64,
    pub shape: Shape,
}

impl Body {
    fn axes(&self) -> (Vector2d, Vector2d) {
        let u = Vector2d::from_heading(self.heading);
        let v = u.normal_vector();
        (u, v)
    }

    /// half_projection returns half the length of the projection of the body onto the axis.
    fn half_projection(&self, axis: &Vector2d) -> f64 {
        match self.shape {
            Shape::Circle { radius } => radius,
            Shape::Rect { length, width } => {
                let (u, v) = self.axes();
                0.5 * length * u.dot(axis).abs() + 0.5 * width * v.dot(axis).abs()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Entity {
    Vehicle(usize),
    Obstacle(usize),
}

/// Contact between two bodies. The normal points from the first towards the second body.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub point: Point2d,
    pub normal: Vector2d,
    pub depth: f64,
}

/// CollisionEvent is created for every overlapping entity pair within a single time step. The
/// first entity is always a vehicle.
#[derive(Debug, Clone, Copy)]
pub struct CollisionEvent {
    pub entity_a: Entity,
    pub entity_b: Entity,
    pub contact: Point2d,
    pub normal: Vector2d,
    pub depth: f64,
}

/// detect returns all overlaps between the vehicles and between vehicles and static obstacles.
/// The events are sorted by descending penetration depth (most severe first), ties are broken by
/// the entity indices such that the order is deterministic.
pub fn detect(vehicles: &[Body], obstacles: &[Body]) -> Vec<CollisionEvent> {
    let mut events = Vec::new();

    for (i, vehicle) in vehicles.iter().enumerate() {
        for (j, other) in vehicles.iter().enumerate().skip(i + 1) {
            if let Some(contact) = test_overlap(vehicle, other) {
                events.push(CollisionEvent {
                    entity_a: Entity::Vehicle(i),
                    entity_b: Entity::Vehicle(j),
                    contact: contact.point,
                    normal: contact.normal,
                    depth: contact.depth,
                });
            }
        }

        for (k, obstacle) in obstacles.iter().enumerate() {
            if let Some(contact) = test_overlap(vehicle, obstacle) {
                events.push(CollisionEvent {
                    entity_a: Entity::Vehicle(i),
                    entity_b: Entity::Obstacle(k),
                    contact: contact.point,
                    normal: contact.normal,
                    depth: contact.depth,
                });
            }
        }
    }

    events.sort_by(|a, b| {
        b.depth
            .partial_cmp(&a.depth)
            .unwrap_or(Ordering::Equal)
            .then_with(|| (a.entity_a, a.entity_b).cmp(&(b.entity_a, b.entity_b)))
    });

    events
}

/// test_overlap checks two bodies for a strict overlap (touching is not an overlap) and returns
/// the contact information in that case.
pub fn test_overlap(a: &Body, b: &Body) -> Option<Contact> {
    // bounding circle pre-check
    let delta = a.center.vector_to(&b.center);
    if delta.abs() >= a.shape.bounding_radius() + b.shape.bounding_radius() {
        return None;
    }

    match (a.shape, b.shape) {
        (Shape::Circle { radius: r_a }, Shape::Circle { radius: r_b }) => {
            circle_circle(&a.center, r_a, &b.center, r_b)
        }
        (Shape::Rect { .. }, Shape::Circle { radius }) => rect_circle(a, &b.center, radius),
        (Shape::Circle { radius }, Shape::Rect { .. }) => {
            rect_circle(b, &a.center, radius).map(|contact| Contact {
                point: contact.point,
                normal: contact.normal.mult(-1.0),
                depth: contact.depth,
            })
        }
        (Shape::Rect { .. }, Shape::Rect { .. }) => rect_rect(a, b),
    }
}

fn circle_circle(c_a: &Point2d, r_a: f64, c_b: &Point2d, r_b: f64) -> Option<Contact> {
    let delta = c_a.vector_to(c_b);
    let dist = delta.abs();
    let depth = r_a + r_b - dist;

    if depth <= 0.0 {
        return None;
    }

    // concentric circles have no preferred direction
    let normal = if dist > 1e-12 {
        delta.mult(1.0 / dist)
    } else {
        Vector2d { dx: 1.0, dy: 0.0 }
    };

    Some(Contact {
        point: c_a.shift(&normal.mult(r_a - 0.5 * depth)),
        normal,
        depth,
    })
}

/// rect_circle returns the contact with the normal pointing from the rectangle to the circle.
fn rect_circle(rect: &Body, center: &Point2d, radius: f64) -> Option<Contact> {
    let (half_length, half_width) = match rect.shape {
        Shape::Rect { length, width } => (0.5 * length, 0.5 * width),
        Shape::Circle { .. } => return None,
    };
    let (u, v) = rect.axes();

    // circle center in the local frame of the rectangle
    let delta = rect.center.vector_to(center);
    let lx = delta.dot(&u);
    let ly = delta.dot(&v);

    let (normal_local, depth, closest) = if lx.abs() <= half_length && ly.abs() <= half_width {
        // center inside the rectangle -> push out along the axis with the smaller exit distance
        let exit_x = half_length - lx.abs();
        let exit_y = half_width - ly.abs();
        let sign_x = if lx >= 0.0 { 1.0 } else { -1.0 };
        let sign_y = if ly >= 0.0 { 1.0 } else { -1.0 };

        if exit_x <= exit_y {
            (
                (sign_x, 0.0),
                radius + exit_x,
                (sign_x * half_length, ly),
            )
        } else {
            (
                (0.0, sign_y),
                radius + exit_y,
                (lx, sign_y * half_width),
            )
        }
    } else {
        let cx = lx.clamp(-half_length, half_length);
        let cy = ly.clamp(-half_width, half_width);
        let (dx, dy) = (lx - cx, ly - cy);
        let dist = (dx.powi(2) + dy.powi(2)).sqrt();
        let depth = radius - dist;

        if depth <= 0.0 {
            return None;
        }
        ((dx / dist, dy / dist), depth, (cx, cy))
    };

    Some(Contact {
        point: rect
            .center
            .shift(&u.mult(closest.0).add(&v.mult(closest.1))),
        normal: u.mult(normal_local.0).add(&v.mult(normal_local.1)),
        depth,
    })
}

/// rect_rect implements the separating axis test for two oriented rectangles. The axis with the
/// smallest overlap determines normal and penetration depth.
fn rect_rect(a: &Body, b: &Body) -> Option<Contact> {
    let (u_a, v_a) = a.axes();
    let (u_b, v_b) = b.axes();
    let delta = a.center.vector_to(&b.center);

    let mut depth = f64::INFINITY;
    let mut normal = u_a;
    let mut half_proj_a_best = 0.0;

    for axis in [u_a, v_a, u_b, v_b].iter() {
        let half_proj_a = a.half_projection(axis);
        let half_proj_b = b.half_projection(axis);
        let dist = delta.dot(axis);
        let overlap = half_proj_a + half_proj_b - dist.abs();

        if overlap <= 0.0 {
            return None;
        }

        if overlap < depth {
            depth = overlap;
            normal = if dist >= 0.0 { *axis } else { axis.mult(-1.0) };
            half_proj_a_best = half_proj_a;
        }
    }

    Some(Contact {
        point: a.center.shift(&normal.mult(half_proj_a_best - 0.5 * depth)),
        normal,
        depth,
    })
}
