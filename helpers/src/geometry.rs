use approx::ulps_eq;
use serde::Deserialize;
use std::f64::consts::{PI, TAU};

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub fn new(x: f64, y: f64) -> Point2d {
        Point2d { x, y }
    }
    pub fn as_vector2d(&self) -> Vector2d {
        Vector2d {
            dx: self.x,
            dy: self.y,
        }
    }
    pub fn shift(&self, other: &Vector2d) -> Point2d {
        self.as_vector2d().add(other).as_point2d()
    }
    /// vector_to returns the vector pointing from self to other.
    pub fn vector_to(&self, other: &Point2d) -> Vector2d {
        other.as_vector2d().sub(&self.as_vector2d())
    }
    pub fn distance(&self, other: &Point2d) -> f64 {
        self.vector_to(other).abs()
    }
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl PartialEq for Point2d {
    fn eq(&self, other: &Self) -> bool {
        ulps_eq!(self.x, other.x) && ulps_eq!(self.y, other.y)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct Vector2d {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2d {
    /// from_heading returns the unit vector for the given heading (0 rad points in x direction,
    /// positive angles turn counter-clockwise).
    pub fn from_heading(heading: f64) -> Vector2d {
        Vector2d {
            dx: heading.cos(),
            dy: heading.sin(),
        }
    }
    pub fn as_point2d(&self) -> Point2d {
        Point2d {
            x: self.dx,
            y: self.dy,
        }
    }
    pub fn sub(&self, other: &Self) -> Vector2d {
        Vector2d {
            dx: self.dx - other.dx,
            dy: self.dy - other.dy,
        }
    }
    pub fn add(&self, other: &Self) -> Vector2d {
        Vector2d {
            dx: self.dx + other.dx,
            dy: self.dy + other.dy,
        }
    }
    pub fn mult(&self, k: f64) -> Vector2d {
        Vector2d {
            dx: self.dx * k,
            dy: self.dy * k,
        }
    }
    pub fn dot(&self, other: &Self) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }
    /// convenience function (strictly speaking, the cross product is not defined in a 2D space)
    pub fn cross(&self, other: &Self) -> f64 {
        self.dx * other.dy - self.dy * other.dx
    }
    pub fn abs(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2)).sqrt()
    }
    pub fn normal_vector(&self) -> Vector2d {
        Vector2d {
            dx: -self.dy,
            dy: self.dx,
        }
    }
    pub fn normalized(&self) -> Vector2d {
        self.mult(1.0 / self.abs())
    }
    /// heading returns the angle of the vector in the range [0, 2 * pi).
    pub fn heading(&self) -> f64 {
        normalize_angle(self.dy.atan2(self.dx))
    }
}

impl PartialEq for Vector2d {
    fn eq(&self, other: &Self) -> bool {
        ulps_eq!(self.dx, other.dx) && ulps_eq!(self.dy, other.dy)
    }
}

/// normalize_angle maps an angle into the range [0, 2 * pi).
pub fn normalize_angle(angle: f64) -> f64 {
    let tmp_angle = angle.rem_euclid(TAU);

    // rem_euclid can round up to exactly 2 * pi for tiny negative inputs
    if tmp_angle >= TAU {
        0.0
    } else {
        tmp_angle
    }
}

/// wrap_to_pi maps an angle into the range [-pi, pi), e.g. to get a signed heading error.
pub fn wrap_to_pi(angle: f64) -> f64 {
    normalize_angle(angle + PI) - PI
}
