use crate::core::collision::{Body, Shape};
use crate::core::gearbox::{Gearbox, GearboxPars};
use helpers::general::{lin_interp, SimError};
use helpers::geometry::{normalize_angle, Point2d, Vector2d};
use serde::Deserialize;

// fraction of the maximum drive acceleration that is available when driving backwards
const REVERSE_ACCEL_FRAC: f64 = 0.5;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    Car,
    Motorcycle,
}

impl VehicleKind {
    /// default_pars returns the physical constants of the vehicle kind. The values are tuning
    /// constants and can be overridden by the parameter file.
    pub fn default_pars(&self) -> VehiclePars {
        match self {
            VehicleKind::Car => VehiclePars {
                kind: VehicleKind::Car,
                mass: 1000.0,
                v_max: 50.0,
                v_rev_max: 50.0 / 3.0,
                a_max: 3.0,
                a_brake: 9.0,
                c_drag: 0.05,
                c_corner_drag: 0.3,
                turn_rate: 2.0,
                turn_curve: vec![[0.0, 0.0], [0.05, 0.6], [0.2, 1.0], [1.0, 0.6]],
                shape: Shape::Rect {
                    length: 4.0,
                    width: 1.8,
                },
                gearbox: Some(GearboxPars {
                    ratios: vec![2.2, 1.6, 1.2, 0.9, 0.7, 0.5],
                    speed_limits: vec![0.16, 0.28, 0.42, 0.58, 0.72, 1.0],
                    upshift_speeds: vec![0.139, 0.25, 0.389, 0.528, 0.667],
                    downshift_speeds: vec![0.111, 0.194, 0.306, 0.417, 0.556],
                    t_shift: 0.6,
                    shift_power_frac: 0.1,
                    rpm_idle: 800.0,
                    rpm_max: 5500.0,
                }),
            },
            VehicleKind::Motorcycle => VehiclePars {
                kind: VehicleKind::Motorcycle,
                mass: 250.0,
                v_max: 50.0,
                v_rev_max: 50.0 / 3.0,
                a_max: 5.0,
                a_brake: 10.0,
                c_drag: 0.02,
                c_corner_drag: 0.2,
                turn_rate: 2.4,
                turn_curve: vec![[0.0, 0.0], [0.05, 0.7], [0.2, 1.0], [1.0, 0.7]],
                shape: Shape::Rect {
                    length: 2.2,
                    width: 0.8,
                },
                gearbox: Some(GearboxPars {
                    ratios: vec![2.0, 1.5, 1.15, 0.9, 0.7],
                    speed_limits: vec![0.25, 0.45, 0.65, 0.85, 1.0],
                    upshift_speeds: vec![0.22, 0.4, 0.6, 0.8],
                    downshift_speeds: vec![0.15, 0.32, 0.5, 0.7],
                    t_shift: 0.3,
                    shift_power_frac: 0.3,
                    rpm_idle: 1000.0,
                    rpm_max: 8000.0,
                }),
            },
        }
    }
}

/// * `kind` - Vehicle kind, i.e. car or motorcycle
/// * `mass` - (kg) Vehicle mass (used to split the collision response)
/// * `v_max` - (m/s) Maximum forward speed
/// * `v_rev_max` - (m/s) Maximum reverse speed (positive value)
/// * `a_max` - (m/s^2) Drive acceleration at full throttle (scaled by the gear ratio)
/// * `a_brake` - (m/s^2) Deceleration at full brake
/// * `c_drag` - (1/s) Exponential speed decay due to air drag and rolling resistance
/// * `c_corner_drag` - (1/s) Additional speed decay at full steering
/// * `turn_rate` - (rad/s) Yaw rate at full steering and a turn curve factor of 1.0
/// * `turn_curve` - [speed fraction (|v| / v_max), factor] pairs, the yaw rate is scaled by the
/// linearly interpolated factor such that the vehicle cannot pivot at standstill and the turning
/// radius widens at high speed
/// * `shape` - Bounding shape used for the collision detection
/// * `gearbox` - Automatic transmission (optional)
#[derive(Debug, Deserialize, Clone)]
pub struct VehiclePars {
    pub kind: VehicleKind,
    pub mass: f64,
    pub v_max: f64,
    pub v_rev_max: f64,
    pub a_max: f64,
    pub a_brake: f64,
    pub c_drag: f64,
    pub c_corner_drag: f64,
    pub turn_rate: f64,
    pub turn_curve: Vec<[f64; 2]>,
    pub shape: Shape,
    pub gearbox: Option<GearboxPars>,
}

/// VehicleParsEntry contains the vehicle parameters as given in the parameter file. Parameters
/// that are not set are taken from the defaults of the vehicle kind.
#[derive(Debug, Deserialize, Clone)]
pub struct VehicleParsEntry {
    pub kind: VehicleKind,
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub v_max: Option<f64>,
    #[serde(default)]
    pub v_rev_max: Option<f64>,
    #[serde(default)]
    pub a_max: Option<f64>,
    #[serde(default)]
    pub a_brake: Option<f64>,
    #[serde(default)]
    pub c_drag: Option<f64>,
    #[serde(default)]
    pub c_corner_drag: Option<f64>,
    #[serde(default)]
    pub turn_rate: Option<f64>,
    #[serde(default)]
    pub turn_curve: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub gearbox: Option<GearboxPars>,
    #[serde(default)]
    pub no_gearbox: bool,
}

impl VehicleParsEntry {
    pub fn get_vehicle_pars(&self) -> VehiclePars {
        let defaults = self.kind.default_pars();

        VehiclePars {
            kind: self.kind,
            mass: self.mass.unwrap_or(defaults.mass),
            v_max: self.v_max.unwrap_or(defaults.v_max),
            v_rev_max: self.v_rev_max.unwrap_or(defaults.v_rev_max),
            a_max: self.a_max.unwrap_or(defaults.a_max),
            a_brake: self.a_brake.unwrap_or(defaults.a_brake),
            c_drag: self.c_drag.unwrap_or(defaults.c_drag),
            c_corner_drag: self.c_corner_drag.unwrap_or(defaults.c_corner_drag),
            turn_rate: self.turn_rate.unwrap_or(defaults.turn_rate),
            turn_curve: self
                .turn_curve
                .to_owned()
                .unwrap_or(defaults.turn_curve),
            shape: self.shape.unwrap_or(defaults.shape),
            gearbox: if self.no_gearbox {
                None
            } else {
                self.gearbox.to_owned().or(defaults.gearbox)
            },
        }
    }
}

/// Controls contains the driver inputs, both values are in the range [-1.0, 1.0]. A positive
/// throttle accelerates forwards, a negative throttle brakes (or drives backwards from
/// standstill). A positive steering turns left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub throttle: f64,
    pub steering: f64,
}

impl Controls {
    pub fn idle() -> Controls {
        Controls::default()
    }

    /// validated rejects non-finite control values and clamps the others into [-1.0, 1.0].
    pub fn validated(&self) -> Result<Controls, SimError> {
        if !self.throttle.is_finite() || !self.steering.is_finite() {
            return Err(SimError::InvalidInput(format!(
                "Controls must be finite, but are throttle {} and steering {}!",
                self.throttle, self.steering
            )));
        }

        Ok(Controls {
            throttle: self.throttle.clamp(-1.0, 1.0),
            steering: self.steering.clamp(-1.0, 1.0),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehicleState {
    pub position: Point2d,
    pub heading: f64,
    pub speed: f64,
    pub controls: Controls,
}

impl VehicleState {
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.heading.is_finite() && self.speed.is_finite()
    }

    pub fn velocity(&self) -> Vector2d {
        Vector2d::from_heading(self.heading).mult(self.speed)
    }
}

/// VehicleModel is the kinematic arcade model of a single vehicle. It turns control inputs into
/// the next state, collisions are applied from outside.
#[derive(Debug, Clone)]
pub struct VehicleModel {
    pars: VehiclePars,
    turn_curve_xp: Vec<f64>,
    turn_curve_fp: Vec<f64>,
    gearbox: Option<Gearbox>,
    state: VehicleState,
}

impl VehicleModel {
    pub fn new(pars: &VehiclePars, position: Point2d, heading: f64) -> VehicleModel {
        VehicleModel {
            pars: pars.to_owned(),
            turn_curve_xp: pars.turn_curve.iter().map(|x| x[0]).collect(),
            turn_curve_fp: pars.turn_curve.iter().map(|x| x[1]).collect(),
            gearbox: pars.gearbox.as_ref().map(Gearbox::new),
            state: VehicleState {
                position,
                heading: normalize_angle(heading),
                speed: 0.0,
                controls: Controls::idle(),
            },
        }
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// The method advances the vehicle by one time step. Execution order:
    /// 1. Update the gearbox (shift timer, automatic gear choice).
    /// 2. Calculate the new speed from throttle/brake, drag, and cornering drag, and clamp it to
    /// [-v_rev_max, v_max].
    /// 3. Calculate the new heading from the steering input and the speed-dependent turn curve.
    /// 4. Integrate the position using the new heading and speed.
    pub fn step(
        &mut self,
        timestep_size: f64,
        controls: &Controls,
    ) -> Result<VehicleState, SimError> {
        if !(timestep_size.is_finite() && timestep_size > 0.0) {
            return Err(SimError::InvalidInput(format!(
                "Time step size must be finite and positive, but is {}!",
                timestep_size
            )));
        }
        let controls = controls.validated()?;

        // gearbox
        let speed_frac = self.state.speed.abs() / self.pars.v_max;
        let (drive_factor, v_limit) = match self.gearbox.as_mut() {
            Some(gearbox) => {
                gearbox.update(timestep_size, speed_frac);
                (
                    gearbox.drive_factor(),
                    gearbox.speed_limit_frac() * self.pars.v_max,
                )
            }
            None => (1.0, self.pars.v_max),
        };

        // longitudinal
        let speed = self.state.speed;
        let throttle = controls.throttle;

        let mut speed_new = if throttle > 0.0 && speed >= 0.0 {
            // driving forwards, acceleration ends at the speed limit of the current gear
            let speed_acc = speed + throttle * self.pars.a_max * drive_factor * timestep_size;
            speed_acc.min(speed.max(v_limit))
        } else if throttle < 0.0 && speed > 0.0 {
            // braking never reverses the direction within a step
            (speed + throttle * self.pars.a_brake * timestep_size).max(0.0)
        } else if throttle > 0.0 && speed < 0.0 {
            (speed + throttle * self.pars.a_brake * timestep_size).min(0.0)
        } else if throttle < 0.0 {
            // driving backwards from standstill
            speed + throttle * self.pars.a_max * REVERSE_ACCEL_FRAC * timestep_size
        } else {
            speed
        };

        let c_drag_tot = self.pars.c_drag + self.pars.c_corner_drag * controls.steering.abs();
        speed_new *= (-c_drag_tot * timestep_size).exp();
        speed_new = speed_new.clamp(-self.pars.v_rev_max, self.pars.v_max);

        // lateral (steering is inverted when driving backwards)
        let turn_factor = lin_interp(
            speed_new.abs() / self.pars.v_max,
            &self.turn_curve_xp,
            &self.turn_curve_fp,
        );
        let direction = if speed_new < 0.0 { -1.0 } else { 1.0 };
        let yaw_rate = controls.steering * self.pars.turn_rate * turn_factor * direction;
        let heading_new = normalize_angle(self.state.heading + yaw_rate * timestep_size);

        // position
        let position_new = self
            .state
            .position
            .shift(&Vector2d::from_heading(heading_new).mult(speed_new * timestep_size));

        self.state = VehicleState {
            position: position_new,
            heading: heading_new,
            speed: speed_new,
            controls,
        };

        Ok(self.state)
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// apply_collision_response shifts the vehicle out of a penetration and scales its speed.
    pub fn apply_collision_response(&mut self, correction: &Vector2d, speed_factor: f64) {
        self.state.position = self.state.position.shift(correction);
        self.state.speed *= speed_factor;
    }

    /// stopping_distance returns the distance required to come to a standstill from the current
    /// speed under maximum braking (drag is neglected, which makes the value conservative).
    pub fn stopping_distance(&self) -> f64 {
        calc_stopping_distance(self.state.speed, self.pars.a_brake)
    }

    /// max_drive_accel returns the largest acceleration the vehicle can reach in any gear.
    pub fn max_drive_accel(&self) -> f64 {
        let factor = match &self.gearbox {
            Some(gearbox) => gearbox.max_drive_factor(),
            None => 1.0,
        };
        self.pars.a_max * factor
    }

    pub fn get_state(&self) -> &VehicleState {
        &self.state
    }

    pub fn get_pars(&self) -> &VehiclePars {
        &self.pars
    }

    pub fn get_body(&self) -> Body {
        Body {
            center: self.state.position,
            heading: self.state.heading,
            shape: self.pars.shape,
        }
    }

    /// get_gear_info returns the current gear and engine speed if a gearbox is fitted.
    pub fn get_gear_info(&self) -> Option<(u32, f64)> {
        self.gearbox.as_ref().map(|gearbox| {
            (
                gearbox.get_gear(),
                gearbox.calc_rpm(self.state.speed / self.pars.v_max),
            )
        })
    }
}

/// calc_stopping_distance returns the braking distance for the given speed and deceleration.
pub fn calc_stopping_distance(speed: f64, a_brake: f64) -> f64 {
    speed.powi(2) / (2.0 * a_brake)
}
