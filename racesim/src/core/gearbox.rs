use serde::Deserialize;

/// * `ratios` - Gear ratios (scale the drive acceleration), first entry belongs to first gear
/// * `speed_limits` - Maximum speed reachable in each gear as a fraction of v_max
/// * `upshift_speeds` - Speed fractions at which the automatic shifts up (one entry per gear
/// except the last one)
/// * `downshift_speeds` - Speed fractions at which the automatic shifts down into the gear
/// (one entry per gear except the last one)
/// * `t_shift` - (s) Duration of a gear shift
/// * `shift_power_frac` - Fraction of the drive power that is available during a shift
/// * `rpm_idle` - (1/min) Engine idle speed
/// * `rpm_max` - (1/min) Engine redline
#[derive(Debug, Deserialize, Clone)]
pub struct GearboxPars {
    pub ratios: Vec<f64>,
    pub speed_limits: Vec<f64>,
    pub upshift_speeds: Vec<f64>,
    pub downshift_speeds: Vec<f64>,
    pub t_shift: f64,
    pub shift_power_frac: f64,
    pub rpm_idle: f64,
    pub rpm_max: f64,
}

impl GearboxPars {
    /// The method returns the number of forward gears.
    pub fn no_gears(&self) -> usize {
        self.ratios.len()
    }
}

/// Gearbox models an automatic transmission. It only changes the drive force of the vehicle,
/// the speed itself is integrated in the vehicle model.
#[derive(Debug, Clone)]
pub struct Gearbox {
    pars: GearboxPars,
    gear: usize,
    t_shift_left: f64,
}

impl Gearbox {
    pub fn new(pars: &GearboxPars) -> Gearbox {
        Gearbox {
            pars: pars.to_owned(),
            gear: 1,
            t_shift_left: 0.0,
        }
    }

    /// update counts down a running gear shift and lets the automatic choose the gear for the
    /// current speed fraction (|v| / v_max).
    pub fn update(&mut self, timestep_size: f64, speed_frac: f64) {
        if self.t_shift_left > 0.0 {
            self.t_shift_left = (self.t_shift_left - timestep_size).max(0.0);
        }

        self.auto_shift(speed_frac)
    }

    fn auto_shift(&mut self, speed_frac: f64) {
        if self.is_shifting() {
            return;
        }

        if self.gear < self.pars.no_gears() && speed_frac >= self.pars.upshift_speeds[self.gear - 1]
        {
            self.gear += 1;
            self.t_shift_left = self.pars.t_shift;
        } else if self.gear > 1 && speed_frac <= self.pars.downshift_speeds[self.gear - 2] {
            self.gear -= 1;
            self.t_shift_left = self.pars.t_shift;
        }
    }

    pub fn is_shifting(&self) -> bool {
        self.t_shift_left > 0.0
    }

    pub fn get_gear(&self) -> u32 {
        self.gear as u32
    }

    /// drive_factor returns the factor that is applied to the maximum drive acceleration.
    pub fn drive_factor(&self) -> f64 {
        let ratio = self.pars.ratios[self.gear - 1];

        if self.is_shifting() {
            ratio * self.pars.shift_power_frac
        } else {
            ratio
        }
    }

    /// speed_limit_frac returns the maximum speed of the current gear as a fraction of v_max.
    pub fn speed_limit_frac(&self) -> f64 {
        self.pars.speed_limits[self.gear - 1]
    }

    /// max_drive_factor returns the largest drive factor of all gears (used to estimate the
    /// maximum possible acceleration).
    pub fn max_drive_factor(&self) -> f64 {
        self.pars.ratios.iter().cloned().fold(0.0, f64::max)
    }

    /// calc_rpm estimates the engine speed from the vehicle speed for display purposes.
    pub fn calc_rpm(&self, speed_frac: f64) -> f64 {
        if speed_frac.abs() < 1e-3 {
            return self.pars.rpm_idle;
        }

        let gear_frac = (speed_frac.abs() / self.speed_limit_frac()).min(1.0);
        self.pars.rpm_idle + (self.pars.rpm_max - self.pars.rpm_idle) * gear_frac
    }
}
