use crate::core::npc::{NpcController, NpcPars, VehicleView, WorldView};
use crate::core::progress::ProgressHandler;
use crate::core::track::Track;
use crate::core::vehicle::{Controls, VehicleModel, VehiclePars};
use crate::interfaces::hud_interface::RgbColor;
use helpers::general::SimError;
use helpers::geometry::Point2d;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    Npc,
}

/// * `car_no` - Car number, e.g. 7
/// * `name` - Name displayed in the HUD
/// * `role` - Player (externally controlled) or NPC (controlled by the waypoint follower)
/// * `vehicle` - Key of the vehicle parameters in vehicle_pars_all
/// * `color` - Hex-code of the car color (used for rendering)
/// * `position` - (m) Start position
/// * `heading` - (rad) Start heading
/// * `start_wp` - Index of the first waypoint the car drives towards
/// * `npc_pars` - Parameters of the waypoint follower (defaults are used if not set)
#[derive(Debug, Deserialize, Clone)]
pub struct CarPars {
    pub car_no: u32,
    pub name: String,
    pub role: Role,
    pub vehicle: String,
    pub color: String,
    pub position: Point2d,
    pub heading: f64,
    pub start_wp: usize,
    #[serde(default)]
    pub npc_pars: Option<NpcPars>,
}

#[derive(Debug, Clone)]
pub struct Car {
    pub car_no: u32,
    pub name: String,
    pub role: Role,
    pub racing: bool, // false for traffic spawned during the race
    pub color: RgbColor,
    pub vehicle: VehicleModel,
    pub npc: Option<NpcController>,
    pub ph: ProgressHandler,
    npc_pars: NpcPars,
    start_wp: usize,
}

impl Car {
    pub fn new(
        car_pars: &CarPars,
        vehicle_pars: &VehiclePars,
        track: &Track,
        racing: bool,
    ) -> Result<Car, SimError> {
        let color = parse_color(&car_pars.color)?;
        let npc_pars = car_pars.npc_pars.to_owned().unwrap_or_default();
        let ph = ProgressHandler::new(track, car_pars.start_wp, car_pars.position);

        // the follower drives towards the next gate of the race progress
        let npc = match car_pars.role {
            Role::Npc => Some(NpcController::new(
                &npc_pars,
                ph.get_next_wp().unwrap_or(car_pars.start_wp),
            )),
            Role::Player => None,
        };

        Ok(Car {
            car_no: car_pars.car_no,
            name: car_pars.name.to_owned(),
            role: car_pars.role,
            racing,
            color,
            vehicle: VehicleModel::new(vehicle_pars, car_pars.position, car_pars.heading),
            npc,
            ph,
            npc_pars,
            start_wp: car_pars.start_wp,
        })
    }

    /// enable_autopilot lets the waypoint follower drive a player car. The follower starts at the
    /// next waypoint of the race progress.
    pub fn enable_autopilot(&mut self) {
        if self.npc.is_none() {
            let start_wp = self.ph.get_next_wp().unwrap_or(self.start_wp);
            self.npc = Some(NpcController::new(&self.npc_pars, start_wp));
        }
    }

    /// decide returns the controls for the next time step, player cars without autopilot keep the
    /// externally set controls.
    pub fn decide(
        &mut self,
        view: &VehicleView,
        world_view: &WorldView,
        timestep_size: f64,
        player_controls: &Controls,
    ) -> Controls {
        match self.npc.as_mut() {
            Some(npc) => npc.decide(view, world_view, timestep_size),
            None => *player_controls,
        }
    }

    pub fn get_view(&self) -> VehicleView {
        VehicleView {
            car_no: self.car_no,
            state: *self.vehicle.get_state(),
            a_brake: self.vehicle.get_pars().a_brake,
            a_drive_max: self.vehicle.max_drive_accel(),
            bounding_radius: self.vehicle.get_pars().shape.bounding_radius(),
        }
    }

    pub fn get_mass(&self) -> f64 {
        self.vehicle.get_pars().mass
    }
}

/// parse_color converts a hex color into a rgb color.
pub fn parse_color(color: &str) -> Result<RgbColor, SimError> {
    let tmp_color = color
        .parse::<css_color_parser::Color>()
        .map_err(|_| SimError::ConfigurationError(format!("Could not parse color {}!", color)))?;

    Ok(RgbColor {
        r: tmp_color.r,
        g: tmp_color.g,
        b: tmp_color.b,
    })
}
