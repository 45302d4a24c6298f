use flume::Receiver;
use helpers::buffer::RingBuffer;
use helpers::general::argmax;
use racesim::core::car::Role;
use racesim::interfaces::hud_interface::{VehicleSnapshot, WorldSnapshot};
use std::fmt::Write;
use std::time::Instant;

/// HudPrinter receives the world snapshots from the simulation thread and prints a text HUD for
/// every snapshot until the simulation thread closes the channel.
#[derive(Debug)]
pub struct HudPrinter {
    pub rx: Receiver<WorldSnapshot>,
    pub tot_no_laps: u32,
    pub prev_update: Instant,
    pub prev_update_durations: RingBuffer<u32>,
}

impl HudPrinter {
    pub fn new(rx: Receiver<WorldSnapshot>, tot_no_laps: u32) -> HudPrinter {
        HudPrinter {
            rx,
            tot_no_laps,
            prev_update: Instant::now(),
            prev_update_durations: RingBuffer::new(10),
        }
    }

    /// run blocks until the sender is dropped, i.e. until the race is simulated completely.
    pub fn run(&mut self) {
        while let Ok(snapshot) = self.rx.recv() {
            // update frequency
            self.prev_update_durations
                .push(self.prev_update.elapsed().as_millis() as u32);
            self.prev_update = Instant::now();

            println!("{}", self.get_hud_text(&snapshot));
        }
    }

    /// get_hud_text creates the HUD lines for the inserted snapshot.
    pub fn get_hud_text(&self, snapshot: &WorldSnapshot) -> String {
        let mut hud_text = String::new();

        // general race information
        write!(
            &mut hud_text,
            "t = {:7.2}s | lap {}/{}",
            snapshot.t_race,
            snapshot.cur_lap_leader.min(self.tot_no_laps),
            self.tot_no_laps
        )
        .unwrap();

        if snapshot.chequered {
            write!(&mut hud_text, " | chequered flag").unwrap();
        }

        // race leader
        let racing: Vec<&VehicleSnapshot> =
            snapshot.vehicles.iter().filter(|vehicle| vehicle.racing).collect();

        if !racing.is_empty() {
            let race_progs: Vec<f64> = racing.iter().map(|vehicle| vehicle.race_prog).collect();
            write!(&mut hud_text, " | leader {}", racing[argmax(&race_progs)].name).unwrap();
        }

        // focused vehicle (player if available)
        let focus = snapshot
            .vehicles
            .iter()
            .find(|vehicle| vehicle.role == Role::Player)
            .or_else(|| racing.first().copied());

        if let Some(vehicle) = focus {
            write!(
                &mut hud_text,
                "\n  {} ({:?}) {:6.1} km/h",
                vehicle.name, vehicle.kind, vehicle.speed_kmh
            )
            .unwrap();

            if let (Some(gear), Some(rpm)) = (vehicle.gear, vehicle.rpm) {
                write!(&mut hud_text, " | gear {} | {:4.0} rpm", gear, rpm).unwrap();
            }

            match vehicle.next_wp {
                Some(next_wp) => write!(&mut hud_text, " | next waypoint {}", next_wp).unwrap(),
                None => write!(&mut hud_text, " | end of path").unwrap(),
            }

            if vehicle.finished {
                write!(&mut hud_text, " | finished").unwrap();
            } else if vehicle.retired {
                write!(&mut hud_text, " | retired").unwrap();
            }
        }

        // traffic lights and traffic
        if !snapshot.lights.is_empty() {
            write!(&mut hud_text, "\n  lights:").unwrap();

            for light in snapshot.lights.iter() {
                write!(&mut hud_text, " {}={:?}", light.id, light.phase).unwrap();
            }
        }

        write!(
            &mut hud_text,
            " | traffic {} | HUD {:.0} Hz",
            snapshot.vehicles.len() - racing.len(),
            self.get_update_frequency()
        )
        .unwrap();

        hud_text
    }

    fn get_update_frequency(&self) -> f64 {
        match self.prev_update_durations.get_avg() {
            Some(avg) if avg > 0.0 => 1000.0 / avg,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod hud_tests {
    use super::HudPrinter;
    use racesim::core::world::RaceWorld;
    use racesim::pre::read_sim_pars::read_sim_pars;
    use std::path::Path;

    #[test]
    fn test_run_returns_when_sender_is_dropped() {
        let parfile_path =
            Path::new(env!("CARGO_MANIFEST_DIR")).join("../input/parameters/pars_city_loop.json");
        let sim_pars = read_sim_pars(parfile_path.as_path()).unwrap();
        let world = RaceWorld::new(&sim_pars).unwrap();

        let (tx, rx) = flume::unbounded();
        tx.send(world.snapshot()).unwrap();
        tx.send(world.snapshot()).unwrap();
        drop(tx);

        let mut hud = HudPrinter::new(rx, sim_pars.race_pars.tot_no_laps);
        hud.run();
        assert!(hud.rx.is_empty());

        let hud_text = hud.get_hud_text(&world.snapshot());
        assert!(hud_text.starts_with("t =    0.00s"));
        assert!(!hud_text.contains("retired"));
    }
}
