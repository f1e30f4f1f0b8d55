use ecosim::simulation::ecosystem::Simulation;
use ecosim::simulation::params::Params;
use macroquad::prelude::*;
use tracing::{error, info, warn};

mod graphics;

const MIN_TICK_PERIOD_MS: f64 = 1.0;
const MAX_TICK_PERIOD_MS: f64 = 1000.0;

fn load_params() -> Params {
    let Some(path) = std::env::args().nth(1) else {
        return Params::default();
    };
    match Params::from_json_file(&path) {
        Ok(params) => {
            info!(%path, "loaded parameters");
            params
        }
        Err(err) => {
            error!(%path, %err, "could not load parameters, using defaults");
            Params::default()
        }
    }
}

#[macroquad::main("Ecosim")]
async fn main() {
    ecosim::init_logging();

    let mut sim = match Simulation::from_params(load_params()) {
        Ok(sim) => sim,
        Err(err) => {
            error!(%err, "invalid configuration");
            return;
        }
    };

    let mut paused = false;
    let mut backlog_ms = 0.0;

    loop {
        let mut display = sim.display();
        if is_key_pressed(KeyCode::H) {
            display.show_health = !display.show_health;
        }
        if is_key_pressed(KeyCode::E) {
            display.show_energy = !display.show_energy;
        }
        if is_key_pressed(KeyCode::Q) {
            display.show_quadtree = !display.show_quadtree;
        }
        sim.set_display(display);

        let period = sim.params().tick_period_ms;
        let requested = if is_key_pressed(KeyCode::Up) {
            Some((period * 2.0).min(MAX_TICK_PERIOD_MS))
        } else if is_key_pressed(KeyCode::Down) {
            Some((period / 2.0).max(MIN_TICK_PERIOD_MS))
        } else {
            None
        };
        if let Some(ms) = requested {
            match sim.set_tick_period_ms(ms) {
                Ok(()) => info!(tick_period_ms = ms, "tick period changed"),
                Err(err) => warn!(%err, "tick period unchanged"),
            }
        }
        if is_key_pressed(KeyCode::Space) {
            paused = !paused;
        }

        if !paused {
            backlog_ms += f64::from(get_frame_time()) * 1000.0;
            let period = sim.params().tick_period_ms;
            // cap the catch-up work of one frame
            let mut budget = 100;
            while backlog_ms >= period && budget > 0 {
                sim.tick();
                backlog_ms -= period;
                budget -= 1;
            }
            if budget == 0 {
                backlog_ms = 0.0;
            }
        }

        clear_background(WHITE);
        let snapshot = sim.snapshot();
        graphics::draw_world(&snapshot, sim.display());
        graphics::draw_status(&snapshot, sim.params().tick_period_ms, paused);

        next_frame().await
    }
}
