use ecosim::simulation::snapshot::{OrganismSnapshot, WorldSnapshot};
use ecosim::simulation::params::DisplayOptions;
use macroquad::prelude::*;

/// Maps world coordinates onto the window, preserving aspect ratio.
struct Viewport {
    scale: f32,
}

impl Viewport {
    fn fit(snapshot: &WorldSnapshot) -> Self {
        let scale_x = screen_width() / snapshot.width as f32;
        let scale_y = screen_height() / snapshot.height as f32;
        Self {
            scale: scale_x.min(scale_y),
        }
    }
}

trait ToScreen {
    type Output;
    fn to_screen(&self, view: &Viewport) -> Self::Output;
}

impl ToScreen for [f64; 2] {
    type Output = Vec2;
    fn to_screen(&self, view: &Viewport) -> Vec2 {
        vec2(self[0] as f32 * view.scale, self[1] as f32 * view.scale)
    }
}

impl ToScreen for f64 {
    type Output = f32;
    fn to_screen(&self, view: &Viewport) -> f32 {
        *self as f32 * view.scale
    }
}

/// Draws every organism and the enabled overlays.
pub fn draw_world(snapshot: &WorldSnapshot, display: DisplayOptions) {
    let view = Viewport::fit(snapshot);

    if display.show_quadtree {
        draw_leaves(&snapshot.plant_leaves, &view, Color::from_rgba(0, 120, 0, 90));
        draw_leaves(&snapshot.animal_leaves, &view, Color::from_rgba(120, 0, 0, 90));
    }
    for plant in &snapshot.plants {
        draw_organism(plant, &view, display);
    }
    for animal in &snapshot.animals {
        draw_organism(animal, &view, display);
    }
}

fn draw_leaves(leaves: &[[f64; 4]], view: &Viewport, color: Color) {
    for &[x, y, w, h] in leaves {
        let origin = [x, y].to_screen(view);
        draw_rectangle_lines(origin.x, origin.y, w.to_screen(view), h.to_screen(view), 1.0, color);
    }
}

fn draw_organism(entity: &OrganismSnapshot, view: &Viewport, display: DisplayOptions) {
    let pos = [entity.location.x, entity.location.y].to_screen(view);
    let radius = (entity.size / 2.0).to_screen(view).max(1.0);
    let [r, g, b] = entity.color;
    draw_circle(pos.x, pos.y, radius, Color::from_rgba(r, g, b, 255));

    let bar_width = (radius * 2.0).max(6.0);
    let bar_height = 2.0;
    let mut bar_y = pos.y - radius - bar_height - 2.0;
    if display.show_health {
        draw_bar(pos.x, bar_y, bar_width, bar_height, entity.health_ratio, RED);
        bar_y -= bar_height + 1.0;
    }
    if display.show_energy {
        draw_bar(pos.x, bar_y, bar_width, bar_height, entity.energy_ratio, GOLD);
    }
}

fn draw_bar(center_x: f32, y: f32, width: f32, height: f32, fill: f64, color: Color) {
    let x = center_x - width / 2.0;
    draw_rectangle(x, y, width, height, Color::from_rgba(100, 100, 100, 200));
    draw_rectangle(x, y, width * fill.clamp(0.0, 1.0) as f32, height, color);
}

/// Draws the population counters and the tick period.
pub fn draw_status(snapshot: &WorldSnapshot, tick_period_ms: f64, paused: bool) {
    let stats = &snapshot.stats;
    let lines = [
        format!(
            "tick {}  period {:.0} ms{}",
            stats.tick,
            tick_period_ms,
            if paused { "  [paused]" } else { "" }
        ),
        format!(
            "animals {}  generation {:.1}  pending {}",
            stats.animals.species.count, stats.animals.avg_generation, stats.pending_events
        ),
        format!("plants {}", stats.plants.count),
    ];
    for (i, line) in lines.iter().enumerate() {
        draw_text(line, 10.0, 20.0 + i as f32 * 18.0, 18.0, BLACK);
    }
}
