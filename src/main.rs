//! Bubble Field entry point
//!
//! On native this runs a short headless session and logs what happened. The
//! browser build is driven from JS through `platform::web`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bubble Field (native) starting...");

    let config = match std::env::args().nth(1) {
        Some(arg) => match load_config(&arg) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => bubble_field::SimConfig::default(),
    };

    demo::run(config);
}

/// A quality preset name (`low`, `medium`, `high`) or a path to a JSON config
#[cfg(not(target_arch = "wasm32"))]
fn load_config(arg: &str) -> Result<bubble_field::SimConfig, String> {
    if let Some(preset) = bubble_field::QualityPreset::from_str(arg) {
        log::info!("Using {preset:?} quality preset");
        return Ok(bubble_field::SimConfig::from_preset(preset));
    }

    let json =
        std::fs::read_to_string(arg).map_err(|e| format!("Failed to read config {arg}: {e}"))?;
    bubble_field::SimConfig::from_json(&json).map_err(|e| format!("Invalid config {arg}: {e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::RefCell;
    use std::rc::Rc;

    use bubble_field::consts::SIM_DT;
    use bubble_field::{Bounds, BubbleField, BubblePayload, SimConfig};
    use glam::Vec2;

    const DEMO_TICKS: u32 = 600;

    fn payloads() -> Vec<BubblePayload> {
        [
            ("Organic Reach", "+48%", "Local search visibility after three months"),
            ("Review Volume", "3.2x", "Monthly reviews compared to the prior year"),
            ("Call Volume", "+27%", "Inbound calls from map listings"),
            ("Keyword Rank", "#3", "Average position for tracked keywords"),
            ("Social Followers", "+1.9k", "Net new followers across profiles"),
            ("Lead Value", "$14k", "Estimated monthly pipeline"),
            ("Ad Savings", "$2.1k", "Paid spend replaced by organic traffic"),
            ("Response Time", "-61%", "Median time to answer new leads"),
        ]
        .into_iter()
        .map(|(title, stat, description)| BubblePayload::new(title, stat, description))
        .collect()
    }

    pub fn run(config: SimConfig) {
        let bounds = Bounds::new(800.0, 600.0);
        let mut field = BubbleField::with_payloads(config, bounds, payloads());

        let selected = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&selected);
        field.on_select(move |payload: &BubblePayload| {
            log::info!("Selected \"{}\" ({})", payload.title, payload.stat);
            sink.borrow_mut().push(payload.title.clone());
        });

        let mut peak_burst = 0;
        for tick in 0..DEMO_TICKS {
            // Sweep the pointer across the field in a slow ellipse
            let t = tick as f32 * SIM_DT;
            let pointer = bounds.center() + Vec2::new(t.cos() * 300.0, (t * 0.7).sin() * 200.0);

            if tick == 120 || tick == 360 {
                if let Some(target) = field.bubbles().get(3).map(|b| b.pos) {
                    let outcome = field.pointer_pressed(target);
                    log::info!("Press on bubble #3 at tick {tick}: {outcome:?}");
                }
            }

            field.step(SIM_DT, Some(pointer));
            peak_burst = peak_burst.max(field.burst_count());
        }

        log::info!(
            "Demo finished: {} ticks, {} bubbles, {} ambient, peak burst {}, selection {:?}",
            field.time_ticks(),
            field.bubbles().len(),
            field.ambient_count(),
            peak_burst,
            field.selection()
        );
        for bubble in field.bubbles() {
            log::info!(
                "  #{} {:<16} pos=({:6.1}, {:6.1}) r={:5.1}",
                bubble.id.0,
                bubble.payload.title,
                bubble.pos.x,
                bubble.pos.y,
                bubble.radius
            );
        }
        log::info!("Selections: {:?}", selected.borrow());

        field.destroy();
    }
}
