//! Strata Runtime
//!
//! Headless host: loads settings, runs the demo pipeline for a fixed number
//! of ticks and reports what happened.
//!
//! Usage: `strata [settings.json]`

mod demo;
mod settings;

use anyhow::{Context, Result};
use settings::Settings;
use std::path::PathBuf;
use strata_core::ecs::World;
use strata_metrics::TickTimer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(path.as_deref())?;

    // RUST_LOG wins over the settings file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Strata v{}", strata_core::VERSION);
    if !strata_metrics::ENABLED {
        warn!("built without metrics, timings will read zero");
    }

    let mut world = World::with_config(settings.world.clone());
    demo::install(&mut world, settings.spawn_per_tick);
    info!(
        ticks = settings.ticks,
        systems = world.systems().len(),
        "simulation starting"
    );

    let mut timer = TickTimer::new(120);
    for _ in 0..settings.ticks {
        timer.begin();
        let result = world
            .update()
            .with_context(|| format!("tick {} aborted", world.tick()))?;
        timer.end();

        for died in result.events_of::<demo::UnitDied>() {
            info!(tick = died.tick, entity = %died.entity, "unit died");
        }
    }

    let (min_ms, max_ms) = timer.tick_time_range_ms();
    info!(
        tick = world.tick(),
        simulated_secs = world.elapsed().as_secs_f64(),
        entities = world.entity_count(),
        ticks_per_second = timer.ticks_per_second(),
        tick_ms = timer.tick_time_ms(),
        min_ms,
        max_ms,
        "simulation finished"
    );

    for (system, timing) in world.profiler().iter() {
        info!(
            system,
            calls = timing.calls,
            total_us = timing.total.as_micros() as u64,
            "system profile"
        );
    }
    for (counter, value) in world.counters().iter() {
        info!(counter, value, "counter");
    }

    Ok(())
}
