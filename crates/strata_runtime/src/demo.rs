//! Demo pipeline run by the `strata` binary
//!
//! Every tick the Input phase spawns a fresh unit plus a handful of transient
//! sparks. Each live spark deals one point of damage to every unit during
//! Execution. Reaction destroys units whose health ran out and reports them.
//! The sparks themselves are reaped by the world's Cleanup system.

use strata_core::define_component;
use strata_core::ecs::{
    CommandBuffer, EntityBuilder, EntityId, Phase, System, Transient, World, WorldError,
};
use strata_core::Tick;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health(pub i32);
define_component!(Health, 1, "Health");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Spark;
define_component!(Spark, 2, "Spark");

pub const UNIT_HEALTH: i32 = 30;

/// Emitted when a unit is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitDied {
    pub entity: EntityId,
    pub tick: Tick,
}

/// Input: one unit and `sparks_per_tick` transient sparks.
pub struct Spawner {
    pub sparks_per_tick: u32,
}

impl System for Spawner {
    fn on_update(&self, _: &World, commands: &mut CommandBuffer) -> Result<(), WorldError> {
        commands
            .create_entity_with(EntityBuilder::new().with(Health(UNIT_HEALTH)))
            .continue_with(|world, entity| {
                debug!(tick = world.tick(), entity = %entity, "unit spawned");
                Ok(())
            });

        for _ in 0..self.sparks_per_tick {
            commands.create_entity_with(EntityBuilder::new().with(Spark).with(Transient));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "spawner"
    }
}

/// Execution: every unit loses one health per live spark.
pub struct Damage;

impl System for Damage {
    fn on_update(&self, world: &World, commands: &mut CommandBuffer) -> Result<(), WorldError> {
        let sparks = world.query().with::<Spark>().iter().count() as i32;
        if sparks == 0 {
            return Ok(());
        }

        for unit in world.query().with::<Health>().without::<Spark>() {
            if let Some(&Health(hp)) = unit.get::<Health>() {
                commands.set_component(unit.id(), Health(hp - sparks));
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "damage"
    }
}

/// Reaction: destroy units hit this tick whose health dropped to zero.
pub struct Reaper;

impl System for Reaper {
    fn on_update(&self, world: &World, commands: &mut CommandBuffer) -> Result<(), WorldError> {
        let tick = world.tick();
        let hit = world
            .query()
            .with_changed_since::<Health>(tick.saturating_sub(1))?;

        for unit in hit {
            if unit.get::<Health>().is_some_and(|health| health.0 <= 0) {
                commands.destroy_entity(unit.id());
                commands.emit(UnitDied {
                    entity: unit.id(),
                    tick,
                });
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "reaper"
    }
}

/// Register the demo systems on `world`.
pub fn install(world: &mut World, sparks_per_tick: u32) {
    world.add_system(Phase::Input, Spawner { sparks_per_tick }, 0);
    world.add_system(Phase::Execution, Damage, 0);
    world.add_system(Phase::Reaction, Reaper, 0);
}
