//! Two-phase system scheduler.
//!
//! A [`Schedule`] holds two ordered, capacity-limited registries of systems:
//! update systems and render systems. Each system is bound to a
//! [`Signature`] and is invoked once per live entity that fulfils it. One
//! call to [`Schedule::run`]:
//!
//! 1. Runs every update system in registration order.
//! 2. Clears the renderer.
//! 3. Runs every render system in registration order.
//! 4. Presents the renderer.
//!
//! Update systems get mutable access to the world and to the schedule
//! itself, so they may destroy entities (including the one being visited) or
//! remove systems mid-frame. Each phase therefore walks a snapshot of the
//! registry taken when the phase starts, and each system walks a snapshot of
//! the live entity list taken when that system starts. Entities destroyed
//! during a system's scan are skipped.
//!
//! # Example
//!
//! ```
//! use pellet_ecs::prelude::*;
//! use pellet_engine::config::EngineConfig;
//! use pellet_engine::platform::{InputState, RecordingRenderer};
//! use pellet_engine::schedule::{Schedule, ScheduleConfig, UpdateContext};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Counter(u32);
//!
//! let mut world = World::new();
//! let e = world.create();
//! world.set(e, Counter(0)).unwrap();
//!
//! let mut schedule = Schedule::new(ScheduleConfig::default());
//! let sig = world.signature_of::<(Counter,)>().unwrap();
//! schedule
//!     .add_update("count", sig, |ctx: &mut UpdateContext<'_>, e: Entity| {
//!         if let Some(c) = ctx.world.get_mut::<Counter>(e) {
//!             c.0 += 1;
//!         }
//!     })
//!     .unwrap();
//!
//! let mut renderer = RecordingRenderer::new();
//! let screen = EngineConfig::default().screen();
//! schedule.run(&mut world, &InputState::new(), &mut renderer, 1.0 / 60.0, screen);
//! assert_eq!(world.get::<Counter>(e).unwrap().0, 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use pellet_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Screen;
use crate::platform::{InputState, Renderer};

// ---------------------------------------------------------------------------
// ScheduleConfig
// ---------------------------------------------------------------------------

/// Registry capacities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub max_update_systems: usize,
    pub max_render_systems: usize,
}

impl Default for ScheduleConfig {
    /// 16 systems per phase.
    fn default() -> Self {
        Self {
            max_update_systems: 16,
            max_render_systems: 16,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Which registry a system lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Update,
    Render,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Update => f.write_str("update"),
            Phase::Render => f.write_str("render"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("{phase} system registry is full ({capacity} systems)")]
    RegistryFull { phase: Phase, capacity: usize },
}

// ---------------------------------------------------------------------------
// Contexts
// ---------------------------------------------------------------------------

/// What an update system can see and change.
pub struct UpdateContext<'a> {
    pub world: &'a mut World,
    /// The schedule being run. Changes take effect from the next phase.
    pub schedule: &'a mut Schedule,
    pub input: &'a InputState,
    /// Seconds since the previous frame.
    pub dt: f32,
    pub screen: Screen,
}

/// What a render system can see.
pub struct RenderContext<'a> {
    pub world: &'a World,
    pub renderer: &'a mut dyn Renderer,
    pub screen: Screen,
}

pub type UpdateFn = dyn FnMut(&mut UpdateContext<'_>, Entity);
pub type RenderFn = dyn FnMut(&mut RenderContext<'_>, Entity);

// ---------------------------------------------------------------------------
// Registered systems
// ---------------------------------------------------------------------------

/// Handle returned on registration, used to remove the system again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(u32);

struct RegisteredSystem<F: ?Sized> {
    id: SystemId,
    name: String,
    include: Signature,
    exclude: Signature,
    func: Rc<RefCell<F>>,
}

impl<F: ?Sized> Clone for RegisteredSystem<F> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            func: Rc::clone(&self.func),
        }
    }
}

impl<F: ?Sized> RegisteredSystem<F> {
    /// Entities destroyed earlier in the scan never match, even for an
    /// empty signature.
    fn matches(&self, world: &World, entity: Entity) -> bool {
        world.is_live(entity)
            && world.fulfils(entity, &self.include)
            && world.lacks_all(entity, &self.exclude)
    }
}

// ---------------------------------------------------------------------------
// FrameDiagnostics
// ---------------------------------------------------------------------------

/// Timing for one run of the schedule.
#[derive(Debug, Clone, Default)]
pub struct FrameDiagnostics {
    /// Wall-clock time per system, in execution order.
    pub system_times: Vec<(String, Duration)>,
    pub update_time: Duration,
    /// Includes the renderer clear and present.
    pub render_time: Duration,
    pub total_time: Duration,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

pub struct Schedule {
    config: ScheduleConfig,
    update: Vec<RegisteredSystem<UpdateFn>>,
    render: Vec<RegisteredSystem<RenderFn>>,
    next_id: u32,
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("update", &self.update_names())
            .field("render", &self.render_names())
            .finish()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new(ScheduleConfig::default())
    }
}

impl Schedule {
    /// Create empty registries bounded by `config`.
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            update: Vec::with_capacity(config.max_update_systems),
            render: Vec::with_capacity(config.max_render_systems),
            config,
            next_id: 0,
        }
    }

    /// The registry capacities.
    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    fn next_id(&mut self) -> SystemId {
        let id = SystemId(self.next_id);
        self.next_id += 1;
        id
    }

    // -- registration -------------------------------------------------------

    /// Append an update system run for every entity fulfilling `signature`.
    pub fn add_update(
        &mut self,
        name: &str,
        signature: Signature,
        system: impl FnMut(&mut UpdateContext<'_>, Entity) + 'static,
    ) -> Result<SystemId, ScheduleError> {
        self.add_update_excluding(name, signature, Signature::empty(), system)
    }

    /// Like [`add_update`](Self::add_update), but skips entities carrying
    /// any component in `exclude`.
    pub fn add_update_excluding(
        &mut self,
        name: &str,
        include: Signature,
        exclude: Signature,
        system: impl FnMut(&mut UpdateContext<'_>, Entity) + 'static,
    ) -> Result<SystemId, ScheduleError> {
        let capacity = self.config.max_update_systems;
        if self.update.len() >= capacity {
            tracing::warn!(system = name, capacity, "update registry full");
            return Err(ScheduleError::RegistryFull {
                phase: Phase::Update,
                capacity,
            });
        }
        let id = self.next_id();
        let func: Rc<RefCell<UpdateFn>> = Rc::new(RefCell::new(system));
        self.update.push(RegisteredSystem {
            id,
            name: name.to_owned(),
            include,
            exclude,
            func,
        });
        tracing::debug!(system = name, ?id, "update system added");
        Ok(id)
    }

    /// Append a render system run for every entity fulfilling `signature`.
    pub fn add_render(
        &mut self,
        name: &str,
        signature: Signature,
        system: impl FnMut(&mut RenderContext<'_>, Entity) + 'static,
    ) -> Result<SystemId, ScheduleError> {
        let capacity = self.config.max_render_systems;
        if self.render.len() >= capacity {
            tracing::warn!(system = name, capacity, "render registry full");
            return Err(ScheduleError::RegistryFull {
                phase: Phase::Render,
                capacity,
            });
        }
        let id = self.next_id();
        let func: Rc<RefCell<RenderFn>> = Rc::new(RefCell::new(system));
        self.render.push(RegisteredSystem {
            id,
            name: name.to_owned(),
            include: signature,
            exclude: Signature::empty(),
            func,
        });
        tracing::debug!(system = name, ?id, "render system added");
        Ok(id)
    }

    /// Remove an update system. The remaining systems keep their order.
    pub fn remove_update(&mut self, id: SystemId) -> bool {
        remove_by_id(&mut self.update, id)
    }

    /// Remove a render system. The remaining systems keep their order.
    pub fn remove_render(&mut self, id: SystemId) -> bool {
        remove_by_id(&mut self.render, id)
    }

    /// Empty both registries.
    pub fn clear_all(&mut self) {
        self.update.clear();
        self.render.clear();
        tracing::debug!("all systems removed");
    }

    // -- introspection ------------------------------------------------------

    /// Number of registered update systems.
    pub fn update_count(&self) -> usize {
        self.update.len()
    }

    /// Number of registered render systems.
    pub fn render_count(&self) -> usize {
        self.render.len()
    }

    /// Update system names in run order.
    pub fn update_names(&self) -> Vec<&str> {
        self.update.iter().map(|s| s.name.as_str()).collect()
    }

    /// Render system names in run order.
    pub fn render_names(&self) -> Vec<&str> {
        self.render.iter().map(|s| s.name.as_str()).collect()
    }

    // -- running ------------------------------------------------------------

    /// Run one frame: update phase, clear, render phase, present.
    pub fn run(
        &mut self,
        world: &mut World,
        input: &InputState,
        renderer: &mut dyn Renderer,
        dt: f32,
        screen: Screen,
    ) -> FrameDiagnostics {
        let frame_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.update.len() + self.render.len());

        // Phase 1: update systems over a snapshot of the registry.
        let update_start = Instant::now();
        let systems = self.update.clone();
        {
            let mut ctx = UpdateContext {
                world: &mut *world,
                schedule: &mut *self,
                input,
                dt,
                screen,
            };
            for system in &systems {
                let sys_start = Instant::now();
                let Ok(mut func) = system.func.try_borrow_mut() else {
                    tracing::warn!(system = %system.name, "update system is already running, skipped");
                    continue;
                };
                let entities = ctx.world.entities().to_vec();
                for entity in entities {
                    if system.matches(ctx.world, entity) {
                        (&mut *func)(&mut ctx, entity);
                    }
                }
                system_times.push((system.name.clone(), sys_start.elapsed()));
            }
        }
        let update_time = update_start.elapsed();

        // Phase 2: render systems between clear and present.
        let render_start = Instant::now();
        let world: &World = world;
        renderer.clear();
        let systems = self.render.clone();
        let mut ctx = RenderContext {
            world,
            renderer: &mut *renderer,
            screen,
        };
        for system in &systems {
            let sys_start = Instant::now();
            let Ok(mut func) = system.func.try_borrow_mut() else {
                tracing::warn!(system = %system.name, "render system is already running, skipped");
                continue;
            };
            for &entity in world.entities() {
                if system.matches(world, entity) {
                    (&mut *func)(&mut ctx, entity);
                }
            }
            system_times.push((system.name.clone(), sys_start.elapsed()));
        }
        renderer.present();
        let render_time = render_start.elapsed();

        let diagnostics = FrameDiagnostics {
            system_times,
            update_time,
            render_time,
            total_time: frame_start.elapsed(),
        };
        tracing::trace!(
            update_us = diagnostics.update_time.as_micros() as u64,
            render_us = diagnostics.render_time.as_micros() as u64,
            "schedule run"
        );
        diagnostics
    }
}

/// Ordered removal; popping the last element avoids the shift.
fn remove_by_id<F: ?Sized>(systems: &mut Vec<RegisteredSystem<F>>, id: SystemId) -> bool {
    let Some(pos) = systems.iter().position(|s| s.id == id) else {
        return false;
    };
    let removed = if pos + 1 == systems.len() {
        systems.pop()
    } else {
        Some(systems.remove(pos))
    };
    if let Some(system) = removed {
        tracing::debug!(system = %system.name, ?id, "system removed");
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
