//! Frame loop tying the world, schedule and platform collaborators together.
//!
//! Each call to [`Engine::frame`]:
//!
//! 1. Drains queued platform events: input state is updated and the event
//!    handlers run.
//! 2. Runs the schedule (update phase, renderer clear, render phase,
//!    renderer present).
//! 3. Rotates the input snapshots so edge queries reset.
//! 4. Advances the frame counter and records diagnostics.
//!
//! The engine installs a `Quit` handler and an `Escape` key handler that stop
//! it; callers poll [`Engine::is_running`].
//!
//! # Example
//!
//! ```
//! use pellet_engine::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::default(), RecordingRenderer::new()).unwrap();
//! engine.push_event(Event::Quit);
//! engine.frame(1.0 / 60.0);
//! assert!(!engine.is_running());
//! assert_eq!(engine.frame_count(), 1);
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use pellet_ecs::world::World;

use crate::config::{ConfigError, EngineConfig, Screen};
use crate::platform::{Atlas, Event, EventDispatcher, EventKind, InputState, Key, Renderer};
use crate::schedule::{FrameDiagnostics, Schedule};

pub struct Engine<R: Renderer> {
    config: EngineConfig,
    world: World,
    schedule: Schedule,
    input: InputState,
    events: EventDispatcher,
    renderer: R,
    /// Shared with the default quit handlers.
    running: Rc<Cell<bool>>,
    frame_counter: u64,
    last_diagnostics: FrameDiagnostics,
}

impl<R: Renderer> Engine<R> {
    /// Validate `config`, size the world and schedule from it, and configure
    /// the renderer's atlas cell sizes.
    pub fn new(config: EngineConfig, mut renderer: R) -> Result<Self, ConfigError> {
        config.validate()?;
        renderer.set_cell_size(Atlas::Entities, config.entity_cell);
        renderer.set_cell_size(Atlas::Tiles, config.tile_cell);

        let running = Rc::new(Cell::new(true));
        let mut events = EventDispatcher::new();
        let flag = Rc::clone(&running);
        events.add(EventKind::Quit, move |_| flag.set(false));
        let flag = Rc::clone(&running);
        events.add(EventKind::KeyDown, move |event| {
            if *event == Event::KeyDown(Key::Escape) {
                flag.set(false);
            }
        });

        tracing::debug!(
            width = config.screen_width,
            height = config.screen_height,
            max_entities = config.world.max_entities,
            "engine created"
        );
        Ok(Self {
            world: World::with_config(config.world.clone()),
            schedule: Schedule::new(config.schedule.clone()),
            input: InputState::new(),
            events,
            renderer,
            running,
            frame_counter: 0,
            last_diagnostics: FrameDiagnostics::default(),
            config,
        })
    }

    /// Queue a platform event for the next frame. Input state sees it
    /// immediately.
    pub fn push_event(&mut self, event: Event) {
        self.input.apply(&event);
        self.events.push(event);
    }

    /// Run one frame with a step of `dt` seconds.
    pub fn frame(&mut self, dt: f32) -> &FrameDiagnostics {
        let frame_start = Instant::now();
        self.events.dispatch();

        let mut diagnostics = self.schedule.run(
            &mut self.world,
            &self.input,
            &mut self.renderer,
            dt,
            self.config.screen(),
        );
        self.input.end_frame();
        self.frame_counter += 1;

        diagnostics.total_time = frame_start.elapsed();
        self.last_diagnostics = diagnostics;
        &self.last_diagnostics
    }

    /// Run up to `count` frames, stopping early once the engine stops.
    /// Returns the number of frames run.
    pub fn run_frames(&mut self, count: u64, dt: f32) -> u64 {
        let mut ran = 0;
        while ran < count && self.is_running() {
            self.frame(dt);
            ran += 1;
        }
        ran
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn stop(&mut self) {
        self.running.set(false);
    }

    // -- accessors ----------------------------------------------------------

    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.config.screen()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Direct input access, for platform backends that poll instead of
    /// pushing events.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn last_diagnostics(&self) -> &FrameDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
