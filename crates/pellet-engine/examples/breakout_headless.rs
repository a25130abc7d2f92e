//! Headless breakout run -- scripted clicks and key presses, no window.
//!
//! Run with:
//!   cargo run --example breakout_headless -p pellet-engine [config.json]
//!
//! Set `RUST_LOG=debug` to see scene transitions and broken blocks.

use pellet_engine::breakout::components::{Block, Button, Position, Score, Size};
use pellet_engine::breakout::{Breakout, SceneKind};
use pellet_engine::prelude::*;

const DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: u64 = 60 * 60;

/// Scripted input: which keys to press or release on which frame.
const SCRIPT: &[(u64, Event)] = &[
    (30, Event::KeyDown(Key::D)),
    (75, Event::KeyUp(Key::D)),
    (120, Event::KeyDown(Key::A)),
    (200, Event::KeyUp(Key::A)),
];

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let mut engine = Engine::new(config, RecordingRenderer::new())?;
    let mut game = Breakout::start(&mut engine)?;

    // Click the "Play" button.
    let play = engine
        .world()
        .entities()
        .iter()
        .copied()
        .filter(|&e| engine.world().exists::<Button>(e))
        .find(|&e| engine.world().get::<Button>(e).is_some_and(|b| b.label == "Play"))
        .ok_or_else(|| anyhow::anyhow!("menu has no Play button"))?;
    let (pos, size) = (
        engine.world().get::<Position>(play).map_or(Vec2::ZERO, |p| p.0),
        engine.world().get::<Size>(play).map_or(Vec2::ZERO, |s| s.0),
    );
    engine.push_event(Event::MouseMotion(pos + size * 0.5));
    engine.push_event(Event::MouseButtonDown(MouseButton::Left));
    game.frame(&mut engine, DT)?;
    engine.push_event(Event::MouseButtonUp(MouseButton::Left));
    tracing::info!(scene = ?game.current(), "menu clicked");

    let mut last_score = 0;
    let mut blocks_left = 0;
    let mut gameplay_frames = 0u64;
    while engine.is_running() && game.current() == SceneKind::Gameplay && gameplay_frames < MAX_FRAMES {
        for (_, event) in SCRIPT.iter().filter(|(at, _)| *at == gameplay_frames) {
            engine.push_event(*event);
        }
        let world = engine.world();
        last_score = world
            .entities()
            .iter()
            .find(|&&e| world.exists::<Score>(e))
            .and_then(|&e| world.get::<Score>(e))
            .map_or(last_score, |s| s.0);
        blocks_left = world.entities().iter().filter(|&&e| world.exists::<Block>(e)).count();
        game.frame(&mut engine, DT)?;
        gameplay_frames += 1;
    }

    tracing::info!(
        frames = engine.frame_count(),
        gameplay_frames,
        last_score,
        "run finished"
    );
    println!("frames:       {}", engine.frame_count());
    println!("gameplay:     {gameplay_frames} frames");
    println!("final scene:  {:?}", game.current());
    println!("score:        {last_score}");
    println!("blocks left:  {blocks_left}");
    println!("presented:    {}", engine.renderer().frames_presented());
    Ok(())
}
