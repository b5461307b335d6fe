use bevy::prelude::*;

mod components;
mod config;
mod physics;
mod resources;
mod systems;

use config::load_config;
use resources::{Attempts, GameState, LevelManager, LevelRequest, PendingStart, WINDOW_SIZE};
use systems::{audio, background, camera, levels, particles, player, startup, ui};

// Physics ticks at the rate the game was tuned for.
const PHYSICS_HZ: f64 = 60.0;

fn main() {
    // Load config from config.toml if available
    let cfg = load_config();
    let level_mgr = LevelManager::new(cfg.levels.clone());

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Gravity Craft".to_string(),
                resolution: (WINDOW_SIZE.x, WINDOW_SIZE.y).into(),
                resizable: false,
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }),
    )
    .insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ))
    .insert_resource(cfg)
    .insert_resource(level_mgr)
    .init_resource::<GameState>()
    .init_resource::<LevelRequest>()
    .init_resource::<PendingStart>()
    .init_resource::<Attempts>()
    .add_event::<particles::OrbPulseEvent>()
    .add_event::<levels::LevelStarted>()
    .add_systems(Startup, (
        startup::setup,
        ui::setup_ui,
        background::setup_backdrop,
        audio::play_menu_music,
    ))
    .add_systems(FixedUpdate, (
        player::physics_and_collision_system,
        player::outcome_system,
    ).chain().run_if(resource_equals(GameState::Running)))
    .add_systems(Update, (
        ui::screen_input_system,
        levels::level_transition_system,
        player::apply_pending_start_system,
        player::jump_tuning_system.run_if(resource_equals(GameState::Running)),
        player::player_spin_system,
        camera::camera_follow_system,
        background::update_parallax_background,
        ui::sync_screens_system,
        ui::update_hud_system,
    ).chain())
    .add_systems(Update, (
        particles::spawn_orb_pulse_on_event,
        particles::update_particles,
        audio::restart_level_music,
    ));

    #[cfg(target_arch = "wasm32")]
    app.init_resource::<levels::WasmLevelChan>()
        .add_systems(Update, levels::poll_wasm_level_task.before(player::apply_pending_start_system));

    app.run();
}
