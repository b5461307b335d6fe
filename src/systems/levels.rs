use bevy::prelude::*;
use level_format::{cell_center, LevelMap, Tile, TILE_SIZE};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;
#[cfg(target_arch = "wasm32")]
use gloo_net::http::Request;
#[cfg(target_arch = "wasm32")]
use crossbeam_channel::{unbounded, Receiver};

use crate::components::{LevelEntity, Obstacle};
use crate::resources::{
    Attempts, GameState, LevelBounds, LevelManager, LevelRequest, PendingStart, PLAYER_SIZE, PLAYER_SPAWN,
};

/// Fired once a level's obstacles are spawned and the run begins.
#[derive(Event, Debug, Clone, Copy)]
pub struct LevelStarted {
    pub index: usize,
}

fn tile_sprite(tile: Tile) -> Sprite {
    let (color, size) = match tile {
        Tile::Platform => (Color::srgb(0.85, 0.32, 0.08), Vec2::splat(TILE_SIZE)),
        // drawn as a diamond by the rotation in spawn_loaded_level
        Tile::Spike => (Color::srgb(0.92, 0.92, 0.95), Vec2::splat(TILE_SIZE * 0.6)),
        Tile::Orb => (Color::srgb(1.0, 0.85, 0.1), Vec2::splat(TILE_SIZE * 0.55)),
        Tile::End => (Color::srgba(0.3, 1.0, 0.4, 0.8), Vec2::new(TILE_SIZE * 0.5, TILE_SIZE)),
        Tile::Empty => (Color::NONE, Vec2::ZERO),
    };
    Sprite { color, custom_size: Some(size), ..default() }
}

fn level_bounds(map: &LevelMap) -> LevelBounds {
    let right = map.width() as f32 * TILE_SIZE;
    let finish = map
        .tiles()
        .filter(|(_, _, tile)| *tile == Tile::End)
        .map(|(col, _, _)| col as f32 * TILE_SIZE - PLAYER_SIZE.x / 2.0)
        .reduce(f32::min)
        .unwrap_or(right);
    LevelBounds {
        right,
        bottom: -(map.height() as f32 * TILE_SIZE),
        finish,
    }
}

fn spawn_loaded_level(commands: &mut Commands, pending: &mut PendingStart, map: &LevelMap) -> LevelBounds {
    for (col, row, tile) in map.tiles() {
        let (x, y) = cell_center(col, row);
        let mut transform = Transform::from_xyz(x, y, 0.0);
        if matches!(tile, Tile::Spike | Tile::Orb) {
            transform.rotate_z(std::f32::consts::FRAC_PI_4);
        }
        commands.spawn((
            SpriteBundle {
                sprite: tile_sprite(tile),
                transform,
                ..default()
            },
            Obstacle(tile),
            LevelEntity,
        ));
    }
    pending.0 = Some(PLAYER_SPAWN);
    level_bounds(map)
}

fn begin_run(
    commands: &mut Commands,
    state: &mut GameState,
    attempts: &mut Attempts,
    started: &mut EventWriter<LevelStarted>,
    index: usize,
    bounds: LevelBounds,
) {
    commands.insert_resource(bounds);
    attempts.0 += 1;
    *state = GameState::Running;
    started.send(LevelStarted { index });
}

/// Spawns a loaded level and starts the run, or falls back to the menu when
/// loading failed.
fn finish_load(
    commands: &mut Commands,
    pending: &mut PendingStart,
    state: &mut GameState,
    attempts: &mut Attempts,
    started: &mut EventWriter<LevelStarted>,
    index: usize,
    result: Result<LevelMap, String>,
) {
    match result {
        Ok(map) => {
            if !map.has_end() {
                warn!("Level {} has no end marker and cannot be won", index + 1);
            }
            let bounds = spawn_loaded_level(commands, pending, &map);
            begin_run(commands, state, attempts, started, index, bounds);
        }
        Err(e) => {
            error!("Failed to load level {}: {}", index + 1, e);
            *state = GameState::Menu;
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Resource, Default)]
pub struct WasmLevelChan(Option<(usize, Receiver<Result<LevelMap, String>>)>);

#[cfg(target_arch = "wasm32")]
async fn fetch_level(url: &str) -> Result<LevelMap, String> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {:?}", e))?;
    if !resp.ok() {
        return Err(format!("HTTP status {}", resp.status()));
    }
    let text = resp
        .text()
        .await
        .map_err(|e| format!("failed to read body: {:?}", e))?;
    LevelMap::from_csv_str(&text).map_err(|e| e.to_string())
}

#[cfg(target_arch = "wasm32")]
fn queue_fetch(commands: &mut Commands, index: usize, path: &str) {
    // Spawning happens in poll_wasm_level_task once the body arrives.
    let url = path.to_string();
    let (tx, rx) = unbounded::<Result<LevelMap, String>>();
    commands.insert_resource(WasmLevelChan(Some((index, rx))));
    spawn_local(async move {
        let _ = tx.send(fetch_level(&url).await);
    });
}

#[cfg(target_arch = "wasm32")]
pub fn poll_wasm_level_task(
    mut commands: Commands,
    mut pending: ResMut<PendingStart>,
    mut state: ResMut<GameState>,
    mut attempts: ResMut<Attempts>,
    mut started: EventWriter<LevelStarted>,
    mut chan_res: ResMut<WasmLevelChan>,
) {
    let Some((index, rx)) = chan_res.0.as_ref() else { return; };
    let index = *index;
    let Ok(result) = rx.try_recv() else { return; };
    chan_res.0 = None;
    finish_load(&mut commands, &mut pending, &mut state, &mut attempts, &mut started, index, result);
}

/// Tears down the current level and loads the requested one.
pub fn level_transition_system(
    mut commands: Commands,
    mut req: ResMut<LevelRequest>,
    mut pending: ResMut<PendingStart>,
    mut level_mgr: ResMut<LevelManager>,
    mut state: ResMut<GameState>,
    mut attempts: ResMut<Attempts>,
    mut started: EventWriter<LevelStarted>,
    q_level_entities: Query<Entity, With<LevelEntity>>,
) {
    let Some(index) = req.0.take() else { return; };

    for e in q_level_entities.iter() {
        commands.entity(e).despawn_recursive();
    }

    if !level_mgr.select(index) {
        error!("No level at index {}", index);
        *state = GameState::Menu;
        return;
    }
    let Some(info) = level_mgr.current_level().cloned() else { return; };
    info!("Loading level '{}' from {}", info.name, info.path);

    #[cfg(not(target_arch = "wasm32"))]
    {
        let result = LevelMap::from_path(&info.path).map_err(|e| e.to_string());
        finish_load(&mut commands, &mut pending, &mut state, &mut attempts, &mut started, index, result);
    }

    #[cfg(target_arch = "wasm32")]
    queue_fetch(&mut commands, index, &info.path);
}
