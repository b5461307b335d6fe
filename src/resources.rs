use bevy::prelude::*;
use level_format::LevelInfo;

// World constants
pub const WINDOW_SIZE: Vec2 = Vec2::new(900.0, 700.0);
pub const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 40.0);
pub const PLAYER_SPAWN: Vec2 = Vec2::new(100.0, -140.0);

// Game-wide resources
#[derive(Resource, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GameState {
    #[default]
    Menu,
    Running,
    Won,
    Died,
}

#[derive(Resource, Debug)]
pub struct LevelManager {
    pub levels: Vec<LevelInfo>,
    pub current: usize,
}

impl LevelManager {
    pub fn new(levels: Vec<LevelInfo>) -> Self {
        Self { levels, current: 0 }
    }

    pub fn current_level(&self) -> Option<&LevelInfo> {
        self.levels.get(self.current)
    }

    /// Returns false and keeps the selection when `index` is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.levels.len() {
            self.current = index;
            true
        } else {
            false
        }
    }
}

/// Set to a level index to (re)load that level on the next frame.
#[derive(Resource, Default)]
pub struct LevelRequest(pub Option<usize>);

#[derive(Resource, Default)]
pub struct PendingStart(pub Option<Vec2>);

/// Extent of the loaded grid in world units.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct LevelBounds {
    pub right: f32,
    pub bottom: f32,
    /// Player x at which the first end marker is touched, or `right` without one.
    pub finish: f32,
}

#[derive(Resource, Default, Debug)]
pub struct Attempts(pub u32);
