use bevy::prelude::*;
use level_format::Tile;

// Entities/components
#[derive(Component, Default)]
pub struct Player;

#[derive(Component, Deref, DerefMut, Default)]
pub struct Velocity(pub Vec2);

#[derive(Component, Default, Clone, Copy, Debug)]
pub struct MotionState {
    pub on_ground: bool,
    // Sticky: set while jump is pressed, cleared on landing.
    pub jump_queued: bool,
    pub won: bool,
    pub died: bool,
}

/// Vertical impulse of a regular jump, tunable at runtime.
#[derive(Component, Deref, DerefMut, Clone, Copy, Debug)]
pub struct JumpPower(pub f32);

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Obstacle(pub Tile);

#[derive(Component)]
pub struct LevelEntity; // marker to cleanup when resetting a level

// UI markers
#[derive(Component)]
pub struct ScreenUi(pub crate::resources::GameState);

#[derive(Component)]
pub struct HudText;
