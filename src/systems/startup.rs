use bevy::prelude::*;

use crate::components::{JumpPower, MotionState, Player, Velocity};
use crate::config::GameConfig;
use crate::resources::{PLAYER_SIZE, PLAYER_SPAWN};

pub fn setup(mut commands: Commands, cfg: Res<GameConfig>) {
    // Camera
    commands.spawn(Camera2dBundle::default());

    // Player; positioned again on every level reset
    commands.spawn((
        SpriteBundle {
            sprite: Sprite {
                color: Color::srgb(0.2, 0.85, 1.0),
                custom_size: Some(PLAYER_SIZE),
                ..default()
            },
            transform: Transform::from_xyz(PLAYER_SPAWN.x, PLAYER_SPAWN.y, 1.0),
            ..default()
        },
        Player,
        Velocity::default(),
        MotionState::default(),
        JumpPower(cfg.jump.velocity),
    ));
}
