use bevy::prelude::*;

use crate::components::Player;
use crate::config::{CameraCfg, GameConfig};
use crate::resources::WINDOW_SIZE;

/// Where the camera wants to be for a player at `player`.
///
/// Horizontally the player stays pinned at `player_screen_x`. Vertically the
/// camera rests on the top of the grid and only moves when the player would
/// leave the band `margin_y` away from the screen edges.
pub fn camera_target(cfg: &CameraCfg, player: Vec2) -> Vec2 {
    let half = WINDOW_SIZE / 2.0;
    let x = player.x - cfg.player_screen_x + half.x;
    let rest_y = -half.y;
    let reach = (half.y - cfg.margin_y).max(0.0);
    let y = rest_y.clamp(player.y - reach, player.y + reach);
    Vec2::new(x, y)
}

pub fn camera_follow_system(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    mut q_camera: Query<&mut Transform, (With<Camera>, Without<Player>)>,
    q_player: Query<&Transform, With<Player>>,
) {
    if let (Ok(mut cam_t), Ok(player_t)) = (q_camera.get_single_mut(), q_player.get_single()) {
        let target = camera_target(&cfg.camera, player_t.translation.truncate());
        cam_t.translation.x = target.x;

        let lag = cfg.camera.lag_s.max(0.0001);
        let alpha = 1.0 - (-time.delta_seconds() / lag).exp();
        cam_t.translation.y += (target.y - cam_t.translation.y) * alpha;
    }
}
