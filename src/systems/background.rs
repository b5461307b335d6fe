use bevy::prelude::*;

use crate::config::GameConfig;
use crate::resources::WINDOW_SIZE;

// Marker for background entities
#[derive(Component)]
pub struct Background;

#[derive(Component)]
pub struct ParallaxLayer {
    // 1.0 follows the camera fully, 0.0 stays fixed in the world
    pub factor: f32,
}

pub fn setup_backdrop(mut commands: Commands, cfg: Res<GameConfig>, asset_server: Res<AssetServer>) {
    let [r, g, b] = cfg.backdrop.color;
    commands.insert_resource(ClearColor(Color::srgb(r, g, b)));

    let Some(path) = cfg.backdrop.image.clone() else { return; };
    info!("Using backdrop image {}", path);
    // Oversized so the slow drift never exposes an edge within a level
    let size = Vec2::new(WINDOW_SIZE.x * 4.0, WINDOW_SIZE.y);
    commands.spawn((
        SpriteBundle {
            sprite: Sprite { custom_size: Some(size), ..default() },
            texture: asset_server.load(path),
            transform: Transform::from_xyz(0.0, -WINDOW_SIZE.y / 2.0, -20.0),
            ..default()
        },
        Background,
        ParallaxLayer { factor: cfg.backdrop.parallax },
    ));
}

pub fn layer_x(camera_x: f32, factor: f32) -> f32 {
    camera_x * factor
}

pub fn update_parallax_background(
    cam_q: Query<&Transform, (With<Camera>, Without<Background>)>,
    mut layers: Query<(&ParallaxLayer, &mut Transform), With<Background>>,
) {
    let Ok(cam_t) = cam_q.get_single() else { return; };
    for (layer, mut t) in layers.iter_mut() {
        t.translation.x = layer_x(cam_t.translation.x, layer.factor);
        t.translation.y = cam_t.translation.y;
    }
}
