use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};

use crate::components::LevelEntity;
use crate::config::GameConfig;

const GLOW_RADIUS: f32 = 18.0;
const GLOW_LIFE: f32 = 0.5;
const BURST_COUNT: usize = 24;

// Fired when an orb launches the player.
#[derive(Event, Debug, Clone, Copy)]
pub struct OrbPulseEvent {
    pub pos: Vec2,
}

// Components for transient VFX
#[derive(Component)]
pub struct OrbGlow {
    material: Handle<ColorMaterial>,
    life: f32,
}

#[derive(Component)]
pub struct Particle {
    vel: Vec2,
    life: f32,
    max_life: f32,
}

/// Deterministic pseudo-random value in [-1, 1].
fn jitter(seed: &mut u64, shift: u32) -> f32 {
    // xorshift
    *seed ^= *seed << 13;
    *seed ^= *seed >> 7;
    *seed ^= *seed << 17;
    ((((*seed >> shift) as u32) & 0xFFFF) as f32 / 65535.0) * 2.0 - 1.0
}

pub fn spawn_orb_pulse_on_event(
    mut commands: Commands,
    mut reader: EventReader<OrbPulseEvent>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for ev in reader.read() {
        let base_z = 0.6;
        let material = materials.add(ColorMaterial::from(Color::srgba(1.0, 1.0, 0.0, 0.8)));
        commands.spawn((
            MaterialMesh2dBundle {
                mesh: Mesh2dHandle(meshes.add(Circle::new(GLOW_RADIUS))),
                material: material.clone(),
                transform: Transform::from_xyz(ev.pos.x, ev.pos.y, base_z),
                ..default()
            },
            OrbGlow { material, life: GLOW_LIFE },
            LevelEntity,
        ));

        let mut seed = (ev.pos.x.to_bits() ^ ev.pos.y.to_bits().rotate_left(16)) as u64 | 1;
        for i in 0..BURST_COUNT {
            let ang = (i as f32 / BURST_COUNT as f32) * std::f32::consts::TAU;
            let speed = 160.0 + jitter(&mut seed, (i % 8) as u32) * 60.0;
            let vel = Vec2::new(ang.cos(), ang.sin()) * speed;
            let size = 2.0 + (i % 3) as f32;
            let life = 0.35 + (i as f32 % 7.0) * 0.03;
            commands.spawn((
                SpriteBundle {
                    sprite: Sprite {
                        color: Color::srgb(1.0, 0.9, 0.3),
                        custom_size: Some(Vec2::splat(size)),
                        ..default()
                    },
                    transform: Transform::from_xyz(ev.pos.x, ev.pos.y, base_z + 0.01),
                    ..default()
                },
                Particle { vel, life, max_life: life },
                LevelEntity,
            ));
        }
    }
}

pub fn update_particles(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut q_glow: Query<(Entity, &mut OrbGlow)>,
    mut q_p: Query<(Entity, &mut Transform, &mut Particle, &mut Sprite)>,
    mut commands: Commands,
) {
    let dt = time.delta_seconds();

    for (e, mut glow) in q_glow.iter_mut() {
        glow.life -= dt;
        if glow.life <= 0.0 {
            materials.remove(&glow.material);
            commands.entity(e).despawn_recursive();
        } else if let Some(mat) = materials.get_mut(&glow.material) {
            let a = (glow.life / GLOW_LIFE).clamp(0.0, 1.0) * 0.8;
            mat.color = mat.color.with_alpha(a);
        }
    }

    // integrate with a fraction of player gravity, fade out, despawn
    for (e, mut t, mut p, mut sprite) in q_p.iter_mut() {
        p.vel.y -= cfg.physics.gravity * dt * 0.25;
        t.translation.x += p.vel.x * dt;
        t.translation.y += p.vel.y * dt;
        p.life -= dt;
        let a = (p.life / p.max_life).clamp(0.0, 1.0);
        sprite.color = sprite.color.with_alpha(a);
        if p.life <= 0.0 {
            commands.entity(e).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_in_unit_range() {
        let mut seed = 0x9E37_79B9_7F4A_7C15;
        for i in 0..1000u32 {
            let v = jitter(&mut seed, i % 8);
            assert!((-1.0..=1.0).contains(&v), "{v} out of range");
        }
    }
}
