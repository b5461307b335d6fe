use bevy::prelude::*;
use level_format::TILE_SIZE;

use crate::components::{JumpPower, MotionState, Obstacle, Player, Velocity};
use crate::config::GameConfig;
use crate::physics::{self, Aabb, Body, Outcome};
use crate::resources::{GameState, LevelBounds, PendingStart, PLAYER_SIZE};
use crate::systems::particles::OrbPulseEvent;

const JUMP_KEYS: [KeyCode; 2] = [KeyCode::Space, KeyCode::ArrowUp];
const SPIN_DEG_PER_S: f32 = 400.0;

/// Debug tuning of the jump impulse while a level runs.
pub fn jump_tuning_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    cfg: Res<GameConfig>,
    mut q_player: Query<&mut JumpPower, With<Player>>,
) {
    let Ok(mut power) = q_player.get_single_mut() else { return; };
    let mut delta = 0.0;
    if keyboard.just_pressed(KeyCode::Digit2) { delta += cfg.jump.tuning_step; }
    if keyboard.just_pressed(KeyCode::Digit1) { delta -= cfg.jump.tuning_step; }
    if delta != 0.0 {
        power.0 = cfg.clamp_jump(power.0 + delta);
        debug!("Jump power now {}", power.0);
    }
}

pub fn physics_and_collision_system(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    keyboard: Res<ButtonInput<KeyCode>>,
    bounds: Option<Res<LevelBounds>>,
    mut q_player: Query<(&mut Transform, &mut Velocity, &mut MotionState, &JumpPower), With<Player>>,
    q_obstacles: Query<(&Transform, &Obstacle), Without<Player>>,
    mut ev_orb: EventWriter<OrbPulseEvent>,
) {
    let dt = time.delta_seconds();
    let Ok((mut t, mut v, mut motion, power)) = q_player.get_single_mut() else { return; };

    let obstacles: Vec<(Aabb, level_format::Tile)> = q_obstacles
        .iter()
        .map(|(ot, o)| (Aabb::new(ot.translation.truncate(), Vec2::splat(TILE_SIZE)), o.0))
        .collect();

    let pressed = keyboard.any_pressed(JUMP_KEYS);
    let mut body = Body {
        vel: v.0,
        on_ground: motion.on_ground,
        jump_queued: motion.jump_queued || pressed,
        jump_pressed: pressed,
        won: motion.won,
        died: motion.died,
        ..Body::new(t.translation.truncate(), PLAYER_SIZE)
    };

    let report = physics::step(&mut body, &obstacles, &cfg.tuning(), power.0, dt);

    if let Some(b) = bounds {
        if body.pos.y < b.bottom - cfg.physics.death_margin {
            body.died = true;
        }
    }

    if report.jumped || report.bonked {
        trace!("jumped={} bonked={} at ({:.1}, {:.1})", report.jumped, report.bonked, body.pos.x, body.pos.y);
    }
    if report.landed && !motion.on_ground {
        trace!("landed at x={:.1}", body.pos.x);
    }
    if let Some(pos) = report.orb {
        ev_orb.send(OrbPulseEvent { pos });
    }

    t.translation.x = body.pos.x;
    t.translation.y = body.pos.y;
    v.0 = body.vel;
    *motion = MotionState {
        on_ground: body.on_ground,
        jump_queued: body.jump_queued,
        won: body.won,
        died: body.died,
    };
}

pub fn outcome_system(
    mut state: ResMut<GameState>,
    q_player: Query<(&Transform, &MotionState), With<Player>>,
) {
    if *state != GameState::Running { return; }
    let Ok((t, motion)) = q_player.get_single() else { return; };
    let body = Body { won: motion.won, died: motion.died, ..default() };
    match physics::outcome(&body) {
        Outcome::Playing => {}
        Outcome::Won => {
            info!("Level cleared at x={:.0}", t.translation.x);
            *state = GameState::Won;
        }
        Outcome::Died => {
            info!("Player died at ({:.0}, {:.0})", t.translation.x, t.translation.y);
            *state = GameState::Died;
        }
    }
}

/// Tumble while airborne, settle to the nearest quarter turn on the ground.
pub fn player_spin_system(
    time: Res<Time>,
    state: Res<GameState>,
    mut q_player: Query<(&mut Transform, &MotionState), With<Player>>,
) {
    if *state != GameState::Running { return; }
    let Ok((mut t, motion)) = q_player.get_single_mut() else { return; };
    if motion.on_ground {
        let (angle, _, _) = t.rotation.to_euler(EulerRot::ZYX);
        t.rotation = Quat::from_rotation_z(snap_quarter_turn(angle));
    } else {
        t.rotate_z(-SPIN_DEG_PER_S.to_radians() * time.delta_seconds());
    }
}

fn snap_quarter_turn(angle: f32) -> f32 {
    let quarter = std::f32::consts::FRAC_PI_2;
    (angle / quarter).round() * quarter
}

pub fn apply_pending_start_system(
    cfg: Res<GameConfig>,
    mut pending: ResMut<PendingStart>,
    mut q_player: Query<(&mut Transform, &mut Velocity, &mut MotionState, &mut JumpPower), With<Player>>,
    mut q_camera: Query<&mut Transform, (With<Camera>, Without<Player>)>,
) {
    let Some(pos) = pending.0.take() else { return; };
    if let Ok((mut t, mut v, mut motion, mut power)) = q_player.get_single_mut() {
        t.translation.x = pos.x;
        t.translation.y = pos.y;
        t.rotation = Quat::IDENTITY;
        v.0 = Vec2::ZERO;
        *motion = MotionState::default();
        power.0 = cfg.jump.velocity;
    }
    if let Ok(mut cam_t) = q_camera.get_single_mut() {
        let target = crate::systems::camera::camera_target(&cfg.camera, pos);
        cam_t.translation.x = target.x;
        cam_t.translation.y = target.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Obstacle;
    use level_format::{cell_center, Tile};
    use std::time::Duration;

    fn spawn_player(app: &mut App, pos: Vec2) -> Entity {
        app.world_mut()
            .spawn((
                Player,
                Transform::from_xyz(pos.x, pos.y, 1.0),
                Velocity::default(),
                MotionState::default(),
                JumpPower(780.0),
            ))
            .id()
    }

    fn spawn_tile(app: &mut App, col: usize, row: usize, tile: Tile) {
        let (x, y) = cell_center(col, row);
        app.world_mut().spawn((Transform::from_xyz(x, y, 0.0), Obstacle(tile)));
    }

    fn physics_app() -> App {
        let mut app = App::new();
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(1.0 / 60.0));
        app.insert_resource(time)
            .insert_resource(GameConfig::default())
            .insert_resource(GameState::Running)
            .init_resource::<ButtonInput<KeyCode>>()
            .add_event::<OrbPulseEvent>()
            .add_systems(Update, (physics_and_collision_system, outcome_system).chain());
        app
    }

    #[test]
    fn spike_contact_ends_the_run() {
        let mut app = physics_app();
        let (sx, sy) = cell_center(3, 2);
        spawn_player(&mut app, Vec2::new(sx - 35.0, sy));
        spawn_tile(&mut app, 3, 2, Tile::Spike);

        app.update();

        assert_eq!(*app.world().resource::<GameState>(), GameState::Died);
    }

    #[test]
    fn reaching_the_end_wins() {
        let mut app = physics_app();
        let (ex, ey) = cell_center(3, 2);
        spawn_player(&mut app, Vec2::new(ex - 35.0, ey));
        spawn_tile(&mut app, 3, 2, Tile::End);

        app.update();

        assert_eq!(*app.world().resource::<GameState>(), GameState::Won);
    }

    #[test]
    fn falling_out_of_the_level_kills() {
        let mut app = physics_app();
        app.insert_resource(LevelBounds { right: 400.0, bottom: -400.0, finish: 380.0 });
        spawn_player(&mut app, Vec2::new(100.0, -1000.0));

        app.update();

        assert_eq!(*app.world().resource::<GameState>(), GameState::Died);
    }

    #[test]
    fn landing_updates_motion_state() {
        let mut app = physics_app();
        let (gx, gy) = cell_center(2, 5);
        let player = spawn_player(&mut app, Vec2::new(gx, gy + 41.0));
        for col in 0..6 {
            spawn_tile(&mut app, col, 5, Tile::Platform);
        }

        for _ in 0..3 {
            app.update();
        }

        let motion = *app.world().get::<MotionState>(player).unwrap();
        let t = app.world().get::<Transform>(player).unwrap();
        assert!(motion.on_ground);
        assert!(!motion.died);
        assert_eq!(t.translation.y, gy + 40.0);
        assert_eq!(*app.world().resource::<GameState>(), GameState::Running);
    }

    fn jump_power(app: &App, player: Entity) -> f32 {
        app.world().get::<JumpPower>(player).unwrap().0
    }

    fn tap(app: &mut App, key: KeyCode) {
        let mut input = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        input.release_all();
        input.clear();
        input.press(key);
    }

    #[test]
    fn tuning_keys_step_jump_power_within_limits() {
        let mut app = App::new();
        app.insert_resource(GameConfig::default())
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, jump_tuning_system);
        let cfg = GameConfig::default();
        let player = spawn_player(&mut app, Vec2::new(100.0, -140.0));

        tap(&mut app, KeyCode::Digit2);
        app.update();
        assert_eq!(jump_power(&app, player), 780.0 + cfg.jump.tuning_step);

        tap(&mut app, KeyCode::Digit1);
        app.update();
        assert_eq!(jump_power(&app, player), 780.0);

        app.world_mut().get_mut::<JumpPower>(player).unwrap().0 = cfg.jump.max - 1.0;
        tap(&mut app, KeyCode::Digit2);
        app.update();
        assert_eq!(jump_power(&app, player), cfg.jump.max);

        app.world_mut().get_mut::<JumpPower>(player).unwrap().0 = cfg.jump.min + 1.0;
        tap(&mut app, KeyCode::Digit1);
        app.update();
        assert_eq!(jump_power(&app, player), cfg.jump.min);
    }

    #[test]
    fn pending_start_resets_player_and_camera() {
        let cfg = GameConfig::default();
        let spawn = Vec2::new(100.0, -140.0);
        let mut app = App::new();
        app.insert_resource(cfg.clone())
            .insert_resource(PendingStart(Some(spawn)))
            .add_systems(Update, apply_pending_start_system);

        let player = app
            .world_mut()
            .spawn((
                Player,
                Transform::from_xyz(3000.0, -900.0, 1.0).with_rotation(Quat::from_rotation_z(0.7)),
                Velocity(Vec2::new(600.0, -250.0)),
                MotionState { on_ground: false, jump_queued: true, won: false, died: true },
                JumpPower(1020.0),
            ))
            .id();
        let camera = app.world_mut().spawn((Camera::default(), Transform::default())).id();

        app.update();

        let t = app.world().get::<Transform>(player).unwrap();
        assert_eq!(t.translation.truncate(), spawn);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(app.world().get::<Velocity>(player).unwrap().0, Vec2::ZERO);
        let motion = *app.world().get::<MotionState>(player).unwrap();
        assert!(!motion.on_ground && !motion.jump_queued && !motion.won && !motion.died);
        assert_eq!(jump_power(&app, player), cfg.jump.velocity);
        assert_eq!(app.world().resource::<PendingStart>().0, None);

        let cam = app.world().get::<Transform>(camera).unwrap();
        let expected = crate::systems::camera::camera_target(&cfg.camera, spawn);
        assert_eq!(cam.translation.truncate(), expected);
    }

    #[test]
    fn quarter_turn_snapping() {
        let quarter = std::f32::consts::FRAC_PI_2;
        assert_eq!(snap_quarter_turn(0.2), 0.0);
        assert_eq!(snap_quarter_turn(quarter - 0.1), quarter);
        assert_eq!(snap_quarter_turn(-quarter * 1.9), -quarter * 2.0);
    }
}
