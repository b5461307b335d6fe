use bevy::audio::Volume;
use bevy::prelude::*;

use crate::config::GameConfig;
use crate::systems::levels::LevelStarted;

#[derive(Component)]
pub struct MusicTrack;

fn spawn_track(commands: &mut Commands, asset_server: &AssetServer, path: &str, volume: f32) {
    commands.spawn((
        AudioBundle {
            source: asset_server.load::<AudioSource>(path.to_string()),
            settings: PlaybackSettings::LOOP.with_volume(Volume::new(volume)),
        },
        MusicTrack,
    ));
}

pub fn play_menu_music(mut commands: Commands, cfg: Res<GameConfig>, asset_server: Res<AssetServer>) {
    if let Some(path) = cfg.audio.menu_music.as_deref() {
        spawn_track(&mut commands, &asset_server, path, cfg.audio.volume);
    }
}

/// Every reset starts the level track from the beginning.
pub fn restart_level_music(
    mut commands: Commands,
    mut started: EventReader<LevelStarted>,
    cfg: Res<GameConfig>,
    asset_server: Res<AssetServer>,
    q_tracks: Query<Entity, With<MusicTrack>>,
) {
    if started.read().last().is_none() { return; }
    let Some(path) = cfg.audio.level_music.as_deref() else { return; };
    for e in q_tracks.iter() {
        commands.entity(e).despawn_recursive();
    }
    spawn_track(&mut commands, &asset_server, path, cfg.audio.volume);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn music_app(level_music: Option<&str>) -> App {
        let mut cfg = GameConfig::default();
        cfg.audio.level_music = level_music.map(str::to_string);
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<AudioSource>()
            .insert_resource(cfg)
            .add_event::<LevelStarted>()
            .add_systems(Update, restart_level_music);
        app
    }

    fn tracks(app: &mut App) -> Vec<Entity> {
        let mut q = app.world_mut().query_filtered::<Entity, With<MusicTrack>>();
        q.iter(app.world()).collect()
    }

    #[test]
    fn level_start_replaces_running_track() {
        let mut app = music_app(Some("music/level.ogg"));
        let menu_track = app.world_mut().spawn(MusicTrack).id();

        app.update();
        assert_eq!(tracks(&mut app), vec![menu_track]);

        app.world_mut().send_event(LevelStarted { index: 0 });
        app.update();
        let after = tracks(&mut app);
        assert_eq!(after.len(), 1);
        assert_ne!(after[0], menu_track);
    }

    #[test]
    fn no_level_track_keeps_menu_music() {
        let mut app = music_app(None);
        let menu_track = app.world_mut().spawn(MusicTrack).id();

        app.world_mut().send_event(LevelStarted { index: 0 });
        app.update();
        assert_eq!(tracks(&mut app), vec![menu_track]);
    }
}
