use bevy::app::AppExit;
use bevy::prelude::*;

use crate::components::{HudText, JumpPower, Player, ScreenUi};
use crate::resources::{Attempts, GameState, LevelBounds, LevelManager, LevelRequest};

const TIP: &str = "tip: tap and hold for the first few seconds of the level";

const LEVEL_KEYS: [(KeyCode, KeyCode); 9] = [
    (KeyCode::Digit1, KeyCode::Numpad1),
    (KeyCode::Digit2, KeyCode::Numpad2),
    (KeyCode::Digit3, KeyCode::Numpad3),
    (KeyCode::Digit4, KeyCode::Numpad4),
    (KeyCode::Digit5, KeyCode::Numpad5),
    (KeyCode::Digit6, KeyCode::Numpad6),
    (KeyCode::Digit7, KeyCode::Numpad7),
    (KeyCode::Digit8, KeyCode::Numpad8),
    (KeyCode::Digit9, KeyCode::Numpad9),
];

fn line(parent: &mut ChildBuilder, text: impl Into<String>, size: f32, color: Color) {
    parent.spawn(TextBundle::from_section(
        text,
        TextStyle { font_size: size, color, ..default() },
    ));
}

fn spawn_screen(commands: &mut Commands, state: GameState, bg: Color) -> Entity {
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    top: Val::Px(0.0),
                    left: Val::Px(0.0),
                    right: Val::Px(0.0),
                    bottom: Val::Px(0.0),
                    flex_direction: FlexDirection::Column,
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Start,
                    padding: UiRect::left(Val::Px(100.0)),
                    row_gap: Val::Px(28.0),
                    ..default()
                },
                background_color: BackgroundColor(bg),
                visibility: Visibility::Hidden,
                ..default()
            },
            ScreenUi(state),
        ))
        .id()
}

pub fn setup_ui(mut commands: Commands, level_mgr: Res<LevelManager>) {
    // HUD
    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle { font_size: 20.0, color: Color::WHITE, ..default() },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            left: Val::Px(10.0),
            ..default()
        }),
        HudText,
    ));

    let menu = spawn_screen(&mut commands, GameState::Menu, Color::BLACK);
    commands.entity(menu).with_children(|p| {
        line(p, "Welcome to Gravity Craft. Choose a level by keypad", 24.0, Color::WHITE);
        for (i, level) in level_mgr.levels.iter().enumerate().take(LEVEL_KEYS.len()) {
            line(p, format!("{}: {}", i + 1, level.name), 20.0, Color::WHITE);
        }
        line(p, "Controls: jump: Space/Up", 20.0, Color::srgb(0.2, 0.4, 1.0));
        line(p, "Exit: Esc", 20.0, Color::srgb(1.0, 0.0, 0.0));
        line(p, "Press SPACE to start", 20.0, Color::WHITE);
        line(p, TIP, 20.0, Color::srgb(0.0, 1.0, 0.0));
    });

    let won = spawn_screen(&mut commands, GameState::Won, Color::srgb(1.0, 1.0, 0.0));
    commands.entity(won).with_children(|p| {
        line(p, "Good Game", 42.0, Color::srgb(0.0, 0.0, 1.0));
        line(p, "Press SPACE to play again", 20.0, Color::srgb(0.0, 0.0, 1.0));
    });

    let died = spawn_screen(&mut commands, GameState::Died, Color::srgb(0.63, 0.32, 0.18));
    commands.entity(died).with_children(|p| {
        line(p, "You lose. One more?", 42.0, Color::WHITE);
        line(p, "Press SPACE to retry", 20.0, Color::WHITE);
        line(p, TIP, 20.0, Color::srgb(0.0, 1.0, 0.0));
    });
}

pub fn sync_screens_system(state: Res<GameState>, mut q_screens: Query<(&ScreenUi, &mut Visibility)>) {
    if !state.is_changed() { return; }
    for (screen, mut vis) in q_screens.iter_mut() {
        *vis = if screen.0 == *state { Visibility::Visible } else { Visibility::Hidden };
    }
}

/// Share of the way to the end marker already covered, in percent.
pub fn progress_percent(player_x: f32, finish_x: f32) -> u32 {
    if finish_x <= 0.0 {
        return 0;
    }
    ((player_x / finish_x).clamp(0.0, 1.0) * 100.0).floor() as u32
}

pub fn hud_text(level_name: &str, jump_power: f32, attempt: u32, progress: u32) -> String {
    format!("{}  |  {}%  |  jump {:.0}  |  attempt {}", level_name, progress, jump_power, attempt)
}

pub fn update_hud_system(
    state: Res<GameState>,
    level_mgr: Res<LevelManager>,
    attempts: Res<Attempts>,
    bounds: Option<Res<LevelBounds>>,
    q_player: Query<(&Transform, &JumpPower), With<Player>>,
    mut q_hud: Query<&mut Text, With<HudText>>,
) {
    let Ok(mut text) = q_hud.get_single_mut() else { return; };
    let value = match (*state, q_player.get_single(), level_mgr.current_level()) {
        (GameState::Running, Ok((t, power)), Some(level)) => {
            let progress = bounds.map_or(0, |b| progress_percent(t.translation.x, b.finish));
            hud_text(&level.name, power.0, attempts.0, progress)
        }
        _ => String::new(),
    };
    if text.sections[0].value != value {
        text.sections[0].value = value;
    }
}

/// Keys outside of gameplay: exit anywhere, pick a level and start or restart.
pub fn screen_input_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<GameState>,
    mut level_mgr: ResMut<LevelManager>,
    mut level_req: ResMut<LevelRequest>,
    mut exit: EventWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        info!("Exit requested");
        exit.send(AppExit::Success);
        return;
    }
    match *state {
        GameState::Menu => {
            for (i, (digit, numpad)) in LEVEL_KEYS.iter().enumerate() {
                if keyboard.any_just_pressed([*digit, *numpad]) && level_mgr.select(i) {
                    info!("Selected level {}", i + 1);
                }
            }
        }
        GameState::Running => return,
        GameState::Won | GameState::Died => {}
    }
    if keyboard.just_pressed(KeyCode::Space) && level_req.0.is_none() {
        level_req.0 = Some(level_mgr.current);
    }
}
