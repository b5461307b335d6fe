use bevy::prelude::*;
use level_format::LevelInfo;
use serde::Deserialize;
use std::fs;

use crate::physics::Tuning;

// Tuned at 60 frames/sec in px/frame, stored here per second.
const DEFAULT_RUN_SPEED: f32 = 600.0;
const DEFAULT_GRAVITY: f32 = 5472.0;
const DEFAULT_MAX_FALL_SPEED: f32 = 6000.0;
const DEFAULT_DEATH_MARGIN: f32 = 200.0;
const DEFAULT_JUMP_VELOCITY: f32 = 780.0;
const DEFAULT_ORB_VELOCITY: f32 = 912.0;
const DEFAULT_JUMP_TUNING_STEP: f32 = 60.0;

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct PhysicsCfg {
    pub run_speed: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    // How far below the last grid row the player may fall before dying
    pub death_margin: f32,
}

impl Default for PhysicsCfg {
    fn default() -> Self {
        Self {
            run_speed: DEFAULT_RUN_SPEED,
            gravity: DEFAULT_GRAVITY,
            max_fall_speed: DEFAULT_MAX_FALL_SPEED,
            death_margin: DEFAULT_DEATH_MARGIN,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct JumpCfg {
    pub velocity: f32,
    pub orb_velocity: f32,
    // Change applied per press of the tuning keys
    pub tuning_step: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for JumpCfg {
    fn default() -> Self {
        Self {
            velocity: DEFAULT_JUMP_VELOCITY,
            orb_velocity: DEFAULT_ORB_VELOCITY,
            tuning_step: DEFAULT_JUMP_TUNING_STEP,
            min: 0.0,
            max: DEFAULT_JUMP_VELOCITY * 3.0,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CameraCfg {
    // Screen-space x (from the left edge) the player is pinned to
    pub player_screen_x: f32,
    // Vertical margin before the camera starts following
    pub margin_y: f32,
    // Time constant (seconds) for vertical smoothing
    pub lag_s: f32,
}

impl Default for CameraCfg {
    fn default() -> Self {
        Self { player_screen_x: 100.0, margin_y: 120.0, lag_s: 0.15 }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct AudioCfg {
    pub menu_music: Option<String>,
    pub level_music: Option<String>,
    pub volume: f32,
}

impl Default for AudioCfg {
    fn default() -> Self {
        Self { menu_music: None, level_music: None, volume: 0.6 }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct BackdropCfg {
    pub color: [f32; 3],
    pub image: Option<String>,
    // 0.0 pins the backdrop to the world, 1.0 pins it to the camera
    pub parallax: f32,
}

impl Default for BackdropCfg {
    fn default() -> Self {
        Self { color: [0.16, 0.12, 0.22], image: None, parallax: 0.9 }
    }
}

#[derive(Deserialize, Resource, Clone, Debug)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsCfg,
    pub jump: JumpCfg,
    pub camera: CameraCfg,
    pub audio: AudioCfg,
    pub backdrop: BackdropCfg,
    pub levels: Vec<LevelInfo>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsCfg::default(),
            jump: JumpCfg::default(),
            camera: CameraCfg::default(),
            audio: AudioCfg::default(),
            backdrop: BackdropCfg::default(),
            levels: default_levels(),
        }
    }
}

impl GameConfig {
    pub fn tuning(&self) -> Tuning {
        Tuning {
            run_speed: self.physics.run_speed,
            gravity: self.physics.gravity,
            max_fall_speed: self.physics.max_fall_speed,
            orb_velocity: self.jump.orb_velocity,
        }
    }

    pub fn clamp_jump(&self, power: f32) -> f32 {
        power.clamp(self.jump.min, self.jump.max)
    }
}

pub fn default_levels() -> Vec<LevelInfo> {
    vec![LevelInfo {
        name: "Beta".to_string(),
        path: "levels/level_1.csv".to_string(),
    }]
}

pub fn parse_config(content: &str) -> Result<GameConfig, toml::de::Error> {
    let mut cfg = toml::from_str::<GameConfig>(content)?;
    if cfg.levels.is_empty() {
        cfg.levels = default_levels();
    }
    Ok(cfg)
}

pub fn load_config() -> GameConfig {
    match fs::read_to_string(CONFIG_PATH) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            warn!("Ignoring {}: {}", CONFIG_PATH, e);
            GameConfig::default()
        }),
        Err(_) => GameConfig::default(),
    }
}
