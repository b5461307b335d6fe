pub mod audio;
pub mod background;
pub mod camera;
pub mod levels;
pub mod particles;
pub mod player;
pub mod startup;
pub mod ui;
