mod config;
mod game;
mod plugins;
mod storage;

use bevy::prelude::*;

use config::tuning::Tuning;
use plugins::{game_plugin::GamePlugin, storage_plugin::StoragePlugin};

fn main() {
    let tuning = Tuning::load_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Dungeon Slash".into(),
                resolution: (960u32, 540u32).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(Time::<Fixed>::from_seconds(tuning.dt as f64))
        .insert_resource(tuning)
        .add_plugins(StoragePlugin)
        .add_plugins(GamePlugin)
        .run();
}
