pub mod game_plugin;
pub mod storage_plugin;
