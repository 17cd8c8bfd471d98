use crate::game::session::PlayerProfile;

/// Repository trait for player profile access.
pub trait ProfileRepository: Send + Sync {
    /// Load the profile stored under `slot`, or None when absent.
    fn load_profile(&self, slot: &str) -> Option<PlayerProfile>;

    fn save_profile(&self, slot: &str, profile: &PlayerProfile) -> Result<(), String>;
}
