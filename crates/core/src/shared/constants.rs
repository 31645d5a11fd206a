/// Directory name under the platform config/data roots.
pub const APP_DIR_NAME: &str = "FaceAuth";

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const PROFILES_FILE_NAME: &str = "profiles.json";

/// Replay spacing for the recognition loop (~30 fps).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;
