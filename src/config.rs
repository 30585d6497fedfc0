use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Immutable booth configuration, loaded once at process start.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BoothConfig {
    pub display: DisplayConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub camera: CameraConfig,
    pub hardware: HardwareConfig,
    pub upload: UploadConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    /// Screen resolution (width, height)
    #[serde(default = "default_display_resolution")]
    pub resolution: (u32, u32),

    /// Framebuffer device path
    #[serde(default = "default_framebuffer_device")]
    pub framebuffer_device: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Directory captured photos are written to
    #[serde(default = "default_capture_dir")]
    pub capture_dir: PathBuf,

    /// Directory holding the intro/processing/uploading/finished screens
    #[serde(default = "default_display_dir")]
    pub display_dir: PathBuf,

    /// Directory holding pose-prompt images
    #[serde(default = "default_pose_dir")]
    pub pose_dir: PathBuf,

    /// Delete previously captured photos when the booth starts
    #[serde(default)]
    pub clear_on_startup: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Photos taken per session
    #[serde(default = "default_total_pics")]
    pub total_pics: u32,

    /// Delay applied after a trigger before the session starts
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Time the pose prompt is shown before the first photo
    #[serde(default = "default_prep_delay_ms")]
    pub prep_delay_ms: u64,

    /// Time each pose image is shown before its exposure
    #[serde(default = "default_capture_delay_ms")]
    pub capture_delay_ms: u64,

    /// Time the processing/uploading indicator stays on screen
    #[serde(default = "default_post_capture_delay_ms")]
    pub post_capture_delay_ms: u64,

    /// Number of times the session's photos are replayed
    #[serde(default = "default_replay_cycles")]
    pub replay_cycles: u32,

    /// Time each replayed photo stays on screen
    #[serde(default = "default_replay_delay_ms")]
    pub replay_delay_ms: u64,

    /// Cooldown before the booth accepts the next trigger
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Capture resolution mode
    #[serde(default)]
    pub resolution: CaptureResolution,

    /// Sensor ISO (100, 200, 320, 400, 500, 640, 800)
    #[serde(default = "default_camera_iso")]
    pub iso: u32,

    /// Fire the flash output during each exposure
    #[serde(default)]
    pub flash_enabled: bool,

    /// Still capture command
    #[serde(default = "default_still_command")]
    pub still_command: String,

    /// Optional long-running preview command, started for each session
    #[serde(default)]
    pub preview_command: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureResolution {
    Low,
    #[default]
    High,
}

impl CaptureResolution {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CaptureResolution::Low => (1296, 972),
            CaptureResolution::High => (2592, 1944),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HardwareConfig {
    /// Signal backend driving the button, LED and flash
    #[serde(default)]
    pub backend: HardwareBackend,

    /// Button GPIO value file (sysfs backend)
    #[serde(default = "default_button_path")]
    pub button_path: PathBuf,

    /// Button reads 0 when pressed
    #[serde(default = "default_button_active_low")]
    pub button_active_low: bool,

    /// LED GPIO value file
    #[serde(default = "default_led_path")]
    pub led_path: PathBuf,

    /// Flash GPIO value file
    #[serde(default = "default_flash_path")]
    pub flash_path: PathBuf,

    /// Button polling interval (sysfs backend)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Input device for the evdev backend
    #[serde(default = "default_input_device")]
    pub input_device: PathBuf,

    /// Key code reported by the button on the evdev backend
    #[serde(default = "default_key_code")]
    pub key_code: String,

    /// LED blinks on startup and after clearing old photos
    #[serde(default = "default_startup_blinks")]
    pub startup_blinks: u32,

    /// Half-period of an acknowledgement blink
    #[serde(default = "default_blink_interval_ms")]
    pub blink_interval_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HardwareBackend {
    #[default]
    Sysfs,
    Evdev,
    Keyboard,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct UploadConfig {
    /// Upload captured photos after each session
    #[serde(default)]
    pub enabled: bool,

    /// Shell command run with the session's photo paths appended
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl BoothConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("photobooth.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default(
                "display.resolution",
                vec![default_display_resolution().0, default_display_resolution().1],
            )?
            .set_default("display.framebuffer_device", default_framebuffer_device())?
            .set_default("storage.capture_dir", path_default(default_capture_dir()))?
            .set_default("storage.display_dir", path_default(default_display_dir()))?
            .set_default("storage.pose_dir", path_default(default_pose_dir()))?
            .set_default("storage.clear_on_startup", false)?
            .set_default("session.total_pics", default_total_pics())?
            .set_default("session.debounce_ms", default_debounce_ms())?
            .set_default("session.prep_delay_ms", default_prep_delay_ms())?
            .set_default("session.capture_delay_ms", default_capture_delay_ms())?
            .set_default(
                "session.post_capture_delay_ms",
                default_post_capture_delay_ms(),
            )?
            .set_default("session.replay_cycles", default_replay_cycles())?
            .set_default("session.replay_delay_ms", default_replay_delay_ms())?
            .set_default("session.restart_delay_ms", default_restart_delay_ms())?
            .set_default("camera.resolution", "high")?
            .set_default("camera.iso", default_camera_iso())?
            .set_default("camera.flash_enabled", false)?
            .set_default("camera.still_command", default_still_command())?
            .set_default("hardware.backend", "sysfs")?
            .set_default("hardware.button_path", path_default(default_button_path()))?
            .set_default("hardware.button_active_low", default_button_active_low())?
            .set_default("hardware.led_path", path_default(default_led_path()))?
            .set_default("hardware.flash_path", path_default(default_flash_path()))?
            .set_default("hardware.poll_interval_ms", default_poll_interval_ms())?
            .set_default("hardware.input_device", path_default(default_input_device()))?
            .set_default("hardware.key_code", default_key_code())?
            .set_default("hardware.startup_blinks", default_startup_blinks())?
            .set_default("hardware.blink_interval_ms", default_blink_interval_ms())?
            .set_default("upload.enabled", false)?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // PHOTOBOOTH_SESSION__TOTAL_PICS=6 style overrides
            .add_source(
                Environment::with_prefix("PHOTOBOOTH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: BoothConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.resolution.0 == 0 || self.display.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Display resolution must be greater than 0".to_string(),
            ));
        }

        if self.session.total_pics == 0 {
            return Err(ConfigError::Message(
                "Session total_pics must be greater than 0".to_string(),
            ));
        }

        if !(100..=800).contains(&self.camera.iso) {
            return Err(ConfigError::Message(format!(
                "Camera iso must be between 100 and 800, got {}",
                self.camera.iso
            )));
        }

        if self.camera.still_command.trim().is_empty() {
            return Err(ConfigError::Message(
                "Camera still_command must not be empty".to_string(),
            ));
        }

        for (name, path) in [
            ("capture_dir", &self.storage.capture_dir),
            ("display_dir", &self.storage.display_dir),
            ("pose_dir", &self.storage.pose_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Message(format!(
                    "Storage {} must not be empty",
                    name
                )));
            }
        }

        if self.hardware.backend == HardwareBackend::Sysfs
            && self.hardware.button_path.as_os_str().is_empty()
        {
            return Err(ConfigError::Message(
                "Hardware button_path is required for the sysfs backend".to_string(),
            ));
        }

        if self.hardware.backend == HardwareBackend::Sysfs && self.hardware.poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "Hardware poll_interval_ms must be greater than 0 for the sysfs backend"
                    .to_string(),
            ));
        }

        if self.upload.enabled && self.upload.command.is_none() {
            return Err(ConfigError::Message(
                "Upload is enabled but no upload command is configured".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl SessionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn prep_delay(&self) -> Duration {
        Duration::from_millis(self.prep_delay_ms)
    }

    pub fn capture_delay(&self) -> Duration {
        Duration::from_millis(self.capture_delay_ms)
    }

    pub fn post_capture_delay(&self) -> Duration {
        Duration::from_millis(self.post_capture_delay_ms)
    }

    pub fn replay_delay(&self) -> Duration {
        Duration::from_millis(self.replay_delay_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

impl HardwareConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig {
                resolution: default_display_resolution(),
                framebuffer_device: default_framebuffer_device(),
            },
            storage: StorageConfig {
                capture_dir: default_capture_dir(),
                display_dir: default_display_dir(),
                pose_dir: default_pose_dir(),
                clear_on_startup: false,
            },
            session: SessionConfig {
                total_pics: default_total_pics(),
                debounce_ms: default_debounce_ms(),
                prep_delay_ms: default_prep_delay_ms(),
                capture_delay_ms: default_capture_delay_ms(),
                post_capture_delay_ms: default_post_capture_delay_ms(),
                replay_cycles: default_replay_cycles(),
                replay_delay_ms: default_replay_delay_ms(),
                restart_delay_ms: default_restart_delay_ms(),
            },
            camera: CameraConfig {
                resolution: CaptureResolution::High,
                iso: default_camera_iso(),
                flash_enabled: false,
                still_command: default_still_command(),
                preview_command: None,
            },
            hardware: HardwareConfig {
                backend: HardwareBackend::Sysfs,
                button_path: default_button_path(),
                button_active_low: default_button_active_low(),
                led_path: default_led_path(),
                flash_path: default_flash_path(),
                poll_interval_ms: default_poll_interval_ms(),
                input_device: default_input_device(),
                key_code: default_key_code(),
                startup_blinks: default_startup_blinks(),
                blink_interval_ms: default_blink_interval_ms(),
            },
            upload: UploadConfig::default(),
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

fn path_default(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

// Default value functions
fn default_display_resolution() -> (u32, u32) {
    (800, 600)
}
fn default_framebuffer_device() -> String {
    "/dev/fb0".to_string()
}

fn default_capture_dir() -> PathBuf {
    PathBuf::from("./pics")
}
fn default_display_dir() -> PathBuf {
    PathBuf::from("./display_pics")
}
fn default_pose_dir() -> PathBuf {
    PathBuf::from("./pose_pics")
}

fn default_total_pics() -> u32 {
    4
}
fn default_debounce_ms() -> u64 {
    1000
}
fn default_prep_delay_ms() -> u64 {
    5000
}
fn default_capture_delay_ms() -> u64 {
    3000
}
fn default_post_capture_delay_ms() -> u64 {
    3000
}
fn default_replay_cycles() -> u32 {
    2
}
fn default_replay_delay_ms() -> u64 {
    1500
}
fn default_restart_delay_ms() -> u64 {
    10000
}

fn default_camera_iso() -> u32 {
    400
}
fn default_still_command() -> String {
    "rpicam-still".to_string()
}

fn default_button_path() -> PathBuf {
    PathBuf::from("/sys/class/gpio/gpio18/value")
}
fn default_button_active_low() -> bool {
    true
}
fn default_led_path() -> PathBuf {
    PathBuf::from("/sys/class/gpio/gpio7/value")
}
fn default_flash_path() -> PathBuf {
    PathBuf::from("/sys/class/gpio/gpio17/value")
}
fn default_poll_interval_ms() -> u64 {
    20
}
fn default_input_device() -> PathBuf {
    PathBuf::from("/dev/input/event0")
}
fn default_key_code() -> String {
    "KEY_ENTER".to_string()
}
fn default_startup_blinks() -> u32 {
    5
}
fn default_blink_interval_ms() -> u64 {
    250
}

fn default_event_bus_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BoothConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.display.resolution, (800, 600));
        assert_eq!(config.session.total_pics, 4);
        assert_eq!(config.camera.iso, 400);
        assert_eq!(config.camera.resolution.dimensions(), (2592, 1944));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[display]
resolution = [1600, 1200]

[session]
total_pics = 3
prep_delay_ms = 250

[camera]
resolution = "low"
iso = 800
flash_enabled = true

[hardware]
backend = "keyboard"
"#
        )
        .unwrap();

        let config = BoothConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.display.resolution, (1600, 1200));
        assert_eq!(config.session.total_pics, 3);
        assert_eq!(config.session.prep_delay(), Duration::from_millis(250));
        // Untouched keys keep their defaults
        assert_eq!(config.session.restart_delay_ms, 10000);
        assert_eq!(config.camera.resolution, CaptureResolution::Low);
        assert!(config.camera.flash_enabled);
        assert_eq!(config.hardware.backend, HardwareBackend::Keyboard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = BoothConfig::load_from_file("/nonexistent/photobooth.toml").unwrap();
        assert_eq!(config.session.total_pics, default_total_pics());
        assert_eq!(config.storage.capture_dir, default_capture_dir());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BoothConfig::default();

        config.session.total_pics = 0;
        assert!(config.validate().is_err());
        config.session.total_pics = 4;

        config.camera.iso = 1600;
        assert!(config.validate().is_err());
        config.camera.iso = 400;

        config.display.resolution = (0, 600);
        assert!(config.validate().is_err());
        config.display.resolution = (800, 600);

        config.upload.enabled = true;
        assert!(config.validate().is_err());
        config.upload.command = Some("echo".to_string());
        assert!(config.validate().is_ok());
    }
}
