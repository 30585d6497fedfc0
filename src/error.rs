use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoothError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("Resource unavailable: {resource}: {details}")]
    ResourceUnavailable { resource: String, details: String },

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl BoothError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn resource_unavailable<S: Into<String>, D: ToString>(resource: S, details: D) -> Self {
        Self::ResourceUnavailable {
            resource: resource.into(),
            details: details.to_string(),
        }
    }
}

/// Camera failures. `Frame` is the only transient variant.
#[derive(Error, Debug, Clone)]
pub enum CaptureError {
    #[error("Camera not open")]
    NotOpen,

    #[error("Camera configuration failed: {details}")]
    Configuration { details: String },

    #[error("Preview failed: {details}")]
    Preview { details: String },

    #[error("Frame capture to {} failed: {details}", path.display())]
    Frame { path: PathBuf, details: String },
}

impl CaptureError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CaptureError::Frame { .. })
    }
}

#[derive(Error, Debug, Clone)]
pub enum DisplayError {
    #[error("Framebuffer error: {details}")]
    Framebuffer { details: String },

    #[error("Failed to load image {}: {details}", path.display())]
    ImageLoad { path: PathBuf, details: String },

    #[error("No images available in {}", dir.display())]
    NoImages { dir: PathBuf },
}

#[derive(Error, Debug, Clone)]
pub enum SignalError {
    #[error("GPIO {name} at {} unavailable: {details}", path.display())]
    Gpio {
        name: String,
        path: PathBuf,
        details: String,
    },

    #[error("Input device error: {details}")]
    Input { details: String },

    #[error("Trigger source closed")]
    Closed,
}

#[derive(Error, Debug, Clone)]
pub enum UploadError {
    #[error("Failed to spawn upload command: {details}")]
    Spawn { details: String },

    #[error("Upload command exited with {status}")]
    Failed { status: String },
}

#[derive(Error, Debug, Clone)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },
}

pub type Result<T> = std::result::Result<T, BoothError>;
