use crate::error::EventBusError;
use crate::session::{BoothPhase, SessionStatus};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Events published by the booth while it runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BoothEvent {
    /// The button was pressed while the booth was idle
    TriggerReceived { timestamp: SystemTime },
    /// The session controller entered a new phase
    PhaseChanged {
        phase: BoothPhase,
        timestamp: SystemTime,
    },
    /// A session ran to completion, was aborted, or failed
    SessionFinished {
        session: String,
        status: SessionStatus,
        photo_count: usize,
    },
    /// The upload collaborator finished
    UploadFinished { session: String, success: bool },
    /// A system error occurred in a component
    SystemError { component: String, error: String },
    /// System shutdown requested
    ShutdownRequested {
        timestamp: SystemTime,
        reason: String,
    },
}

impl BoothEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            BoothEvent::TriggerReceived { .. } => "Trigger received".to_string(),
            BoothEvent::PhaseChanged { phase, .. } => format!("Phase changed to {:?}", phase),
            BoothEvent::SessionFinished {
                session,
                status,
                photo_count,
            } => {
                format!(
                    "Session {} finished: {:?} ({} photos)",
                    session, status, photo_count
                )
            }
            BoothEvent::UploadFinished { session, success } => {
                format!(
                    "Upload for {} {}",
                    session,
                    if *success { "succeeded" } else { "failed" }
                )
            }
            BoothEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
            BoothEvent::ShutdownRequested { reason, .. } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            BoothEvent::TriggerReceived { .. } => "trigger_received",
            BoothEvent::PhaseChanged { .. } => "phase_changed",
            BoothEvent::SessionFinished { .. } => "session_finished",
            BoothEvent::UploadFinished { .. } => "upload_finished",
            BoothEvent::SystemError { .. } => "system_error",
            BoothEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Event bus for booth observers using broadcast channels
pub struct EventBus {
    sender: broadcast::Sender<BoothEvent>,
    debug_logging: bool,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: true,
        }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<BoothEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers that received it; zero subscribers is not an error.
    pub fn publish(&self, event: BoothEvent) -> Result<usize, EventBusError> {
        match &event {
            BoothEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            BoothEvent::UploadFinished { success: false, session } => {
                warn!("Upload failed for session {}", session);
            }
            BoothEvent::ShutdownRequested { reason, .. } => {
                info!("Shutdown requested: {}", reason);
            }
            _ => {
                if self.debug_logging {
                    debug!("Event: {}", event.description());
                }
            }
        }

        if self.sender.receiver_count() == 0 {
            return Ok(0);
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            debug_logging: self.debug_logging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = EventBus::new(10);
        let delivered = bus
            .publish(BoothEvent::TriggerReceived {
                timestamp: SystemTime::now(),
            })
            .unwrap();
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = EventBus::new(10);
        let mut receiver = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(BoothEvent::PhaseChanged {
            phase: BoothPhase::Prep,
            timestamp: SystemTime::now(),
        })
        .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_type(), "phase_changed");
        assert!(event.description().contains("Prep"));
    }

    #[test]
    fn test_session_finished_description() {
        let event = BoothEvent::SessionFinished {
            session: "2024-10-14-18-30-00".to_string(),
            status: SessionStatus::Completed,
            photo_count: 4,
        };
        assert_eq!(
            event.description(),
            "Session 2024-10-14-18-30-00 finished: Completed (4 photos)"
        );
    }
}
