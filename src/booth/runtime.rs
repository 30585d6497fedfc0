use super::{BoothOrchestrator, ShutdownReason};
use crate::error::{BoothError, Result, SignalError};
use crate::events::{BoothEvent, EventBus};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::{broadcast, Mutex};
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Pause before waiting again after a failed trigger read
const TRIGGER_RETRY_DELAY: Duration = Duration::from_secs(1);

impl BoothOrchestrator {
    /// Run the booth loop until a signal or shutdown request, then shut down
    pub async fn run(&mut self) -> Result<i32> {
        info!("Photo booth is running");

        let shutdown_receiver = self
            .shutdown_receiver
            .take()
            .ok_or_else(|| BoothError::system("Shutdown receiver already taken"))?;

        self.install_signal_handlers();
        let requests = self.event_bus.subscribe();

        let shutdown_reason = tokio::select! {
            reason = shutdown_receiver => reason.unwrap_or_else(|_| {
                ShutdownReason::Error("Shutdown channel closed unexpectedly".to_string())
            }),
            reason = wait_for_shutdown_request(requests) => reason,
            reason = self.booth_loop() => reason,
        };

        info!("Shutdown initiated: {:?}", shutdown_reason);
        let release_code = self.shutdown().await?;
        let exit_code = match shutdown_reason {
            ShutdownReason::Error(_) => 1,
            _ => release_code,
        };

        info!("Photo booth shutdown complete");
        Ok(exit_code)
    }

    /// Ready LED on, wait for a press, LED off, debounce, one session. Forever.
    async fn booth_loop(&mut self) -> ShutdownReason {
        loop {
            if let Err(e) = self.adapters.signals.set_led(true).await {
                warn!("Failed to assert ready LED: {}", e);
            }

            let trigger = match self.adapters.signals.wait_for_trigger().await {
                Ok(trigger) => trigger,
                Err(SignalError::Closed) => {
                    error!("Trigger source closed");
                    return ShutdownReason::Error("Trigger source closed".to_string());
                }
                Err(e) => {
                    warn!("Waiting for trigger failed: {}", e);
                    publish(
                        &self.event_bus,
                        BoothEvent::SystemError {
                            component: "hardware".to_string(),
                            error: e.to_string(),
                        },
                    );
                    sleep(TRIGGER_RETRY_DELAY).await;
                    continue;
                }
            };

            info!("Trigger received from {}", trigger.source);
            publish(
                &self.event_bus,
                BoothEvent::TriggerReceived {
                    timestamp: trigger.timestamp,
                },
            );

            if let Err(e) = self.adapters.signals.set_led(false).await {
                warn!("Failed to deassert ready LED: {}", e);
            }
            sleep(self.config.session.debounce()).await;

            self.controller.run_session().await;
        }
    }

    /// Route SIGTERM and SIGINT into the shutdown channel; installs at most once.
    /// A signal that arrives before `run` stays queued until the loop starts.
    pub(super) fn install_signal_handlers(&mut self) {
        let Some(shutdown_sender) = self.shutdown_sender.take() else {
            return;
        };
        let shutdown_sender = Arc::new(Mutex::new(Some(shutdown_sender)));

        // Handle SIGTERM (systemd stop) - Unix only
        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            tokio::spawn(async move {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate())
                {
                    Ok(sigterm) => sigterm,
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        return;
                    }
                };
                if sigterm.recv().await.is_some() {
                    info!("Received SIGTERM signal");
                    if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                        let _ = sender.send(ShutdownReason::Signal("SIGTERM".to_string()));
                    }
                }
            });
        }

        // Handle SIGINT (Ctrl+C) - Cross-platform
        let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
        tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                info!("Received SIGINT signal (Ctrl+C)");
                if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Signal("SIGINT".to_string()));
                }
            }
        });
    }
}

async fn wait_for_shutdown_request(
    mut requests: broadcast::Receiver<BoothEvent>,
) -> ShutdownReason {
    loop {
        match requests.recv().await {
            Ok(BoothEvent::ShutdownRequested { reason, .. }) => {
                return ShutdownReason::UserRequest(reason);
            }
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => std::future::pending().await,
        }
    }
}

fn publish(event_bus: &EventBus, event: BoothEvent) {
    if let Err(e) = event_bus.publish(event) {
        warn!("Failed to publish booth event: {}", e);
    }
}
