use super::*;
use crate::config::BoothConfig;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn sysfs_config(dir: &TempDir) -> crate::config::HardwareConfig {
    let mut config = BoothConfig::default().hardware;
    config.button_path = dir.path().join("button");
    config.led_path = dir.path().join("led");
    config.flash_path = dir.path().join("flash");
    config.poll_interval_ms = 5;
    config
}

#[tokio::test]
async fn test_mock_signals_record_history() {
    let signals = MockSignals::new();

    signals.set_led(true).await.unwrap();
    signals.set_flash(true).await.unwrap();
    assert!(signals.led());
    assert!(signals.flash());

    signals.release().await.unwrap();
    assert!(!signals.led());
    assert!(!signals.flash());
    assert!(signals.is_released());

    assert_eq!(
        signals.history(),
        vec![
            SignalChange::Led(true),
            SignalChange::Flash(true),
            SignalChange::Flash(false),
            SignalChange::Led(false),
        ]
    );
}

#[tokio::test]
async fn test_mock_trigger_is_delivered() {
    let signals = MockSignals::new();
    signals.trigger();

    let event = signals.wait_for_trigger().await.unwrap();
    assert_eq!(event.source, "mock");
}

#[test]
fn test_sysfs_requires_button_value_file() {
    let dir = TempDir::new().unwrap();
    let config = sysfs_config(&dir);

    let result = SysfsSignals::new(&config);
    assert!(matches!(
        result,
        Err(crate::error::SignalError::Gpio { ref name, .. }) if name == "button"
    ));
}

#[tokio::test]
async fn test_sysfs_outputs_write_value_files() {
    let dir = TempDir::new().unwrap();
    let config = sysfs_config(&dir);
    std::fs::write(&config.button_path, "1").unwrap();

    let signals = SysfsSignals::new(&config).unwrap();
    signals.set_led(true).await.unwrap();
    signals.set_flash(true).await.unwrap();
    assert_eq!(std::fs::read_to_string(&config.led_path).unwrap(), "1");
    assert_eq!(std::fs::read_to_string(&config.flash_path).unwrap(), "1");

    signals.release().await.unwrap();
    assert_eq!(std::fs::read_to_string(&config.led_path).unwrap(), "0");
    assert_eq!(std::fs::read_to_string(&config.flash_path).unwrap(), "0");
    assert!(!signals.led());
    assert!(!signals.flash());
}

#[tokio::test]
async fn test_sysfs_trigger_on_falling_edge() {
    let dir = TempDir::new().unwrap();
    let config = sysfs_config(&dir);
    // Active-low button at rest
    std::fs::write(&config.button_path, "1").unwrap();

    let signals = Arc::new(SysfsSignals::new(&config).unwrap());
    let button_path = config.button_path.clone();

    let press = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        std::fs::write(&button_path, "0").unwrap();
    });

    let event = tokio::time::timeout(Duration::from_secs(2), signals.wait_for_trigger())
        .await
        .expect("trigger not detected")
        .unwrap();
    assert_eq!(event.source, "gpio");
    press.await.unwrap();
}

#[tokio::test]
async fn test_sysfs_held_button_needs_release() {
    let dir = TempDir::new().unwrap();
    let config = sysfs_config(&dir);
    // Button already pressed when arming
    std::fs::write(&config.button_path, "0").unwrap();

    let signals = SysfsSignals::new(&config).unwrap();
    let result =
        tokio::time::timeout(Duration::from_millis(60), signals.wait_for_trigger()).await;
    assert!(result.is_err(), "held button must not retrigger");
}
