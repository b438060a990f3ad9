// End-to-end flow over the public crate surface: an in-memory store stands
// in for the realtime backend, sensor pushes are plain store writes, and the
// physical pump is represented by whatever lands on manual_override.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use verdant::config::{ControlConfig, NotificationConfig};
use verdant::controller::{Controller, Mode, PumpCommand};
use verdant::telemetry::{paths, MemoryStore, StoreUpdate, TelemetryStore};

async fn next_override(rx: &mut tokio::sync::broadcast::Receiver<StoreUpdate>) -> String {
    loop {
        let update = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for pump command")
            .expect("store channel closed");
        if update.path == paths::MANUAL_OVERRIDE {
            return update.value.as_str().expect("non-string command").to_string();
        }
    }
}

#[tokio::test]
async fn dry_spell_then_operator_takeover() {
    let store = Arc::new(MemoryStore::new());
    let mut controller = Controller::new(
        Arc::clone(&store),
        ControlConfig::default(),
        NotificationConfig::default(),
    );
    let mut alerts = controller.alerts();
    controller.start();
    let mut rx = store.subscribe();

    // A drying plant: the controller waters once the reading crosses the
    // threshold and keeps asserting the command while it stays dry.
    for (moisture, expected) in [(45, "off"), (25, "on"), (10, "on"), (35, "off")] {
        store
            .write(paths::SOIL_MOISTURE, json!(moisture))
            .await
            .unwrap();
        assert_eq!(next_override(&mut rx).await, expected);
    }

    // Reservoir runs low during the same session
    store.write(paths::WATER_LEVEL, json!(12)).await.unwrap();
    let alert = timeout(Duration::from_secs(1), alerts.recv())
        .await
        .expect("no low-water alert")
        .unwrap();
    assert_eq!(alert.level, 12);

    // Operator takes over and waters by hand despite moist soil
    controller.set_mode(Mode::Manual).await.unwrap();
    controller.set_manual_pump(true).await.unwrap();
    assert_eq!(next_override(&mut rx).await, "on");

    // Moisture pushes no longer move the pump
    store.write(paths::SOIL_MOISTURE, json!(90)).await.unwrap();
    assert!(
        timeout(Duration::from_millis(250), next_override(&mut rx))
            .await
            .is_err()
    );

    // Handing control back re-applies the rule to the cached reading
    controller.set_mode(Mode::Auto).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.command, PumpCommand::Off);
    assert_eq!(snapshot.mode, Mode::Auto);
    assert_eq!(snapshot.reading.soil_moisture, Some(90));

    controller.stop();
}
