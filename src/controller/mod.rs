mod rules;

pub use rules::{evaluate, Mode, PumpCommand};

use crate::config::{ControlConfig, NotificationConfig};
use crate::notify::{self, Alert};
use crate::telemetry::{paths, rounded, SensorReading, StoreError, StoreUpdate, TelemetryStore};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Latest cached view for the display layer. Read-only, no I/O.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub reading: SensorReading,
    pub mode: Mode,
    pub command: PumpCommand,
    pub online: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            reading: SensorReading::default(),
            mode: Mode::Auto,
            command: PumpCommand::Off,
            online: false,
        }
    }
}

/// Errors reported to the initiating caller for operator actions
#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    /// The command sink rejected or could not complete a write.
    /// Cached state is left as last known; there is no retry.
    WriteFailure(StoreError),
    /// Manual pump command attempted while in auto mode
    ModeConflict,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::WriteFailure(e) => write!(f, "override write failed: {}", e),
            ControlError::ModeConflict => {
                write!(f, "manual pump command rejected while in auto mode")
            }
        }
    }
}

impl std::error::Error for ControlError {}

/// Store paths the controller mirrors into its snapshot
const WATCHED_PATHS: [&str; 7] = [
    paths::SOIL_MOISTURE,
    paths::TEMPERATURE,
    paths::HUMIDITY,
    paths::WATER_LEVEL,
    paths::MANUAL_OVERRIDE,
    paths::AUTO_MODE,
    paths::ONLINE,
];

/// Auto-irrigation controller.
///
/// Owns the subscription lifecycle: `start` subscribes to the store firehose
/// and spawns the event loop plus a dedicated writer task, `stop` tears both
/// down. In auto mode every known soil-moisture push issues a pump command
/// (level-triggered; the write is idempotent at the store). Operator actions
/// (`set_mode`, `set_manual_pump`) await their own write so failures are
/// reported synchronously, without stalling the event loop.
pub struct Controller<S: TelemetryStore> {
    store: Arc<S>,
    shared: Arc<RwLock<Snapshot>>,
    control: ControlConfig,
    notifications: NotificationConfig,
    alerts_tx: broadcast::Sender<Alert>,
    tasks: Vec<JoinHandle<()>>,
}

impl<S: TelemetryStore> Controller<S> {
    pub fn new(store: Arc<S>, control: ControlConfig, notifications: NotificationConfig) -> Self {
        let (alerts_tx, _) = broadcast::channel(16);

        Self {
            store,
            shared: Arc::new(RwLock::new(Snapshot::default())),
            control,
            notifications,
            alerts_tx,
            tasks: Vec::new(),
        }
    }

    /// Subscribe to low-water alerts
    pub fn alerts(&self) -> broadcast::Receiver<Alert> {
        self.alerts_tx.subscribe()
    }

    /// Latest cached values; non-blocking, no I/O
    pub fn snapshot(&self) -> Snapshot {
        self.shared.read().unwrap().clone()
    }

    /// Start the event loop and writer task.
    ///
    /// The firehose subscription is taken here, before the tasks spawn, so
    /// no push delivered after `start` returns can be missed.
    pub fn start(&mut self) {
        let update_rx = self.store.subscribe();
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let writer = tokio::spawn(write_loop(
            Arc::clone(&self.store),
            Arc::clone(&self.shared),
            cmd_rx,
        ));

        let event_loop = EventLoop {
            shared: Arc::clone(&self.shared),
            cmd_tx,
            alerts_tx: self.alerts_tx.clone(),
            moisture_threshold: self.control.moisture_threshold,
            water_level_threshold: self.notifications.water_level_threshold,
        };
        let events = tokio::spawn(event_loop.run(Arc::clone(&self.store), update_rx));

        self.tasks = vec![events, writer];
        info!("Controller started");
    }

    /// Tear down subscriptions. In-flight writes complete or fail silently.
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        info!("Controller stopped");
    }

    /// Persist the operator's mode selection.
    ///
    /// The cached mode is updated optimistically before the write; a failed
    /// write leaves it in place until a store push reconciles it. Entering
    /// auto mode immediately re-applies the threshold rule to the last
    /// cached reading rather than waiting for the next moisture push.
    pub async fn set_mode(&self, mode: Mode) -> Result<(), ControlError> {
        let moisture = {
            let mut snapshot = self.shared.write().unwrap();
            snapshot.mode = mode;
            snapshot.reading.soil_moisture
        };

        self.store
            .write(paths::AUTO_MODE, json!(mode.as_wire()))
            .await
            .map_err(ControlError::WriteFailure)?;

        if let Some(command) = evaluate(mode, moisture, self.control.moisture_threshold) {
            self.apply_override(command).await?;
        }

        Ok(())
    }

    /// Drive the pump directly. Valid only in manual mode; in auto mode the
    /// override is owned by the threshold rule and the command is rejected.
    pub async fn set_manual_pump(&self, on: bool) -> Result<(), ControlError> {
        if self.shared.read().unwrap().mode == Mode::Auto {
            return Err(ControlError::ModeConflict);
        }

        let command = PumpCommand::from_bool(on);
        self.apply_override(command).await?;

        // Compatibility shim: older firmware watches manual_pump_status
        // alongside the authoritative manual_override.
        if self.control.mirror_pump_status {
            self.store
                .write(paths::MANUAL_PUMP_STATUS, json!(command.as_wire()))
                .await
                .map_err(ControlError::WriteFailure)?;
        }

        Ok(())
    }

    /// Write the override and cache it only once the write succeeded
    async fn apply_override(&self, command: PumpCommand) -> Result<(), ControlError> {
        self.store
            .write(paths::MANUAL_OVERRIDE, json!(command.as_wire()))
            .await
            .map_err(ControlError::WriteFailure)?;

        self.shared.write().unwrap().command = command;
        Ok(())
    }
}

/// Applies auto-issued commands in order.
///
/// A dedicated task keeps the event loop responsive while a write is in
/// flight and serializes writes so an older command cannot overtake a newer
/// one. Failures here come from background evaluation, not an operator
/// action, so they are logged rather than surfaced.
async fn write_loop<S: TelemetryStore>(
    store: Arc<S>,
    shared: Arc<RwLock<Snapshot>>,
    mut cmd_rx: mpsc::Receiver<PumpCommand>,
) {
    while let Some(command) = cmd_rx.recv().await {
        match store
            .write(paths::MANUAL_OVERRIDE, json!(command.as_wire()))
            .await
        {
            Ok(()) => {
                shared.write().unwrap().command = command;
            }
            Err(e) => {
                warn!(error = %e, command = command.as_wire(), "Auto override write failed");
            }
        }
    }
}

struct EventLoop {
    shared: Arc<RwLock<Snapshot>>,
    cmd_tx: mpsc::Sender<PumpCommand>,
    alerts_tx: broadcast::Sender<Alert>,
    moisture_threshold: i64,
    water_level_threshold: i64,
}

impl EventLoop {
    async fn run<S: TelemetryStore>(
        self,
        store: Arc<S>,
        mut update_rx: broadcast::Receiver<StoreUpdate>,
    ) {
        // Values already present at subscribe time are delivered first,
        // through the same handling as live pushes.
        for path in WATCHED_PATHS {
            if let Some(value) = store.get(path) {
                self.handle(path, &value).await;
            }
        }

        loop {
            match update_rx.recv().await {
                Ok(update) => self.handle(&update.path, &update.value).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Controller lagged, skipped store pushes");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    warn!("Store update channel closed");
                    break;
                }
            }
        }
    }

    async fn handle(&self, path: &str, value: &Value) {
        match path {
            paths::SOIL_MOISTURE => {
                let moisture = rounded(value);
                let mode = {
                    let mut snapshot = self.shared.write().unwrap();
                    snapshot.reading.soil_moisture = moisture;
                    snapshot.mode
                };

                if let Some(command) = evaluate(mode, moisture, self.moisture_threshold) {
                    // Receiver closes only on shutdown
                    let _ = self.cmd_tx.send(command).await;
                }
            }
            paths::TEMPERATURE => {
                self.shared.write().unwrap().reading.temperature_c = rounded(value);
            }
            paths::HUMIDITY => {
                self.shared.write().unwrap().reading.humidity = rounded(value);
            }
            paths::WATER_LEVEL => {
                let level = rounded(value);
                self.shared.write().unwrap().reading.water_level = level;

                if let Some(level) = level {
                    if let Some(alert) = notify::low_water_alert(level, self.water_level_threshold)
                    {
                        let _ = self.alerts_tx.send(alert);
                    }
                }
            }
            paths::MANUAL_OVERRIDE => {
                // Echo of our own writes, or another client's command
                match value.as_str().and_then(PumpCommand::from_wire) {
                    Some(command) => self.shared.write().unwrap().command = command,
                    None => debug!(value = %value, "Malformed override push ignored"),
                }
            }
            paths::AUTO_MODE => match value.as_str().and_then(Mode::from_wire) {
                Some(mode) => {
                    let (changed, moisture) = {
                        let mut snapshot = self.shared.write().unwrap();
                        let changed = snapshot.mode != mode;
                        snapshot.mode = mode;
                        (changed, snapshot.reading.soil_moisture)
                    };

                    // Entering auto from another client re-applies the rule;
                    // the echo of our own set_mode is a no-op here.
                    if changed {
                        if let Some(command) = evaluate(mode, moisture, self.moisture_threshold) {
                            let _ = self.cmd_tx.send(command).await;
                        }
                    }
                }
                None => debug!(value = %value, "Malformed mode push ignored"),
            },
            paths::ONLINE => {
                self.shared.write().unwrap().online = value.as_bool().unwrap_or(false);
            }
            _ => {}
        }
    }
}
