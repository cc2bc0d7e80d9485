//! Desktop runner for pyrt-core tables.
//!
//! Replays the dict smoke sketch shipped with the transpiler runtime, then
//! runs a short mock `loop()` that records synthetic sensor readings into a
//! [`SharedTable`] and periodically persists a binary snapshot, the way a
//! sketch on the device would.
//!
//! # Environment
//!
//! | Variable            | Effect                                          |
//! |---------------------|-------------------------------------------------|
//! | `RUST_LOG`          | Log filter (`debug` shows table growth)         |
//! | `PYRT_SIM_SETTINGS` | JSON object of text settings to load at startup |

use std::time::Duration;

use log::{error, info, warn};

use pyrt_core::{SharedTable, Table, TableError};

// ---------------------------------------------------------------------------
// Runner constants
// ---------------------------------------------------------------------------

/// Number of mock `loop()` iterations to run.
const SIM_TICKS: u32 = 12;

/// Delay between mock `loop()` iterations.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Persist a snapshot every this many ticks.
const SNAPSHOT_EVERY_TICKS: u32 = 4;

/// Environment variable holding the settings JSON.
const SETTINGS_ENV: &str = "PYRT_SIM_SETTINGS";

/// Settings used when the environment provides none or provides bad JSON.
const DEFAULT_SETTINGS: &str = r#"{"device":"pyrt-sim","units":"metric"}"#;

// ---------------------------------------------------------------------------
// Mock data generation
// ---------------------------------------------------------------------------

/// Generates synthetic sensor readings that vary over time.
struct MockSensorGenerator {
    /// Monotonic seconds counter used as the fake "epoch".
    elapsed_secs: f64,
}

impl MockSensorGenerator {
    fn new() -> Self {
        Self { elapsed_secs: 0.0 }
    }

    /// Advance the internal clock and return one reading per sensor.
    fn next_readings(&mut self, dt_secs: f64) -> [(&'static str, f32); 3] {
        self.elapsed_secs += dt_secs;
        let t = self.elapsed_secs;

        // Temperature: 20–26 °C sinusoidal with slow drift
        let temperature = 23.0 + 3.0 * (t / 120.0).sin() + 0.5 * (t / 37.0).cos();

        // Humidity: 40–60 % with different period
        let humidity = 50.0 + 10.0 * (t / 180.0).sin() + 2.0 * (t / 23.0).cos();

        // CO₂: 400–800 ppm with a longer cycle
        let co2 = 600.0 + 200.0 * (t / 300.0).sin() + 30.0 * (t / 41.0).cos();

        [
            ("temperature", temperature as f32),
            ("humidity", humidity as f32),
            ("co2", co2 as f32),
        ]
    }
}

// ---------------------------------------------------------------------------
// Sketch helpers
// ---------------------------------------------------------------------------

/// The transpiler's dict smoke sketch, one table per scalar type.
fn run_dict_smoke_sketch() {
    info!("=== INT values ===");
    let mut d1: Table<i32> = Table::new();
    d1.set("a", 10);
    d1.set("b", -3);
    info!("{}", d1);
    info!("{} {}", d1.get_or_default("a"), d1.get_or_default("b"));

    info!("=== FLOAT values ===");
    let mut d2: Table<f32> = Table::new();
    d2.set("pi", 3.14);
    d2.set("g", 9.81);
    info!("{}", d2);
    info!("{} {}", d2.get_or_default("pi"), d2.get_or_default("g"));

    info!("=== BOOL values ===");
    let mut d3: Table<bool> = Table::new();
    d3.set("flag1", true);
    d3.set("flag2", false);
    info!("{}", d3);
    info!("{}", d3.items());

    info!("=== STRING values ===");
    let mut d4: Table<String> = Table::new();
    d4.set("name", String::from("Mojoscale"));
    d4.set("lang", String::from("C++"));
    info!("{}", d4);
    info!("{} {}", d4.get_or_default("name"), d4.get_or_default("lang"));

    info!("=== BASIC OPERATIONS ===");
    let mut d6: Table<i32> = Table::new();
    d6.set("x", 100);
    info!("before pop: {}", d6);
    match d6.pop("x") {
        Ok(value) => info!("popped: {}", value),
        Err(e) => error!("pop failed: {}", e),
    }
    info!("after pop: {}", d6);
    d6.set("y", 200);
    d6.clear();
    info!("after clear: {}", d6);

    // Reading a missing key falls back to the default with a logged KeyError
    let missing = d6.get_or_default("x");
    info!("missing key read as {}", missing);
}

/// Load text settings from the environment, falling back to the defaults.
fn load_settings() -> Table<String> {
    let text = std::env::var(SETTINGS_ENV).unwrap_or_else(|_| DEFAULT_SETTINGS.to_string());

    match Table::parse_json(&text) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid {}: {}; using defaults", SETTINGS_ENV, e);
            Table::parse_json(DEFAULT_SETTINGS).unwrap_or_default()
        }
    }
}

/// Encode the current readings as a snapshot and verify it restores.
///
/// Returns the snapshot size in bytes.
fn persist_snapshot(readings: &SharedTable<f32>) -> Result<usize, TableError> {
    let snapshot = readings.snapshot()?;
    let bytes = snapshot.to_bytes()?;

    let restored = Table::<f32>::from_bytes(&bytes)?;
    if restored != snapshot {
        warn!("Snapshot restored with different contents: {}", restored);
    }

    Ok(bytes.len())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting pyrt simulator");

    run_dict_smoke_sketch();

    let settings = load_settings();
    info!(
        "Settings: {} (device {:?})",
        settings,
        settings.get("device").map(String::as_str).unwrap_or("unknown")
    );

    let readings: SharedTable<f32> = SharedTable::new(Table::new());
    let mut sample_counts: Table<i32> = Table::new();
    let mut sensor_gen = MockSensorGenerator::new();

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    for tick in 1..=SIM_TICKS {
        let batch = sensor_gen.next_readings(TICK_INTERVAL.as_secs_f64());

        let rendered = readings.with(|table| {
            for (name, value) in batch {
                table.set(name, value);
            }
            table.to_string()
        });
        match rendered {
            Ok(rendered) => info!("tick {}: {}", tick, rendered),
            Err(e) => error!("tick {}: readings unavailable: {}", tick, e),
        }

        for (name, _) in batch {
            *sample_counts.get_or_insert_default(name) += 1;
        }

        if tick % SNAPSHOT_EVERY_TICKS == 0 {
            match persist_snapshot(&readings) {
                Ok(len) => info!("Snapshot persisted ({} bytes)", len),
                Err(e) => error!("Snapshot failed: {}", e),
            }
        }

        std::thread::sleep(TICK_INTERVAL);
    }

    match readings.with(|table| table.to_json()) {
        Ok(Ok(json)) => info!("Final readings: {}", json),
        Ok(Err(e)) | Err(e) => error!("Could not encode readings: {}", e),
    }
    info!("Sample counts: {}", sample_counts);

    info!("Simulator exiting");
}
