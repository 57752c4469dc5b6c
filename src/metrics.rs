// Prometheus metrics definitions for the game backend.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Wild encounters currently held in session memory.
    pub static ref ACTIVE_ENCOUNTERS: IntGauge =
        IntGauge::new("pokebot_active_encounters", "Wild encounters in progress").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Commands processed, by command name.
    pub static ref COMMANDS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("pokebot_commands_total", "Total commands processed"),
        &["command"],
    )
    .unwrap();

    /// Commands that failed with a store error, by command name.
    pub static ref COMMAND_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("pokebot_command_failures_total", "Commands that hit a storage failure"),
        &["command"],
    )
    .unwrap();

    /// Explore attempts that found a wild creature.
    pub static ref ENCOUNTERS_STARTED_TOTAL: IntCounter = IntCounter::new(
        "pokebot_encounters_started_total",
        "Wild encounters started",
    )
    .unwrap();

    /// Battle turns, by outcome (continue, victory, defeat).
    pub static ref BATTLE_TURNS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("pokebot_battle_turns_total", "Battle turns resolved"),
        &["outcome"],
    )
    .unwrap();

    /// Catch attempts, by outcome (caught, escaped).
    pub static ref CATCH_ATTEMPTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("pokebot_catch_attempts_total", "Catch attempts"),
        &["outcome"],
    )
    .unwrap();

    /// Creatures that gained at least one level.
    pub static ref LEVEL_UPS_TOTAL: IntCounter = IntCounter::new(
        "pokebot_level_ups_total",
        "Levels gained by owned creatures",
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Command handling time in seconds, by command name.
    pub static ref COMMAND_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "pokebot_command_duration_seconds",
            "Command handling time in seconds",
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.5, 1.0]),
        &["command"],
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(ACTIVE_ENCOUNTERS.clone()),
            Box::new(COMMANDS_TOTAL.clone()),
            Box::new(COMMAND_FAILURES_TOTAL.clone()),
            Box::new(ENCOUNTERS_STARTED_TOTAL.clone()),
            Box::new(BATTLE_TURNS_TOTAL.clone()),
            Box::new(CATCH_ATTEMPTS_TOTAL.clone()),
            Box::new(LEVEL_UPS_TOTAL.clone()),
            Box::new(COMMAND_DURATION_SECONDS.clone()),
        ];

        for c in collectors {
            if let Err(e) = REGISTRY.register(c) {
                tracing::error!("failed to register metric: {e}");
            }
        }
    });
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
