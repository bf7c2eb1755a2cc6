//! src/main.rs
//! Scripted walkthrough of handler slots: loads config, installs logging and
//! drives a small event table, reporting every misuse through the configured
//! tracing sink.

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use hookslot_core::{
    AppError, EventTable, Handler, LoggerBuilder, SharedSlot, TracingSink, config::Config,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PlayerEvent {
    Damaged,
    Healed,
    Died,
}

struct Player {
    name: &'static str,
    health: AtomicI64,
}

impl Player {
    fn on_damaged(&self, amount: &i64) {
        let left = self.health.fetch_sub(*amount, Ordering::Relaxed) - amount;
        info!(player = self.name, amount, left, "damaged");
    }

    fn on_healed(&self, amount: &i64) {
        let now = self.health.fetch_add(*amount, Ordering::Relaxed) + amount;
        info!(player = self.name, amount, now, "healed");
    }
}

fn init_logging(config: &Config) -> Result<WorkerGuard, AppError> {
    let guard = LoggerBuilder::new()
        .with_config(config.logging.clone())
        .with_console(true)
        .build()?;
    Ok(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::load().await.unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        Config::default()
    });

    let _guard = init_logging(&config).context("Failed to initialize logging")?;

    run(&config).context("Demo aborted")
}

fn run(config: &Config) -> Result<(), AppError> {
    info!(max_units = ?config.slot.max_units, "hookslot demo starting");

    let mut sink: TracingSink = config.sink.tracing_sink();
    let mut table: EventTable<PlayerEvent, i64> = EventTable::with_limits(config.slot.limits());

    let player = Arc::new(Player {
        name: "ada",
        health: AtomicI64::new(100),
    });
    let damaged = Handler::bound(&player, Player::on_damaged).with_label("ada.on_damaged");
    let healed = Handler::bound(&player, Player::on_healed).with_label("ada.on_healed");

    table.subscribe(&PlayerEvent::Damaged, damaged, Some(&mut sink));
    table.subscribe(&PlayerEvent::Healed, healed.clone(), Some(&mut sink));

    // Rebinding the same method is caught as a duplicate.
    table.subscribe(
        &PlayerEvent::Damaged,
        Handler::bound(&player, Player::on_damaged),
        Some(&mut sink),
    );
    table.subscribe(&PlayerEvent::Died, None::<Handler<i64>>, Some(&mut sink));

    table.emit(&PlayerEvent::Damaged, &30);
    table.emit(&PlayerEvent::Healed, &10);

    table.unsubscribe(
        &PlayerEvent::Healed,
        &healed,
        config.slot.remove_policy,
        Some(&mut sink),
    );
    table.clear(&PlayerEvent::Died, Some(&mut sink));
    table.clear(&PlayerEvent::Damaged, Some(&mut sink));

    let announcements: SharedSlot<str> = SharedSlot::with_limits(config.slot.limits());
    let shout: Handler<str> = Handler::new(|msg: &str| info!(msg, "announcement"));
    // The first announcer is required; failing to register it aborts the demo.
    announcements.try_add_if_absent(shout)?;
    announcements.invoke("round over");
    announcements.remove_all(Some(&mut sink));
    announcements.remove_all(Some(&mut sink));

    info!(
        health = player.health.load(Ordering::Relaxed),
        keys = table.len(),
        diagnostics = sink.reported(),
        "hookslot demo finished"
    );

    Ok(())
}
