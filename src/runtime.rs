//! Async driver for the engine
//!
//! `World` itself is single-writer plain data; this module provides the
//! shared handle and the tokio ticker that drives it. Every mutation runs
//! under the write lock, so tick phases and command handlers never
//! interleave.

use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, trace};

use crate::events::EventRecord;
use crate::world::{TickHooks, World};

/// Cloneable shared handle to a world.
#[derive(Clone)]
pub struct SharedWorld {
    inner: Arc<RwLock<World>>,
}

impl SharedWorld {
    pub fn new(world: World) -> Self {
        Self {
            inner: Arc::new(RwLock::new(world)),
        }
    }

    /// Run a closure against the world under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&World) -> R) -> R {
        f(&self.guard())
    }

    /// Run a closure against the world under the write lock.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        let mut world = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut world)
    }

    fn guard(&self) -> RwLockReadGuard<'_, World> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Spawn the periodic ticker.
///
/// The delta passed to `World::tick` is measured wall time since the
/// previous iteration, not the nominal period, so a stalled interval
/// catches the clock up instead of silently losing time. Events produced
/// during the tick are drained into `events` when a sender is supplied.
pub fn spawn_ticker(
    shared: SharedWorld,
    period: Duration,
    mut hooks: Box<dyn TickHooks + Send>,
    events: Option<UnboundedSender<EventRecord>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(period_ms = period.as_millis() as u64, "ticker started");
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick of a tokio interval completes immediately
        interval.tick().await;
        let mut previous = Instant::now();

        loop {
            interval.tick().await;
            let now = Instant::now();
            let dt_ms = now.duration_since(previous).as_millis() as u64;
            previous = now;
            trace!(dt_ms, "ticker fired");

            shared.mutate(|world| {
                world.tick(dt_ms, hooks.as_mut());
                if let Some(sender) = &events {
                    for record in world.events.drain() {
                        if sender.send(record).is_err() {
                            return; // receiver gone, stop forwarding
                        }
                    }
                }
            });
        }
    })
}
