//! Shared wiring for one update run.

use sea_orm::DatabaseConnection;

use crate::gate::RateGate;
use crate::github::GithubClient;
use crate::notify::{Notifier, NullNotifier};
use crate::streak::{NullStreak, StreakProvider};

/// Hard cap on repositories processed per user per cycle. Users above it
/// are truncated with a warning; fan-out cost grows linearly with this.
pub const REPOSITORY_CAP: usize = 250;

/// Tunables for one update run.
#[derive(Clone, Copy, Debug)]
pub struct UpdateOptions {
    /// Maximum concurrent per-repository fetch tasks.
    pub concurrency: usize,
    /// Enqueue a deferred-work item when the rate budget blocks a cycle.
    pub defer_on_exhaustion: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            concurrency: 10,
            defer_on_exhaustion: true,
        }
    }
}

/// Everything an update cycle needs, injected so tests can substitute a
/// deterministic gate, a fixed streak provider, or a silent notifier.
#[derive(Clone, Copy)]
pub struct UpdateContext<'a> {
    pub db: &'a DatabaseConnection,
    pub client: &'a GithubClient,
    pub gate: &'a dyn RateGate,
    pub streak: &'a dyn StreakProvider,
    pub notifier: &'a dyn Notifier,
    pub options: UpdateOptions,
}

impl<'a> UpdateContext<'a> {
    /// Context with the default no-op streak provider and notifier.
    pub fn new(
        db: &'a DatabaseConnection,
        client: &'a GithubClient,
        gate: &'a dyn RateGate,
    ) -> Self {
        Self {
            db,
            client,
            gate,
            streak: &NullStreak,
            notifier: &NullNotifier,
            options: UpdateOptions::default(),
        }
    }

    pub fn with_streak(mut self, streak: &'a dyn StreakProvider) -> Self {
        self.streak = streak;
        self
    }

    pub fn with_notifier(mut self, notifier: &'a dyn Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_options(mut self, options: UpdateOptions) -> Self {
        self.options = options;
        self
    }

    /// Same wiring, with deferred-work enqueueing turned off. Used by the
    /// queue drainer, which must not re-enqueue the item it is draining.
    pub fn without_deferral(mut self) -> Self {
        self.options.defer_on_exhaustion = false;
        self
    }
}
