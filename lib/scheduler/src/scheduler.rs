//! The reminder scheduler facade.
//!
//! Producers register reminders here. The scheduler keeps them in a
//! [`ReminderRegistry`], arms one timer per distinct time of day through a
//! [`TimerArmer`], and hands each fired slot to a [`DeliveryDispatcher`].
//!
//! Firing is one-shot: a fired slot is removed whether or not anything was
//! delivered. Producers re-register to get tomorrow's reminder.

use crate::clock::Clock;
use crate::dispatch::{DeliveryDispatcher, GroupingConfig, GroupingPatch};
use crate::error::RegisterError;
use crate::registry::{ReminderRegistry, ReminderStats};
use crate::reminder::{Reminder, ReminderPatch};
use crate::time::TimeOfDay;
use crate::timer::{TimerArmer, TimerToken};
use chrono::NaiveDateTime;
use habitual_notify::{NotificationSink, PermissionStatus};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use tracing::{debug, info, warn};

#[derive(Default)]
struct State {
    registry: ReminderRegistry,
    timers: TimerArmer,
}

struct Inner {
    state: Mutex<State>,
    config: RwLock<GroupingConfig>,
    dispatcher: DeliveryDispatcher,
    clock: Arc<dyn Clock>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn config(&self) -> GroupingConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn fire(&self, time: TimeOfDay, token: TimerToken) {
        let (reminders, generation) = {
            let mut state = self.lock_state();
            if !state.timers.complete(time, token) {
                debug!(%time, "Ignoring stale reminder timer");
                return;
            }
            (state.registry.take_slot(time), self.dispatcher.generation())
        };

        let config = self.config();
        let report = self
            .dispatcher
            .dispatch_since(generation, time, reminders, &config);
        info!(
            %time,
            eligible = report.eligible,
            suppressed = report.suppressed,
            delivered = report.delivered,
            failed = report.failed,
            dropped = report.dropped,
            grouped = report.grouped,
            "Reminder slot fired"
        );
    }
}

/// Schedules time-of-day reminders and delivers them through a sink.
///
/// Cloning is cheap; clones share the same registry and timers.
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<Inner>,
}

impl ReminderScheduler {
    /// Creates a scheduler with the default grouping policy.
    #[must_use]
    pub fn new(sink: Arc<dyn NotificationSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                config: RwLock::new(GroupingConfig::default()),
                dispatcher: DeliveryDispatcher::new(sink),
                clock,
            }),
        }
    }

    /// Replaces the grouping policy.
    #[must_use]
    pub fn with_grouping(self, mut config: GroupingConfig) -> Self {
        config.min_count = config.min_count.max(1);
        *self
            .inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner) = config;
        self
    }

    /// Registers a reminder.
    ///
    /// Returns false if the id is empty or already registered anywhere;
    /// the existing registration is kept.
    pub fn register(&self, reminder: Reminder) -> bool {
        match self.try_register(reminder) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Reminder registration rejected");
                false
            }
        }
    }

    /// Registers a reminder, reporting why it was rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, already registered, or the
    /// slot's timer could not be armed. The registry is unchanged on error.
    pub fn try_register(&self, reminder: Reminder) -> Result<(), RegisterError> {
        let mut state = self.inner.lock_state();
        self.register_locked(&mut state, reminder)
    }

    fn register_locked(&self, state: &mut State, reminder: Reminder) -> Result<(), RegisterError> {
        let id = reminder.id.clone();
        let time = reminder.time;
        state.registry.insert(reminder)?;

        if !state.timers.is_armed(time) {
            let inner: Weak<Inner> = Arc::downgrade(&self.inner);
            let armed = state
                .timers
                .arm(time, self.inner.clock.as_ref(), move |token| {
                    if let Some(inner) = inner.upgrade() {
                        inner.fire(time, token);
                    }
                });
            if let Err(source) = armed {
                state.registry.remove(&id);
                return Err(RegisterError::Timer { id, source });
            }
        }

        debug!(reminder_id = %id, %time, "Registered reminder");
        Ok(())
    }

    /// Removes a reminder.
    ///
    /// If that empties its slot, the slot's timer is cancelled before this
    /// returns. Returns whether anything was removed.
    pub fn unregister(&self, id: &str) -> bool {
        let mut state = self.inner.lock_state();
        Self::unregister_locked(&mut state, id).is_some()
    }

    fn unregister_locked(state: &mut State, id: &str) -> Option<Reminder> {
        let removed = state.registry.remove(id)?;
        if removed.slot_emptied {
            state.timers.disarm(removed.reminder.time);
        }
        debug!(reminder_id = %id, "Unregistered reminder");
        Some(removed.reminder)
    }

    /// Removes every reminder whose id starts with `prefix`.
    ///
    /// Returns how many were removed.
    pub fn unregister_matching(&self, prefix: &str) -> usize {
        let mut state = self.inner.lock_state();
        let ids = state.registry.ids_with_prefix(prefix);
        ids.iter()
            .filter(|id| Self::unregister_locked(&mut state, id).is_some())
            .count()
    }

    /// Changes fields of a registered reminder.
    ///
    /// A changed time moves the reminder to another slot. Returns false if
    /// no reminder has this id, or if the updated reminder could not be
    /// registered, in which case the original is restored.
    pub fn update(&self, id: &str, patch: ReminderPatch) -> bool {
        let mut state = self.inner.lock_state();
        let Some(removed) = state.registry.remove(id) else {
            return false;
        };
        let original = removed.reminder;

        let mut updated = original.clone();
        patch.apply(&mut updated);

        // The old slot keeps its timer until the move has succeeded.
        match self.register_locked(&mut state, updated) {
            Ok(()) => {
                if state.registry.slot(original.time).is_none() {
                    state.timers.disarm(original.time);
                }
                true
            }
            Err(e) => {
                warn!(reminder_id = %id, error = %e, "Reminder update failed, restoring original");
                if let Err(e) = state.registry.insert(original) {
                    warn!(reminder_id = %id, error = %e, "Could not restore reminder");
                }
                false
            }
        }
    }

    /// Returns a copy of the reminder with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Reminder> {
        self.inner.lock_state().registry.get(id).cloned()
    }

    /// Returns every registered reminder by time of day.
    #[must_use]
    pub fn get_all(&self) -> BTreeMap<TimeOfDay, Vec<Reminder>> {
        self.inner.lock_state().registry.snapshot()
    }

    /// Returns when the timer for `time` will fire, if one is armed.
    #[must_use]
    pub fn next_fire_at(&self, time: TimeOfDay) -> Option<NaiveDateTime> {
        self.inner.lock_state().timers.fires_at(time)
    }

    /// Returns the number of armed timers.
    #[must_use]
    pub fn armed_timers(&self) -> usize {
        self.inner.lock_state().timers.len()
    }

    /// Updates the grouping policy. Takes effect from the next firing.
    pub fn configure(&self, patch: GroupingPatch) {
        let mut config = self
            .inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        patch.apply(&mut config);
        debug!(?config, "Updated reminder grouping");
    }

    /// Returns the grouping policy.
    #[must_use]
    pub fn config(&self) -> GroupingConfig {
        self.inner.config()
    }

    /// Returns aggregate counts over registered reminders.
    #[must_use]
    pub fn stats(&self) -> ReminderStats {
        self.inner.lock_state().registry.stats()
    }

    /// Returns the sink's permission status without prompting.
    #[must_use]
    pub fn permission_status(&self) -> PermissionStatus {
        self.inner.dispatcher.sink().permission_status()
    }

    /// Asks the sink for notification permission if not yet asked.
    pub async fn request_permission(&self) -> PermissionStatus {
        let sink = Arc::clone(self.inner.dispatcher.sink());
        sink.request_permission().await
    }

    /// Removes every reminder, cancels every timer and every delivered
    /// alert still held.
    pub fn clear(&self) {
        let (reminders, timers) = {
            let mut state = self.inner.lock_state();
            let reminders = state.registry.len();
            state.registry.clear();
            (reminders, state.timers.clear())
        };
        let alerts = self.inner.dispatcher.cancel_all();
        info!(reminders, timers, alerts, "Cleared reminder scheduler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::reminder::ReminderKind;
    use crate::testing::RecordingSink;
    use chrono::{NaiveDate, TimeDelta};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
    }

    fn t(value: &str) -> TimeOfDay {
        value.parse().unwrap()
    }

    fn scheduler() -> (ReminderScheduler, Arc<RecordingSink>) {
        let sink = RecordingSink::new();
        let clock = Arc::new(ManualClock::new(morning()));
        (ReminderScheduler::new(sink.clone(), clock), sink)
    }

    /// Sleeps (in paused time) for the span from test start to just past `time`.
    async fn run_until(time: &str) {
        let target = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_time(t(time).as_naive_time());
        let delay = (target - morning() + TimeDelta::seconds(1))
            .to_std()
            .unwrap();
        tokio::time::sleep(delay).await;
    }

    fn habit(id: &str, time: &str, title: &str) -> Reminder {
        Reminder::new(id, ReminderKind::Habit, t(time), title)
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_registration_is_rejected() {
        let (scheduler, _) = scheduler();

        assert!(scheduler.register(habit("habit-1-09:00", "09:00", "Read")));
        let before = scheduler.get_all();

        assert!(!scheduler.register(habit("habit-1-09:00", "10:00", "Other")));
        let err = scheduler
            .try_register(habit("habit-1-09:00", "09:00", "Read"))
            .unwrap_err();
        assert!(matches!(err, RegisterError::Duplicate { .. }));

        let after = scheduler.get_all();
        assert_eq!(after.len(), before.len());
        assert_eq!(after[&t("09:00")].len(), 1);
        assert_eq!(scheduler.armed_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn one_timer_per_time_of_day() {
        let (scheduler, _) = scheduler();

        scheduler.register(habit("a", "09:00", "A"));
        scheduler.register(habit("b", "09:00", "B"));
        scheduler.register(habit("c", "12:30", "C"));

        assert_eq!(scheduler.armed_timers(), 2);
        let fires_at = scheduler.next_fire_at(t("09:00")).unwrap();
        assert_eq!(fires_at.date(), morning().date());
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_a_two_reminders_grouped() {
        let (scheduler, sink) = scheduler();
        scheduler.register(habit("habit-1-09:00", "09:00", "Read").with_should_show(|| true));
        scheduler.register(habit("habit-2-09:00", "09:00", "Stretch").with_should_show(|| true));

        run_until("09:00").await;

        let shown = sink.shown();
        assert_eq!(shown.len(), 1);
        let body = shown[0].body.as_deref().unwrap();
        assert!(body.contains("Read"));
        assert!(body.contains("Stretch"));
        assert!(scheduler.get_all().is_empty());
        assert_eq!(scheduler.armed_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_b_suppressed_reminder_clears_slot() {
        let (scheduler, sink) = scheduler();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        scheduler.register(habit("habit-3-08:00", "08:00", "Run").with_should_show(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 0, "evaluated at registration");

        run_until("08:00").await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sink.shown().is_empty());
        assert!(!scheduler.get_all().contains_key(&t("08:00")));
        assert_eq!(scheduler.armed_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_c_unregister_cancels_timer() {
        let (scheduler, sink) = scheduler();
        scheduler.register(Reminder::new("x-1-10:00", ReminderKind::Other, t("10:00"), "X"));

        assert!(scheduler.unregister("x-1-10:00"));
        assert!(!scheduler.unregister("x-1-10:00"));
        assert_eq!(scheduler.armed_timers(), 0);

        run_until("10:00").await;

        assert!(sink.shown().is_empty());
        assert!(!scheduler.get_all().contains_key(&t("10:00")));
    }

    #[tokio::test(start_paused = true)]
    async fn scenario_d_update_moves_reminder() {
        let (scheduler, sink) = scheduler();
        scheduler.register(Reminder::new("x-1-10:00", ReminderKind::Other, t("10:00"), "X"));

        assert!(scheduler.update("x-1-10:00", ReminderPatch::default().with_time(t("11:00"))));
        assert!(scheduler.next_fire_at(t("10:00")).is_none());
        assert!(scheduler.next_fire_at(t("11:00")).is_some());

        run_until("10:00").await;
        assert!(sink.shown().is_empty());

        run_until("11:00").await;
        let shown = sink.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].tag, "x-1-10:00");
    }

    #[tokio::test(start_paused = true)]
    async fn update_unknown_id_fails() {
        let (scheduler, _) = scheduler();
        assert!(!scheduler.update("missing", ReminderPatch::default().with_title("T")));
    }

    #[tokio::test(start_paused = true)]
    async fn update_keeps_shared_slot_timer() {
        let (scheduler, _) = scheduler();
        scheduler.register(habit("a", "09:00", "A"));
        scheduler.register(habit("b", "09:00", "B"));
        let before = scheduler.next_fire_at(t("09:00"));

        assert!(scheduler.update("a", ReminderPatch::default().with_title("A2")));

        assert_eq!(scheduler.next_fire_at(t("09:00")), before);
        assert_eq!(scheduler.get("a").unwrap().title, "A2");
        let ids: Vec<_> = scheduler.get_all()[&t("09:00")]
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn slot_cleanup_after_mixed_operations() {
        let (scheduler, _) = scheduler();
        scheduler.register(habit("a", "09:00", "A"));
        scheduler.register(habit("b", "09:00", "B"));
        scheduler.unregister("a");
        assert!(scheduler.next_fire_at(t("09:00")).is_some());
        scheduler.update("b", ReminderPatch::default().with_time(t("09:30")));

        assert!(scheduler.next_fire_at(t("09:00")).is_none());
        assert!(!scheduler.get_all().contains_key(&t("09:00")));
        assert_eq!(scheduler.armed_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn single_eligible_reminder_delivered_alone() {
        let (scheduler, sink) = scheduler();
        scheduler.register(habit("a", "09:00", "A"));
        scheduler.register(habit("b", "09:00", "B").with_should_show(|| false));

        run_until("09:00").await;

        let shown = sink.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].tag, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn configure_applies_to_next_firing() {
        let (scheduler, sink) = scheduler();
        scheduler.register(habit("a", "09:00", "A"));
        scheduler.register(habit("b", "09:00", "B"));

        scheduler.configure(GroupingPatch {
            enabled: Some(false),
            ..GroupingPatch::default()
        });
        assert!(!scheduler.config().enabled);

        run_until("09:00").await;
        assert_eq!(sink.shown().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn past_time_fires_tomorrow() {
        let (scheduler, sink) = scheduler();
        scheduler.register(habit("early", "06:00", "Early"));

        let fires_at = scheduler.next_fire_at(t("06:00")).unwrap();
        assert_eq!(fires_at.date(), NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());

        run_until("23:59").await;
        assert!(sink.shown().is_empty());

        tokio::time::sleep(Duration::from_secs(6 * 3600 + 60)).await;
        assert_eq!(sink.shown().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn firing_is_one_shot() {
        let (scheduler, sink) = scheduler();
        scheduler.register(habit("a", "09:00", "A"));

        run_until("09:00").await;
        tokio::time::sleep(Duration::from_secs(2 * 24 * 3600)).await;

        assert_eq!(sink.shown().len(), 1);
        assert!(scheduler.register(habit("a", "09:00", "A")));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_timers_and_deliveries() {
        let (scheduler, sink) = scheduler();
        scheduler.configure(GroupingPatch {
            enabled: Some(false),
            ..GroupingPatch::default()
        });
        scheduler.register(habit("a", "08:00", "A"));
        scheduler.register(habit("b", "08:00", "B"));
        scheduler.register(habit("c", "20:00", "C"));

        run_until("08:00").await;
        assert_eq!(sink.shown().len(), 2);

        scheduler.clear();

        assert_eq!(sink.cancelled(), 2);
        assert!(scheduler.get_all().is_empty());
        assert_eq!(scheduler.armed_timers(), 0);
        run_until("20:00").await;
        assert_eq!(sink.shown().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_during_firing_leaves_no_delivery_behind() {
        let (scheduler, sink) = scheduler();
        scheduler.register(habit("a", "08:00", "A"));
        let clearing = scheduler.clone();
        sink.on_show(move || clearing.clear());

        run_until("08:00").await;

        assert_eq!(sink.shown().len(), 1);
        assert_eq!(sink.cancelled(), 1);
        assert_eq!(scheduler.inner.dispatcher.retained_handles(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stats_and_prefix_unregister() {
        let (scheduler, _) = scheduler();
        scheduler.register(habit("habit-1-09:00", "09:00", "A"));
        scheduler.register(habit("habit-1-21:00", "21:00", "A"));
        scheduler.register(Reminder::new("task-9-09:00", ReminderKind::Task, t("09:00"), "T"));

        let stats = scheduler.stats();
        assert_eq!(stats.total_reminders, 3);
        assert_eq!(stats.unique_time_slots, 2);
        assert_eq!(stats.max_in_one_slot, 2);

        assert_eq!(scheduler.unregister_matching("habit-1-"), 2);
        assert_eq!(scheduler.armed_timers(), 1);
        assert!(scheduler.get("task-9-09:00").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn instances_are_isolated() {
        let (first, _) = scheduler();
        let (second, _) = scheduler();

        first.register(habit("a", "09:00", "A"));

        assert!(second.get_all().is_empty());
        assert!(second.register(habit("a", "09:00", "A")));
    }

    #[test]
    fn registration_outside_runtime_is_rolled_back() {
        let (scheduler, _) = scheduler();

        let err = scheduler
            .try_register(habit("a", "09:00", "A"))
            .unwrap_err();

        assert!(matches!(err, RegisterError::Timer { .. }));
        assert!(scheduler.get_all().is_empty());
    }

    #[test]
    fn failed_update_restores_original() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let (scheduler, _) = scheduler();
        {
            let _entered = runtime.enter();
            assert!(scheduler.register(habit("a", "09:00", "Read")));
        }

        let moved = scheduler.update(
            "a",
            ReminderPatch::default()
                .with_time(t("10:00"))
                .with_title("Read more"),
        );

        assert!(!moved);
        let kept = scheduler.get("a").unwrap();
        assert_eq!(kept.time, t("09:00"));
        assert_eq!(kept.title, "Read");
        assert!(scheduler.next_fire_at(t("09:00")).is_some());
        assert!(scheduler.next_fire_at(t("10:00")).is_none());
        assert!(scheduler.get_all().get(&t("10:00")).is_none());
    }

    #[tokio::test]
    async fn permission_passes_through_to_sink() {
        let (scheduler, _) = scheduler();
        assert_eq!(scheduler.permission_status(), PermissionStatus::Granted);
        assert_eq!(scheduler.request_permission().await, PermissionStatus::Granted);
    }
}
