//! One-shot reminders for tasks with a due date-time.
//!
//! Each reminder is a single timer on a tokio runtime. When it fires, a
//! visible alert is raised only if the [`Notifier`] currently has permission;
//! the caller's callback runs either way. Nothing is persisted: dropping the
//! scheduler aborts every pending timer.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const REMINDER_BODY: &str = "Time for your task!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The environment cannot show alerts at all.
    Unsupported,
}

/// Surface for user-visible alerts.
pub trait Notifier: Send + Sync + 'static {
    /// Asks for permission to alert. Called once when a scheduler starts.
    fn request_permission(&self) -> Permission;
    /// Current permission, checked each time a timer fires.
    fn permission(&self) -> Permission;
    fn alert(&self, title: &str, body: &str);
}

/// Rings the terminal bell. Permission mirrors the `notifications` setting.
#[derive(Debug)]
pub struct TerminalBell {
    enabled: bool,
}

impl TerminalBell {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for TerminalBell {
    fn request_permission(&self) -> Permission {
        self.permission()
    }

    fn permission(&self) -> Permission {
        if self.enabled { Permission::Granted } else { Permission::Denied }
    }

    fn alert(&self, title: &str, body: &str) {
        info!(title, body, "reminder");
        let mut out = std::io::stdout();
        if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            debug!(error = %e, "failed to ring terminal bell");
        }
    }
}

/// What [`NotificationScheduler::schedule`] did with a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// The due time had already passed; the callback ran immediately.
    FiredNow,
    /// A timer was armed to fire after this delay.
    Armed(Duration),
}

pub struct NotificationScheduler {
    handle: Handle,
    notifier: Arc<dyn Notifier>,
    timers: Vec<JoinHandle<()>>,
}

impl NotificationScheduler {
    /// Creates a scheduler and requests alert permission once.
    pub fn new(handle: Handle, notifier: Arc<dyn Notifier>) -> Self {
        match notifier.request_permission() {
            Permission::Granted => debug!("notification permission granted"),
            Permission::Denied => info!("notification permission denied, reminders stay silent"),
            Permission::Unsupported => warn!("notifications unsupported, reminders stay silent"),
        }
        Self {
            handle,
            notifier,
            timers: Vec::new(),
        }
    }

    /// Schedules a reminder for `due_at`, measured against `now`.
    ///
    /// A due time at or before `now` runs `on_fire` right away, on the calling
    /// thread. Otherwise `on_fire` runs once when the timer elapses, after the
    /// alert (if permitted).
    pub fn schedule<F>(&mut self, title: impl Into<String>, due_at: NaiveDateTime, now: NaiveDateTime, on_fire: F) -> Scheduled
    where
        F: FnOnce() + Send + 'static,
    {
        let title = title.into();
        let delay = match (due_at - now).to_std() {
            Ok(d) if !d.is_zero() => d,
            _ => {
                debug!(title = %title, "reminder already due, firing now");
                on_fire();
                return Scheduled::FiredNow;
            }
        };

        self.timers.retain(|t| !t.is_finished());
        let notifier = Arc::clone(&self.notifier);
        let timer = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if notifier.permission() == Permission::Granted {
                notifier.alert(&title, REMINDER_BODY);
            } else {
                debug!(title = %title, "reminder fired without permission, alert suppressed");
            }
            on_fire();
        });
        self.timers.push(timer);
        debug!(delay_secs = delay.as_secs(), "reminder armed");
        Scheduled::Armed(delay)
    }

    /// Timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.timers.iter().filter(|t| !t.is_finished()).count()
    }

    /// Aborts every pending timer; their callbacks will never run.
    pub fn cancel_all(&mut self) {
        let pending = self.pending();
        for timer in self.timers.drain(..) {
            timer.abort();
        }
        if pending > 0 {
            debug!(pending, "cancelled pending reminders");
        }
    }
}

impl Drop for NotificationScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
