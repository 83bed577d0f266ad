//! Async driver for the inactivity guard.
//!
//! [`GuardTask::spawn`] runs a [`SessionGuard`] on a tokio interval. Activity
//! events arrive over a channel. The task ends when the guard expires, when
//! it is stopped, or when the [`GuardTask`] handle is dropped. On expiry it
//! logs the session out before resolving.

use std::time::Duration;

use anyhow::{Context, Result};
use hdms_core::session::{ActivityEvent, CookieStore, SessionContext, SessionGuard};
use hdms_core::DeskConfig;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

const SIGNAL_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardSignal {
    Activity(ActivityEvent),
    Stop,
}

/// Why the guard task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardExit {
    /// Idle time reached the limit and the session was logged out.
    Expired {
        idle_for: Duration,
        redirect: &'static str,
    },
    /// Stopped by the owner, e.g. on navigation to a public route.
    Stopped,
}

/// Final state handed back by the task.
#[derive(Debug)]
pub struct GuardOutcome<C: CookieStore> {
    pub exit: GuardExit,
    pub session: SessionContext<C>,
}

/// Cloneable handle for feeding activity into a running guard.
#[derive(Debug, Clone)]
pub struct ActivitySender {
    signals: mpsc::Sender<GuardSignal>,
}

impl ActivitySender {
    /// Report activity. Returns false once the task has ended.
    pub fn record(&self, event: ActivityEvent) -> bool {
        match self.signals.try_send(GuardSignal::Activity(event)) {
            Ok(()) => true,
            // A full buffer already holds newer activity than this event.
            Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Ask the task to stop. Returns false if the task had already ended.
    pub async fn stop(&self) -> bool {
        self.signals.send(GuardSignal::Stop).await.is_ok()
    }
}

/// A running guard. Dropping the handle cancels the task.
pub struct GuardTask<C: CookieStore> {
    sender: ActivitySender,
    handle: JoinHandle<GuardOutcome<C>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl<C> GuardTask<C>
where
    C: CookieStore + Send + 'static,
{
    /// Start guarding `session` on `route` with the limits in `config`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(route: &str, config: &DeskConfig, session: SessionContext<C>) -> Self {
        let guard = SessionGuard::for_route(route, config.inactivity_limit(), Instant::now().into_std());
        let (signals, receiver) = mpsc::channel(SIGNAL_BUFFER);
        let (cancel, cancelled) = oneshot::channel();
        let interval = config.check_interval();
        debug!(
            route,
            limit_secs = config.inactivity_limit_seconds,
            interval_ms = config.check_interval_millis,
            "Starting session guard"
        );
        let handle = tokio::spawn(run(guard, session, receiver, cancelled, interval));
        Self {
            sender: ActivitySender { signals },
            handle,
            cancel: Some(cancel),
        }
    }

    #[must_use]
    pub fn sender(&self) -> ActivitySender {
        self.sender.clone()
    }

    pub fn record(&self, event: ActivityEvent) -> bool {
        self.sender.record(event)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the guard and return the session.
    ///
    /// If the guard already expired the outcome reports that instead of
    /// [`GuardExit::Stopped`].
    ///
    /// # Errors
    ///
    /// Returns an error if the task panicked.
    pub async fn stop(mut self) -> Result<GuardOutcome<C>> {
        let already_ended = self.cancel.take().is_some_and(|cancel| cancel.send(()).is_err());
        if already_ended {
            debug!("Session guard had already ended");
        }
        (&mut self.handle).await.context("Session guard task failed")
    }

    /// Wait for the task to end on its own (expiry or a stop from a sender).
    ///
    /// # Errors
    ///
    /// Returns an error if the task panicked.
    pub async fn join(mut self) -> Result<GuardOutcome<C>> {
        (&mut self.handle).await.context("Session guard task failed")
    }
}

impl<C: CookieStore> Drop for GuardTask<C> {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("Session guard handle dropped, cancelling");
        }
        self.handle.abort();
    }
}

async fn run<C: CookieStore>(
    mut guard: SessionGuard,
    mut session: SessionContext<C>,
    mut signals: mpsc::Receiver<GuardSignal>,
    mut cancelled: oneshot::Receiver<()>,
    interval: Duration,
) -> GuardOutcome<C> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = &mut cancelled => {
                debug!("Session guard stopped by owner");
                return GuardOutcome { exit: GuardExit::Stopped, session };
            }
            signal = signals.recv() => match signal {
                Some(GuardSignal::Activity(event)) => {
                    guard.record_activity(event, Instant::now().into_std());
                }
                Some(GuardSignal::Stop) | None => {
                    debug!("Session guard stopped");
                    return GuardOutcome { exit: GuardExit::Stopped, session };
                }
            },
            _ = ticker.tick() => {
                if let Some(expiry) = guard.check(Instant::now().into_std()) {
                    let logout = session.expire();
                    info!(
                        idle_secs = expiry.idle_for.as_secs(),
                        redirect = logout.redirect,
                        "Logged out after inactivity"
                    );
                    return GuardOutcome {
                        exit: GuardExit::Expired {
                            idle_for: expiry.idle_for,
                            redirect: logout.redirect,
                        },
                        session,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdms_core::model::Role;
    use hdms_core::session::{AUTH_TOKEN_COOKIE, AuthState, CookieJar, USER_ROLE_COOKIE};

    fn logged_in() -> SessionContext<CookieJar> {
        crate::logging::init_test_logging();
        let mut session = SessionContext::new(CookieJar::new());
        session.login(AuthState {
            user_id: "mod-1".to_string(),
            role: Role::Moderator,
            token: "tok".to_string(),
        });
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires_and_logs_out() {
        let task = GuardTask::spawn("/moderator/dashboard", &DeskConfig::default(), logged_in());
        let outcome = task.join().await.unwrap();

        match outcome.exit {
            GuardExit::Expired { idle_for, redirect } => {
                assert!(idle_for >= Duration::from_secs(180));
                assert!(idle_for < Duration::from_secs(182));
                assert_eq!(redirect, "/login");
            }
            GuardExit::Stopped => panic!("expected expiry"),
        }
        assert!(!outcome.session.is_authenticated());
        assert_eq!(outcome.session.cookies().get(AUTH_TOKEN_COOKIE), None);
        assert_eq!(outcome.session.cookies().get(USER_ROLE_COOKIE), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regular_activity_keeps_session_alive() {
        let task = GuardTask::spawn("/moderator/dashboard", &DeskConfig::default(), logged_in());
        for _ in 0..6 {
            tokio::time::sleep(Duration::from_secs(170)).await;
            assert!(task.record(ActivityEvent::KeyDown));
        }
        assert!(!task.is_finished());

        let outcome = task.stop().await.unwrap();
        assert_eq!(outcome.exit, GuardExit::Stopped);
        assert!(outcome.session.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_public_route_never_expires() {
        let task = GuardTask::spawn("/login", &DeskConfig::default(), logged_in());
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        assert!(!task.is_finished());
        assert_eq!(task.stop().await.unwrap().exit, GuardExit::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_from_sender_ends_join() {
        let task = GuardTask::spawn("/admin/users", &DeskConfig::default(), logged_in());
        let sender = task.sender();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            sender.stop().await;
        });
        let outcome = task.join().await.unwrap();
        assert_eq!(outcome.exit, GuardExit::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_task() {
        let task = GuardTask::spawn("/moderator/dashboard", &DeskConfig::default(), logged_in());
        let sender = task.sender();
        drop(task);

        // Let the aborted task wind down, well short of the limit.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!sender.record(ActivityEvent::Scroll));
        assert!(!sender.stop().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_after_expiry_reports_expiry() {
        let config = DeskConfig {
            inactivity_limit_seconds: 5,
            ..DeskConfig::default()
        };
        let task = GuardTask::spawn("/requestor/tickets", &config, logged_in());
        let sender = task.sender();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(task.is_finished());
        assert!(!sender.stop().await);

        let outcome = task.stop().await.unwrap();
        assert!(matches!(outcome.exit, GuardExit::Expired { .. }));
        assert!(!outcome.session.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sender_stop_reports_running_task() {
        let task = GuardTask::spawn("/admin/users", &DeskConfig::default(), logged_in());
        assert!(task.sender().stop().await);
        assert_eq!(task.join().await.unwrap().exit, GuardExit::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_limit() {
        let config = DeskConfig {
            inactivity_limit_seconds: 5,
            ..DeskConfig::default()
        };
        let task = GuardTask::spawn("/assignee/tasks", &config, logged_in());
        let outcome = task.join().await.unwrap();
        assert!(matches!(outcome.exit, GuardExit::Expired { .. }));
    }
}
