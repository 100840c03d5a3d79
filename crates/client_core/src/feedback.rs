//! Toast and cart badge.

use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex, MutexGuard, OnceLock, PoisonError,
    },
    time::Duration,
};

use shared::domain::Severity;
use tokio::{runtime::Handle, sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};

use crate::WidgetEvent;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(2500);

/// Output side of the workflow. Implementations render however they like.
pub trait Feedback: Send + Sync {
    fn show_toast(&self, message: &str, severity: Severity);
    /// `count` must come from a server acknowledgement.
    fn set_badge(&self, count: u32);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub severity: Severity,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeView {
    pub count: u32,
    pub visible: bool,
}

impl BadgeView {
    pub fn text(&self) -> String {
        self.count.to_string()
    }
}

struct ToastInner {
    view: ToastView,
    shown_total: u64,
    hide_task: Option<JoinHandle<()>>,
}

/// Single notification surface. The most recent `show` wins and owns the hide timer.
pub struct Toast {
    inner: Arc<Mutex<ToastInner>>,
    duration: Duration,
    events: broadcast::Sender<WidgetEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Toast {
    fn new(duration: Duration, events: broadcast::Sender<WidgetEvent>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ToastInner {
                view: ToastView {
                    message: String::new(),
                    severity: Severity::Success,
                    visible: false,
                },
                shown_total: 0,
                hide_task: None,
            })),
            duration,
            events,
        }
    }

    pub fn show(&self, message: &str, severity: Severity) {
        let mut guard = lock(&self.inner);
        if let Some(previous) = guard.hide_task.take() {
            previous.abort();
        }
        guard.view = ToastView {
            message: message.to_string(),
            severity,
            visible: true,
        };
        guard.shown_total += 1;
        let generation = guard.shown_total;

        guard.hide_task = match Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                let events = self.events.clone();
                let duration = self.duration;
                Some(handle.spawn(async move {
                    tokio::time::sleep(duration).await;
                    let mut guard = lock(&inner);
                    if guard.shown_total == generation && guard.view.visible {
                        guard.view.visible = false;
                        guard.hide_task = None;
                        drop(guard);
                        let _ = events.send(WidgetEvent::ToastHidden);
                    }
                }))
            }
            Err(_) => {
                warn!("toast: no async runtime; notification stays until replaced");
                None
            }
        };
        drop(guard);

        debug!(?severity, text = message, "toast shown");
        let _ = self.events.send(WidgetEvent::ToastShown {
            message: message.to_string(),
            severity,
        });
    }

    pub fn view(&self) -> ToastView {
        lock(&self.inner).view.clone()
    }
}

pub struct Badge {
    count: AtomicU32,
    events: broadcast::Sender<WidgetEvent>,
}

impl Badge {
    fn new(events: broadcast::Sender<WidgetEvent>) -> Self {
        Self {
            count: AtomicU32::new(0),
            events,
        }
    }

    pub fn set_count(&self, count: u32) {
        self.count.store(count, Ordering::SeqCst);
        let view = self.view();
        let _ = self.events.send(WidgetEvent::BadgeChanged {
            count: view.count,
            visible: view.visible,
        });
    }

    pub fn view(&self) -> BadgeView {
        let count = self.count.load(Ordering::SeqCst);
        BadgeView {
            count,
            visible: count > 0,
        }
    }
}

/// Default `Feedback`: one lazily created toast plus the badge, both publishing `WidgetEvent`s.
pub struct FeedbackChannel {
    toast: OnceLock<Toast>,
    toast_duration: Duration,
    badge: Badge,
    events: broadcast::Sender<WidgetEvent>,
}

impl FeedbackChannel {
    pub fn new(toast_duration: Duration, events: broadcast::Sender<WidgetEvent>) -> Self {
        Self {
            toast: OnceLock::new(),
            toast_duration,
            badge: Badge::new(events.clone()),
            events,
        }
    }

    fn toast(&self) -> &Toast {
        self.toast
            .get_or_init(|| Toast::new(self.toast_duration, self.events.clone()))
    }

    /// `None` until the first notification has been shown.
    pub fn toast_view(&self) -> Option<ToastView> {
        self.toast.get().map(Toast::view)
    }

    pub fn badge_view(&self) -> BadgeView {
        self.badge.view()
    }
}

impl Feedback for FeedbackChannel {
    fn show_toast(&self, message: &str, severity: Severity) {
        self.toast().show(message, severity);
    }

    fn set_badge(&self, count: u32) {
        self.badge.set_count(count);
    }
}
