//! Product widget: owns the selection state machine and the add-to-cart transaction.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use shared::{
    domain::{CartItemId, CatalogEntry, Severity},
    protocol::{CartAck, CartReply},
};
use tokio::{runtime::Handle, sync::broadcast};
use tracing::{debug, error, info, warn};

use crate::{
    config::WidgetSettings,
    endpoint::CartEndpoint,
    error::{ConfigError, SubmitError},
    feedback::Feedback,
    navigation::{Navigator, DEFAULT_LOGIN_PATH, DEFAULT_LOGIN_REDIRECT_DELAY},
    selection::{CloseReason, ProductSelection, SelectionState, SelectionTicket},
    WidgetEvent,
};

pub const TRIGGER_IDLE_LABEL: &str = "Add to cart";
pub const TRIGGER_BUSY_LABEL: &str = "Adding...";
const ADDED_MESSAGE: &str = "Added to cart";
const REMOVED_MESSAGE: &str = "Removed from cart";
const CLEARED_MESSAGE: &str = "Cart emptied";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerView {
    pub enabled: bool,
    pub label: &'static str,
}

impl TriggerView {
    fn for_busy(busy: bool) -> Self {
        if busy {
            Self {
                enabled: false,
                label: TRIGGER_BUSY_LABEL,
            }
        } else {
            Self {
                enabled: true,
                label: TRIGGER_IDLE_LABEL,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Committed {
        cart_total_items: u32,
        cart_total: Option<String>,
    },
    /// The trigger was disabled; the activation was dropped without a request.
    Dropped,
}

#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub login_target: String,
    pub login_redirect_delay: Duration,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            login_target: DEFAULT_LOGIN_PATH.to_string(),
            login_redirect_delay: DEFAULT_LOGIN_REDIRECT_DELAY,
        }
    }
}

impl WidgetOptions {
    pub fn from_settings(settings: &WidgetSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            login_target: settings.login_target()?,
            login_redirect_delay: settings.login_redirect_delay(),
        })
    }
}

pub struct ProductWidget {
    selection: Mutex<SelectionState>,
    in_flight: AtomicBool,
    navigation_pending: Arc<AtomicBool>,
    endpoint: Arc<dyn CartEndpoint>,
    feedback: Arc<dyn Feedback>,
    navigator: Arc<dyn Navigator>,
    options: WidgetOptions,
    events: broadcast::Sender<WidgetEvent>,
}

/// Holds the trigger disabled; dropping it re-enables the trigger on every exit path.
struct InFlightGuard<'a> {
    widget: &'a ProductWidget,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(widget: &'a ProductWidget) -> Option<Self> {
        widget
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        widget.emit(WidgetEvent::TriggerChanged(TriggerView::for_busy(true)));
        Some(Self { widget })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.widget.in_flight.store(false, Ordering::Release);
        self.widget
            .emit(WidgetEvent::TriggerChanged(TriggerView::for_busy(false)));
    }
}

impl ProductWidget {
    pub fn new(
        endpoint: Arc<dyn CartEndpoint>,
        feedback: Arc<dyn Feedback>,
        navigator: Arc<dyn Navigator>,
        options: WidgetOptions,
        events: broadcast::Sender<WidgetEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            selection: Mutex::new(SelectionState::default()),
            in_flight: AtomicBool::new(false),
            navigation_pending: Arc::new(AtomicBool::new(false)),
            endpoint,
            feedback,
            navigator,
            options,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WidgetEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: WidgetEvent) {
        let _ = self.events.send(event);
    }

    fn state(&self) -> MutexGuard<'_, SelectionState> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self, entry: &CatalogEntry) -> SelectionTicket {
        let (ticket, opened) = {
            let mut state = self.state();
            let ticket = state.open(entry);
            (ticket, state.current().cloned())
        };
        if let Some(selection) = opened {
            debug!(product_id = ?selection.product_id(), "selection opened");
            self.emit(WidgetEvent::SelectionOpened {
                product_id: selection.product_id().cloned(),
                display_name: selection.display_name().to_string(),
            });
        }
        ticket
    }

    /// Idempotent; returns whether the modal was open.
    pub fn close(&self, reason: CloseReason) -> bool {
        let closed = self.state().close();
        if closed {
            self.closed(reason);
        }
        closed
    }

    fn closed(&self, reason: CloseReason) {
        debug!(%reason, "selection closed");
        self.emit(WidgetEvent::SelectionClosed(reason));
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    pub fn selection(&self) -> Option<ProductSelection> {
        self.state().current().cloned()
    }

    /// Applies `edit` to the open selection; `None` while closed.
    fn edit<T>(&self, edit: impl FnOnce(&mut ProductSelection) -> T) -> Option<T> {
        self.state().current_mut().map(edit)
    }

    pub fn increment_quantity(&self) -> Option<u32> {
        self.edit(ProductSelection::increment_quantity)
    }

    pub fn decrement_quantity(&self) -> Option<u32> {
        self.edit(ProductSelection::decrement_quantity)
    }

    pub fn set_quantity_raw(&self, raw: &str) -> Option<String> {
        self.edit(|selection| selection.set_quantity_raw(raw))
    }

    pub fn set_needs_cutlery(&self, needs_cutlery: bool) -> Option<()> {
        self.edit(|selection| selection.set_needs_cutlery(needs_cutlery))
    }

    pub fn toggle_cutlery(&self) -> Option<bool> {
        self.edit(ProductSelection::toggle_cutlery)
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn trigger(&self) -> TriggerView {
        TriggerView::for_busy(self.is_submitting())
    }

    pub fn navigation_pending(&self) -> bool {
        self.navigation_pending.load(Ordering::Acquire)
    }

    /// Commits the open selection to the cart.
    ///
    /// At most one request is in flight per widget; activations while one is pending return
    /// `Submission::Dropped`. Every failure is also surfaced as an error toast.
    pub async fn submit(&self) -> Result<Submission, SubmitError> {
        if self.is_submitting() {
            debug!("submit: request already in flight; activation dropped");
            return Ok(Submission::Dropped);
        }

        let snapshot = self.state().snapshot();
        let Some((ticket, request)) =
            snapshot.and_then(|(ticket, selection)| Some((ticket, selection.to_request()?)))
        else {
            warn!("submit: no product identifier on the open selection");
            return Err(self.report(SubmitError::MissingTarget));
        };

        let Some(_guard) = InFlightGuard::acquire(self) else {
            return Ok(Submission::Dropped);
        };

        info!(
            product_id = %request.product_id,
            quantity = request.quantity,
            needs_cutlery = request.needs_cutlery,
            "submit: adding selection to cart"
        );

        let committed = self
            .endpoint
            .add_item(&request)
            .await
            .map_err(SubmitError::from)
            .and_then(require_acceptance)
            .and_then(|ack| Ok((ack.require_total_items()?, ack.cart_total)));

        let (cart_total_items, cart_total) = committed.map_err(|err| self.report(err))?;
        info!(
            product_id = %request.product_id,
            cart_total_items,
            cart_total = cart_total.as_deref().unwrap_or(""),
            "submit: cart updated"
        );
        self.feedback.set_badge(cart_total_items);
        self.feedback.show_toast(ADDED_MESSAGE, Severity::Success);
        if self.state().close_ticket(ticket) {
            self.closed(CloseReason::Submitted);
        }

        Ok(Submission::Committed {
            cart_total_items,
            cart_total,
        })
    }

    /// Removes one cart line. The badge is left alone: the endpoint returns no item count.
    pub async fn remove_item(&self, item_id: CartItemId) -> Result<Option<String>, SubmitError> {
        info!(item_id = item_id.0, "cart: removing item");
        let ack = self
            .endpoint
            .remove_item(item_id)
            .await
            .map_err(SubmitError::from)
            .and_then(require_acceptance)
            .map_err(|err| self.report(err))?;
        self.feedback.show_toast(REMOVED_MESSAGE, Severity::Success);
        Ok(ack.cart_total)
    }

    /// Empties the cart; a confirmed clear is an authoritative zero for the badge.
    pub async fn clear_cart(&self) -> Result<(), SubmitError> {
        info!("cart: clearing");
        self.endpoint
            .clear()
            .await
            .map_err(SubmitError::from)
            .and_then(require_acceptance)
            .map_err(|err| self.report(err))?;
        self.feedback.set_badge(0);
        self.feedback.show_toast(CLEARED_MESSAGE, Severity::Success);
        Ok(())
    }

    fn report(&self, err: SubmitError) -> SubmitError {
        match &err {
            SubmitError::Transport(detail) => error!(%detail, "cart: request failed"),
            SubmitError::Rejected { reason } => {
                warn!(reason = reason.as_deref().unwrap_or(""), "cart: request rejected")
            }
            other => warn!(error = %other, "cart: request not completed"),
        }
        self.feedback.show_toast(&err.user_message(), Severity::Error);
        if err == SubmitError::Unauthenticated {
            self.schedule_login_redirect();
        }
        err
    }

    fn schedule_login_redirect(&self) {
        if self.navigation_pending.swap(true, Ordering::AcqRel) {
            debug!("login redirect already pending");
            return;
        }

        let target = self.options.login_target.clone();
        let delay = self.options.login_redirect_delay;
        info!(%target, delay_ms = delay.as_millis() as u64, "scheduling login redirect");
        self.emit(WidgetEvent::NavigationScheduled {
            target: target.clone(),
            delay,
        });

        let navigator = Arc::clone(&self.navigator);
        let pending = Arc::clone(&self.navigation_pending);
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    navigator.navigate(&target);
                    pending.store(false, Ordering::Release);
                });
            }
            Err(_) => {
                warn!("no async runtime for delayed redirect; navigating now");
                navigator.navigate(&target);
                pending.store(false, Ordering::Release);
            }
        }
    }
}

fn require_acceptance(reply: CartReply) -> Result<CartAck, SubmitError> {
    match reply {
        CartReply::Accepted(ack) => Ok(ack),
        CartReply::Unauthenticated => Err(SubmitError::Unauthenticated),
        CartReply::Rejected { reason } => Err(SubmitError::Rejected { reason }),
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
