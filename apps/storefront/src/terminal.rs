//! Renders widget events as terminal lines.

use client_core::{Navigator, ProductSelection, WidgetEvent};
use shared::domain::Severity;
use tokio::sync::watch;

/// A terminal cannot change page, so navigation prints the target and asks the prompt to stop.
pub struct TerminalNavigator {
    redirected: watch::Sender<Option<String>>,
}

impl TerminalNavigator {
    pub fn new() -> (Self, watch::Receiver<Option<String>>) {
        let (redirected, rx) = watch::channel(None);
        (Self { redirected }, rx)
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, target: &str) {
        println!("-> sign in at {target}");
        let _ = self.redirected.send(Some(target.to_string()));
    }
}

pub fn render_event(event: &WidgetEvent) -> Option<String> {
    let line = match event {
        WidgetEvent::ToastShown { message, severity } => {
            let mark = match severity {
                Severity::Success => "✓",
                Severity::Error => "✕",
            };
            format!("[{mark}] {message}")
        }
        WidgetEvent::BadgeChanged { count, visible: true } => format!("cart ({count})"),
        WidgetEvent::BadgeChanged { visible: false, .. } => "cart (empty)".to_string(),
        WidgetEvent::TriggerChanged(trigger) if !trigger.enabled => trigger.label.to_string(),
        WidgetEvent::NavigationScheduled { delay, .. } => {
            format!("redirecting to sign in in {:.1}s", delay.as_secs_f32())
        }
        _ => return None,
    };
    Some(line)
}

pub fn render_selection(selection: &ProductSelection) -> String {
    let mut lines = vec![format!("{} {}", selection.display_name(), selection.price_label())];
    if !selection.description().is_empty() {
        lines.push(selection.description().to_string());
    }
    if !selection.image_ref().is_empty() {
        lines.push(format!("image: {} ({})", selection.image_ref(), selection.image_alt()));
    }
    lines.push(format!(
        "quantity: {}  cutlery: {}",
        selection.quantity(),
        if selection.needs_cutlery() { "yes" } else { "no" }
    ));
    lines.join("\n")
}
