use std::time::Duration;

use shared::domain::{ProductId, Severity};

pub mod config;
pub mod coordinator;
pub mod endpoint;
pub mod error;
pub mod feedback;
pub mod navigation;
pub mod quantity;
pub mod selection;

pub use config::{load_settings, WidgetSettings};
pub use coordinator::{ProductWidget, Submission, TriggerView};
pub use endpoint::{CartEndpoint, HttpCartEndpoint};
pub use error::{ConfigError, EndpointError, SubmitError};
pub use feedback::{BadgeView, Feedback, FeedbackChannel, ToastView};
pub use navigation::Navigator;
pub use selection::{CloseReason, ProductSelection, SelectionTicket};

/// Everything a front end needs to re-render the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    SelectionOpened {
        product_id: Option<ProductId>,
        display_name: String,
    },
    SelectionClosed(CloseReason),
    TriggerChanged(TriggerView),
    ToastShown {
        message: String,
        severity: Severity,
    },
    ToastHidden,
    BadgeChanged {
        count: u32,
        visible: bool,
    },
    NavigationScheduled {
        target: String,
        delay: Duration,
    },
}
