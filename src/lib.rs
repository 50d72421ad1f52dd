pub mod alert;
pub mod clock;
pub mod discord;
pub mod error;
pub mod notifier;

pub use alert::{Alert, AlertSummary};
pub use clock::{Clock, FixedClock, SystemClock};
pub use discord::{DeliveryConfig, HttpTransport, WebhookPayload, WebhookTransport};
pub use error::{ErrorKind, NotifyError, TransportError, exit_code};
pub use notifier::{prepare, read_input, run};
