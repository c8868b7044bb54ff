pub mod alert_manager;
pub mod notifier;

pub use alert_manager::{format_alert_message, AlertManager, QueueAlert};
pub use notifier::{DeliveryReport, LogNotifier, Notifier, RecordingNotifier, WhatsAppNotifier};
