pub mod dock_queue;

pub use dock_queue::{DashboardSnapshot, DockQueueController};
