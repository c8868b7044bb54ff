pub mod state_manager;
pub mod transitions;
pub mod activity_logger;
pub mod view_projector;
pub mod checkin_wizard;

pub use state_manager::DriverQueueManager;
pub use transitions::{plan_transition, queue_number, QueueEvent, Transition, TransitionContext};
pub use activity_logger::ActivityLogger;
pub use view_projector::{counts, project, search, DashboardView};
pub use checkin_wizard::{CargoDetails, CheckInWizard, PersonalData, WizardStep};
