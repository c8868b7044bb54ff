pub mod geofence;
pub mod admin_directory;

pub use geofence::{Geofence, GeofenceClearance, GeofenceVerdict, GeoPoint};
pub use admin_directory::AdminDirectory;
