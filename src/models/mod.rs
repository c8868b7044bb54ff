pub mod istatus;
pub mod idriver;
pub mod igate;
pub mod iactivity;
pub mod idirectory;
pub mod plate;
pub mod po_number;

pub use istatus::*;
pub use idriver::*;
pub use igate::*;
pub use iactivity::*;
pub use idirectory::*;
pub use plate::LicensePlate;
pub use po_number::{format_po_number, DocumentNumberInput, PoEntity};

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Warehouse wall clock (WIB, UTC+7) used in operator-facing messages
pub fn wib(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(7 * 3600).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset)
}
