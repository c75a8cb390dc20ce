pub mod key;
pub mod page;
pub mod slip;

pub use key::{KeyRecord, KeySummary};
pub use page::{PageAccess, PagePermissions, PageRecord};
pub use slip::SalarySlip;
