pub mod encryption_service;
pub mod key_service;
pub mod permission_service;
pub mod slip_service;

pub use encryption_service::{EncryptionError, EncryptionService};
pub use key_service::{KeyError, KeyService, PinVerification};
pub use permission_service::{PermissionError, PermissionService};
pub use slip_service::{DecryptedSlip, SlipError, SlipService};
