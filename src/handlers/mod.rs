// Route handlers, all behind the JWT middleware under /api/*.

pub mod keys;
pub mod pages;
pub mod roles;
pub mod slips;
