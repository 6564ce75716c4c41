// Library for tests to access modules

pub mod config;
pub mod models;
pub mod routes;
pub mod sysinfo_repo;
