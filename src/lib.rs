pub mod configuration;
pub mod domain;
pub mod routes;
pub mod services;
pub mod startup;
pub mod testing;
