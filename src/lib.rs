pub mod backend;
pub mod clock;
pub mod mailer;
pub mod models;
pub mod roster;
pub mod routes;
pub mod schedule;
pub mod status;
pub mod validate;
