pub mod handle;
pub mod model;
pub mod rate_limit;
pub mod repository;
pub mod repository_pg;
pub mod route;
pub mod schema;
pub mod service;
