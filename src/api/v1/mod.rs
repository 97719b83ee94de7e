//! Catalog and account endpoints under `/api`.

pub mod login;
pub mod routes;
pub mod users;
pub mod videos;
