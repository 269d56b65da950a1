//! Integration tests over the in-memory store and mock gateways, plus the
//! PostgreSQL repositories when `DATABASE_URL` is set.

mod helpers;

mod expiry_test;
mod postgres_test;
mod reservation_test;
mod rpc_test;
