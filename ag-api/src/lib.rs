//! HTTP surface for the aggregation gateway: the client-facing aggregation
//! routes, the admin CRUD adapter, and the liveness check. Split out as a
//! library target so integration tests can build the router directly
//! against an in-memory store, the same way the binary does at startup.

pub mod routes;
pub mod state;
