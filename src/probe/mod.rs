//! Database connectivity probing.
//!
//! A probe is a single end-to-end check that the database backend is
//! reachable: open a connection with the configured parameters, close it
//! immediately, report the outcome. Failed attempts are retried with a
//! fixed delay up to a fixed bound.

mod connector;
mod prober;

pub use connector::{ConnectError, ConnectionParameters, Connector, PgConnector};
pub use prober::{ProbeOutcome, Prober, RetryPolicy};
