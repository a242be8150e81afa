pub mod client;
pub mod mock;
pub mod oid;
pub mod transport;
pub mod value;

pub use client::{SnmpClient, SnmpConnector, SnmpVersion};
pub use oid::{indexed, parse_oid};
pub use transport::{Connector, FetchError, Transport, Varbind};
