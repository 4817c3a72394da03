//! Library for reading the variables of ETA heating systems through the
//! "ETAtouch REST" API that the controller serves on port 8080.
//!
//! The REST interface has to be enabled on the ETAtouch display first.
//!
//! ## Example
//!
//! ### Read a variable
//!
//! ```ignore
//! // Connect, this checks that the api version is supported
//! let client = etaapi::EtaClient::connect("heizung.local")?;
//!
//! // The menu tree, one entry per tab of the display
//! let mut nodes = client.get_nodes()?;
//!
//! // Fetch all counters of the boiler
//! let mut counters = nodes["Kessel"].find_mut("Zählerstände").unwrap();
//! counters.update(&client)?;
//! for var in counters.variables() {
//!     println!("{}: {:?} {}", var.name(), var.normalized_value(), var.unit());
//! }
//! ```

pub(crate) mod api;
pub(crate) mod client;
pub mod error;
pub(crate) mod eta_xml;
pub mod nodes;

pub use api::{HttpTransport, Response, Transport, SUPPORTED_API_VERSIONS};
pub use client::{EtaClient, EtaClientBuilder};
pub use error::{EtaError, Result};
pub use nodes::{EtaNode, NodeMut, Reading, Variable, VariableList, VariableType};
