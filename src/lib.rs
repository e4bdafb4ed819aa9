//! Router/interface AS-ownership inference from traceroute-derived graphs.
//! See `DESIGN.md` for the module-by-module grounding ledger.

pub mod annotate;
pub mod config;
pub mod external;
pub mod graph;
pub mod runner;
pub mod shared;
pub mod updates;

pub use config::Config;
pub use graph::{Graph, Succ, VType, VrfEdge};
pub use runner::{AnnotationRow, InferenceRunner, IxpRow};
pub use shared::{ASN, InterfaceId, OrgId, RouterId, utype};
pub use updates::{Update, UpdatesStore};
