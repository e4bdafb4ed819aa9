//! External data services (§6): everything the annotator needs that isn't
//! derived from the traceroute graph itself — prefix-to-ASN mapping, AS
//! relationships, organization membership, and IXP participant sets. Each is
//! a small trait so tests can swap in an in-memory double instead of a
//! CAIDA/PeeringDB-shaped file.

pub mod as2org;
pub mod bgp;
pub mod ixp_asns;
pub mod prefix_map;
pub mod source;

pub use as2org::{As2Org, As2OrgTable};
pub use bgp::{Bgp, CaidaBgpTable, TestBgp};
pub use ixp_asns::{IxpAsns, IxpParticipantTable};
pub use prefix_map::{PrefixMap, PrefixTrie, TestPrefixMap};
