// ── ACL domain types ──
//
// Rule storage order is evaluation order; the matcher in `eval::acl`
// walks the list first-match-wins and never reorders it.

use serde::{Deserialize, Serialize};

use crate::eval::ip::{Cidr, PortMatch, Protocol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    Permit,
    Deny,
}

/// Traffic direction a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// One ordered permit/deny rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    /// Owning ACL group number (e.g. 3001).
    pub acl_id: u32,
    /// Rule sequence number within the group.
    pub rule_id: u32,
    pub action: AclAction,
    /// `None` applies to both directions.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Interface scope; `None` applies on every interface.
    #[serde(default)]
    pub interface: Option<String>,
    pub protocol: Protocol,
    pub src: Cidr,
    pub dst: Cidr,
    #[serde(default)]
    pub src_port: PortMatch,
    #[serde(default)]
    pub dst_port: PortMatch,
    /// Monotonic match counter; never auto-reset.
    #[serde(default)]
    pub hits: u64,
}

impl AclRule {
    pub fn new(acl_id: u32, rule_id: u32, action: AclAction, protocol: Protocol) -> Self {
        Self {
            acl_id,
            rule_id,
            action,
            direction: None,
            interface: None,
            protocol,
            src: Cidr::ANY,
            dst: Cidr::ANY,
            src_port: PortMatch::Any,
            dst_port: PortMatch::Any,
            hits: 0,
        }
    }

    pub fn with_src(mut self, src: Cidr) -> Self {
        self.src = src;
        self
    }

    pub fn with_dst(mut self, dst: Cidr) -> Self {
        self.dst = dst;
        self
    }

    pub fn with_dst_port(mut self, m: PortMatch) -> Self {
        self.dst_port = m;
        self
    }
}
