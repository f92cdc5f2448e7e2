// ── Cables and the read-only topology snapshot ──

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::device::{DeviceId, NetworkDevice};
use super::port::NetworkPort;

/// One end of a cable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub device: DeviceId,
    pub port: String,
}

impl Endpoint {
    pub fn new(device: impl Into<DeviceId>, port: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            port: port.into(),
        }
    }
}

/// An undirected link between two device ports. Read-only to the
/// engine; the topology editor owns creation and removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cable {
    pub a: Endpoint,
    pub b: Endpoint,
}

impl Cable {
    pub fn new(a: Endpoint, b: Endpoint) -> Self {
        Self { a, b }
    }

    /// The far endpoint when `device` sits on one end.
    pub fn other_end(&self, device: &DeviceId) -> Option<&Endpoint> {
        if &self.a.device == device {
            Some(&self.b)
        } else if &self.b.device == device {
            Some(&self.a)
        } else {
            None
        }
    }

    /// The near endpoint for `device`.
    pub fn end_of(&self, device: &DeviceId) -> Option<&Endpoint> {
        if &self.a.device == device {
            Some(&self.a)
        } else if &self.b.device == device {
            Some(&self.b)
        } else {
            None
        }
    }
}

/// Read-only device + cable snapshot handed to the executor for
/// cross-device reads (path finding, ACL/NAT path evaluation, VRRP
/// election). Never mutated by commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    pub devices: Vec<NetworkDevice>,
    pub cables: Vec<Cable>,
}

impl Topology {
    pub fn device(&self, id: &DeviceId) -> Option<&NetworkDevice> {
        self.devices.iter().find(|d| &d.id == id)
    }

    pub fn device_by_hostname(&self, hostname: &str) -> Option<&NetworkDevice> {
        self.devices
            .iter()
            .find(|d| d.hostname.eq_ignore_ascii_case(hostname))
    }

    /// The device owning a port configured with `ip`.
    pub fn device_by_ip(&self, ip: Ipv4Addr) -> Option<&NetworkDevice> {
        self.devices
            .iter()
            .find(|d| d.ports.iter().any(|p| p.config.ip == Some(ip)))
    }

    pub fn port_of(&self, endpoint: &Endpoint) -> Option<&NetworkPort> {
        self.device(&endpoint.device)?.port(&endpoint.port)
    }

    /// Cables with one end on `device`.
    pub fn cables_of<'a>(&'a self, device: &'a DeviceId) -> impl Iterator<Item = &'a Cable> {
        self.cables
            .iter()
            .filter(move |c| c.end_of(device).is_some())
    }

    /// The cable directly joining two devices, if any.
    pub fn cable_between(&self, a: &DeviceId, b: &DeviceId) -> Option<&Cable> {
        self.cables
            .iter()
            .find(|c| c.end_of(a).is_some() && c.end_of(b).is_some())
    }
}
