/*!
Broadcast discovery of fan controllers on the local network.

A fixed probe (a read of the device-identifier parameter addressed to the
placeholder identifier) is broadcast repeatedly; every controller that hears
it answers with its real identifier.
*/

use fan_protocol::catalog::address;
use fan_protocol::protocol::DEFAULT_DEVICE_ID;
use fan_protocol::FrameCodec;
use serde::Serialize;
use socket2::{Domain, Protocol, Socket, Type};
use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, error, info, trace};

/// Read of 0x7C addressed to `DEFAULT_DEVICEID` with password `1111`
pub const DISCOVERY_PROBE: [u8; 29] = [
    0xFD, 0xFD, 0x02, 0x10, 0x44, 0x45, 0x46, 0x41, 0x55, 0x4C, 0x54, 0x5F, 0x44, 0x45, 0x56, 0x49,
    0x43, 0x45, 0x49, 0x44, 0x04, 0x31, 0x31, 0x31, 0x31, 0x01, 0x7C, 0xF8, 0x05,
];

pub const DEFAULT_PROBES: usize = 10;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);
const PROBE_INTERVAL: Duration = Duration::from_millis(100);
const RECV_BUFFER_LEN: usize = 1024;

/// A controller that answered discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceEndpoint {
    pub address: String,
    pub device_id: String,
}

/// Discovered controllers in answer order, unique by device id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredDevices {
    endpoints: Vec<DeviceEndpoint>,
}

impl DiscoveredDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer; returns false when the device id was already seen
    pub fn record(&mut self, address: impl Into<String>, device_id: impl Into<String>) -> bool {
        let device_id = device_id.into();
        if self.endpoints.iter().any(|e| e.device_id == device_id) {
            return false;
        }

        self.endpoints.push(DeviceEndpoint {
            address: address.into(),
            device_id,
        });
        true
    }

    /// Device id announced from `address`
    pub fn get(&self, address: &str) -> Option<&str> {
        self.endpoints
            .iter()
            .find(|e| e.address == address)
            .map(|e| e.device_id.as_str())
    }

    /// First controller that answered
    pub fn first(&self) -> Option<&DeviceEndpoint> {
        self.endpoints.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceEndpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Network address to device id map.
    ///
    /// Agrees with [`get`](Self::get): an address that announced several ids
    /// maps to the first one.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            map.entry(endpoint.address.clone())
                .or_insert_with(|| endpoint.device_id.clone());
        }
        map
    }
}

/// Discovery run configuration
pub struct Discovery {
    port: u16,
    max_probes: usize,
    target: SocketAddr,
    codec: FrameCodec,
}

impl Discovery {
    /// Probe the limited broadcast address on `port`
    pub fn new(port: u16) -> Self {
        Self {
            port,
            max_probes: DEFAULT_PROBES,
            target: (Ipv4Addr::BROADCAST, port).into(),
            codec: FrameCodec::default(),
        }
    }

    pub fn with_max_probes(mut self, max_probes: usize) -> Self {
        self.max_probes = max_probes;
        self
    }

    /// Send probes to a specific address instead of broadcasting
    pub fn with_target(mut self, target: SocketAddr) -> Self {
        self.target = target;
        self
    }

    /// Run the probe loop. Finding nothing is not an error.
    pub async fn discover(&self) -> DiscoveredDevices {
        let mut devices = DiscoveredDevices::new();

        let socket = match self.bind_socket() {
            Ok(socket) => socket,
            Err(e) => {
                error!("Failed to open discovery socket on port {}: {}", self.port, e);
                return devices;
            }
        };

        info!("🔍 Discovering devices on port {} ({} probes)", self.port, self.max_probes);

        let mut buffer = vec![0u8; RECV_BUFFER_LEN];
        for probe in 0..self.max_probes {
            trace!("Sending probe {}: {}", probe + 1, hex::encode(DISCOVERY_PROBE));
            if let Err(e) = socket.send_to(&DISCOVERY_PROBE, self.target).await {
                error!("Failed to send discovery probe to {}: {}", self.target, e);
            }

            match tokio::time::timeout(RECEIVE_TIMEOUT, socket.recv_from(&mut buffer)).await {
                Ok(Ok((len, sender))) => {
                    trace!("Received from {}: {}", sender, hex::encode(&buffer[..len]));
                    self.handle_reply(&mut devices, sender, &buffer[..len]);
                }
                Ok(Err(e)) => debug!("Discovery receive error: {}", e),
                Err(_) => debug!("No discovery reply within {:?}", RECEIVE_TIMEOUT),
            }

            tokio::time::sleep(PROBE_INTERVAL).await;
        }

        info!("✅ Discovery finished, {} device(s) found", devices.len());
        devices
    }

    /// Decode one reply and record the sender if it announced a real id
    pub fn handle_reply(&self, devices: &mut DiscoveredDevices, sender: SocketAddr, data: &[u8]) {
        let device_id = match self
            .codec
            .decode(data)
            .and_then(|frame| frame.parameter(address::DEVICE_ID).map(|p| p.as_text()))
        {
            Some(id) if !id.is_empty() && id != DEFAULT_DEVICE_ID => id,
            _ => return,
        };

        let sender_ip = sender.ip().to_string();
        if devices.record(sender_ip.clone(), device_id.clone()) {
            info!("📡 Found device {} at {}", device_id, sender_ip);
        } else {
            debug!("Device {} already recorded, ignoring reply from {}", device_id, sender_ip);
        }
    }

    /// Wildcard socket with broadcast and address reuse enabled
    fn bind_socket(&self) -> io::Result<UdpSocket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port)).into())?;

        UdpSocket::from_std(socket.into())
    }
}

/// Broadcast `max_probes` probes on `port` and collect the answers
pub async fn discover(port: u16, max_probes: usize) -> DiscoveredDevices {
    Discovery::new(port).with_max_probes(max_probes).discover().await
}
