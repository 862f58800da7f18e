/*!
Fill in controller address and identifier from discovery results.
*/

use crate::config::{FanConfig, DEFAULT_HOSTNAME};
use crate::discovery::DiscoveredDevices;
use fan_protocol::protocol::DEFAULT_DEVICE_ID;
use tracing::{info, warn};

/// Update `config` from discovered devices; returns true if anything changed.
///
/// An unset hostname adopts the first device found. A configured hostname
/// with an unset device id takes the id announced from that address.
pub fn resolve_endpoint(config: &mut FanConfig, devices: &DiscoveredDevices) -> bool {
    let Some(first) = devices.first() else {
        return false;
    };

    let hostname = config.hostname.trim();
    if hostname.is_empty() || hostname == DEFAULT_HOSTNAME {
        info!("Using discovered device {} at {}", first.device_id, first.address);
        config.hostname = first.address.clone();
        config.device_id = first.device_id.clone();
        return true;
    }

    let device_id = config.device_id.trim();
    if device_id.is_empty() || device_id == DEFAULT_DEVICE_ID {
        return match devices.get(hostname) {
            Some(id) => {
                info!("Resolved device id {} for {}", id, hostname);
                config.device_id = id.to_string();
                true
            }
            None => {
                warn!("No discovered device answered from {}", hostname);
                false
            }
        };
    }

    false
}
