/*!
Command exchange with a single fan controller.

Every command uses a fresh UDP socket that is connected to the controller,
used for one send and one bounded receive, and dropped before returning.
Network failures are logged and surface as an empty response; only caller
mistakes (mismatched write values, oversized password) are returned as errors.
*/

use crate::config::FanConfig;
use fan_protocol::catalog::address;
use fan_protocol::codec::CommandFrame;
use fan_protocol::{Catalog, Credentials, FrameCodec, Function, ParameterValue, ResponseFrame};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, error, trace};

const RECV_BUFFER_LEN: usize = 4096;

pub struct DeviceSession {
    hostname: String,
    port: u16,
    credentials: Credentials,
    codec: FrameCodec,
    response_timeout: Duration,
}

impl DeviceSession {
    pub fn new(config: &FanConfig) -> Self {
        Self {
            hostname: config.hostname.clone(),
            port: config.port,
            credentials: config.credentials(),
            codec: FrameCodec::new(Catalog::standard()).with_checksum_policy(config.checksum_policy),
            response_timeout: Duration::from_millis(config.response_timeout_ms),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// Send one command and decode the controller's answer.
    ///
    /// `values` is required for write functions and must pair up with
    /// `addresses`; it is ignored otherwise. An empty result means no usable
    /// answer arrived this time.
    pub async fn execute(
        &self,
        function: Function,
        addresses: &[u8],
        values: Option<&[Vec<u8>]>,
    ) -> fan_protocol::Result<Vec<ParameterValue>> {
        let command = if function.carries_values() {
            CommandFrame::with_values(function, addresses, values.unwrap_or_default())?
        } else {
            CommandFrame::new(function, addresses)
        };
        let request = self.codec.encode(&self.credentials, &command)?;

        trace!("Sending data: {}", hex::encode(&request));

        match self.exchange(&request).await {
            Ok(response) => {
                trace!("Received data: {}", hex::encode(&response));
                Ok(self
                    .codec
                    .decode(&response)
                    .map(ResponseFrame::into_parameters)
                    .unwrap_or_default())
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                error!(
                    "No data received from {} after {:?}",
                    self.endpoint(),
                    self.response_timeout
                );
                Ok(Vec::new())
            }
            Err(e) => {
                error!("Exchange with {} failed: {}", self.endpoint(), e);
                Ok(Vec::new())
            }
        }
    }

    /// Read every catalog parameter
    pub async fn read_all(&self) -> fan_protocol::Result<Vec<ParameterValue>> {
        let parameters = self
            .execute(Function::Read, &self.codec.catalog().addresses(), None)
            .await?;

        for parameter in &parameters {
            debug!("{}", parameter);
        }

        Ok(parameters)
    }

    /// Switch boost mode and return the controller's confirmation
    pub async fn set_boost(&self, on: bool) -> fan_protocol::Result<Vec<ParameterValue>> {
        let value = vec![u8::from(on)];
        self.execute(
            Function::WriteReturn,
            &[address::BOOST_MODE],
            Some(std::slice::from_ref(&value)),
        )
        .await
    }

    /// Bound the whole exchange, name resolution included, by the response timeout
    async fn exchange(&self, request: &[u8]) -> io::Result<Vec<u8>> {
        tokio::time::timeout(self.response_timeout, self.send_and_receive(request))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "response timeout"))?
    }

    /// One send and one receive on a socket owned by this call
    async fn send_and_receive(&self, request: &[u8]) -> io::Result<Vec<u8>> {
        let peer = lookup_host((self.hostname.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address found for {}", self.hostname),
                )
            })?;

        let local: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;
        socket.send(request).await?;

        let mut buffer = vec![0u8; RECV_BUFFER_LEN];
        let received = socket.recv(&mut buffer).await?;

        buffer.truncate(received);
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fan_protocol::ProtocolError;

    /// Stand-in controller on the loopback interface
    async fn fake_device() -> (UdpSocket, FanConfig) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = FanConfig {
            hostname: "127.0.0.1".to_string(),
            port: socket.local_addr().unwrap().port(),
            device_id: "1234567890123456".to_string(),
            response_timeout_ms: 300,
            ..FanConfig::default()
        };
        (socket, config)
    }

    fn response(addresses: &[u8], values: &[Vec<u8>]) -> Vec<u8> {
        let values: Vec<ParameterValue> = addresses
            .iter()
            .zip(values)
            .map(|(&address, raw)| ParameterValue::new(address, raw.clone()))
            .collect();
        FrameCodec::default()
            .encode_response(&Credentials::new("1234567890123456", "1111"), &values)
            .unwrap()
    }

    #[tokio::test]
    async fn test_read_exchange() {
        let (device, config) = fake_device().await;
        let session = DeviceSession::new(&config);

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (len, peer) = device.recv_from(&mut buf).await.unwrap();
            let reply = response(
                &[0x01, 0x04, address::DEVICE_ID],
                &[vec![0x01], vec![0x64, 0x00], b"1234567890123456".to_vec()],
            );
            device.send_to(&reply, peer).await.unwrap();
            buf[..len].to_vec()
        });

        let parameters = session
            .execute(Function::Read, &[0x01, 0x04], None)
            .await
            .unwrap();
        let request = responder.await.unwrap();

        assert_eq!(&request[26..28], &[0x01, 0x04]);
        assert_eq!(parameters.len(), 3);
        assert!(parameters[0].as_bool());
        assert_eq!(parameters[1].as_int(), 100);
        assert_eq!(parameters[2].as_text(), "1234567890123456");
    }

    #[tokio::test]
    async fn test_timeout_yields_empty() {
        let (_device, config) = fake_device().await;
        let session = DeviceSession::new(&config);

        let parameters = session.execute(Function::Read, &[0x01], None).await.unwrap();
        assert!(parameters.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_port_yields_empty() {
        let (device, config) = fake_device().await;
        drop(device);
        let session = DeviceSession::new(&config);

        let parameters = session.execute(Function::Read, &[0x01], None).await.unwrap();
        assert!(parameters.is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_host_yields_empty() {
        let config = FanConfig {
            hostname: "fan.invalid".to_string(),
            response_timeout_ms: 100,
            ..FanConfig::default()
        };
        let session = DeviceSession::new(&config);

        let parameters = session.execute(Function::Read, &[0x01], None).await.unwrap();
        assert!(parameters.is_empty());
    }

    #[tokio::test]
    async fn test_write_mismatch_sends_nothing() {
        let (device, config) = fake_device().await;
        let session = DeviceSession::new(&config);

        let values = vec![vec![0x01]];
        let err = session
            .execute(Function::Write, &[0x01, 0x05], Some(values.as_slice()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::ValueCountMismatch { .. }));

        let mut buf = [0u8; 64];
        let nothing =
            tokio::time::timeout(Duration::from_millis(100), device.recv_from(&mut buf)).await;
        assert!(nothing.is_err());
    }

    #[tokio::test]
    async fn test_set_boost_request() {
        let (device, config) = fake_device().await;
        let session = DeviceSession::new(&config);

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (len, peer) = device.recv_from(&mut buf).await.unwrap();
            let reply = response(&[address::BOOST_MODE], &[vec![0x01]]);
            device.send_to(&reply, peer).await.unwrap();
            buf[..len].to_vec()
        });

        let parameters = session.set_boost(true).await.unwrap();
        let request = responder.await.unwrap();

        assert_eq!(request[25], Function::WriteReturn.code());
        assert_eq!(&request[26..28], &[address::BOOST_MODE, 0x01]);
        assert_eq!(parameters, vec![ParameterValue::new(address::BOOST_MODE, vec![0x01])]);
    }
}
