/*!
Polling host loop.

Two threads, joined by a bounded channel:
1. Poll thread: runs a tokio runtime, reads every catalog parameter on a
   fixed interval and projects the answer into a [`FanStatus`]
2. Publisher thread: hands each snapshot to a [`StatusSink`]

A failed poll cycle is logged and skipped; only the running flag stops the
loop.
*/

use crate::session::DeviceSession;
use anyhow::{anyhow, Result};
use chrono::Local;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use fan_protocol::{FanStatus, ParameterValue};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

const FLAG_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Destination for status snapshots, e.g. a message-bus topic
pub trait StatusSink: Send {
    fn publish(&mut self, status: &FanStatus) -> Result<()>;
}

/// Writes each snapshot as one JSON line
pub struct JsonLineSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> StatusSink for JsonLineSink<W> {
    fn publish(&mut self, status: &FanStatus) -> Result<()> {
        writeln!(self.writer, "{}", status.to_json()?)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Command received from the bus for one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetBoost(bool),
}

impl Command {
    /// Parse a bus payload addressed to a status field
    pub fn parse(entity: &str, payload: &str) -> Option<Self> {
        match entity {
            "ModeBoost" => match payload.trim() {
                "ON" => Some(Self::SetBoost(true)),
                "OFF" => Some(Self::SetBoost(false)),
                _ => None,
            },
            _ => None,
        }
    }

    pub async fn apply(self, session: &DeviceSession) -> fan_protocol::Result<Vec<ParameterValue>> {
        match self {
            Self::SetBoost(on) => {
                info!("Setting boost mode {}", if on { "ON" } else { "OFF" });
                session.set_boost(on).await
            }
        }
    }
}

/// Read all parameters once; `None` when the controller gave no usable answer
pub async fn poll_once(session: &DeviceSession) -> Option<FanStatus> {
    match session.read_all().await {
        Ok(parameters) if !parameters.is_empty() => Some(FanStatus::from_parameters(&parameters)),
        Ok(_) => {
            warn!("No parameters received from {}", session.endpoint());
            None
        }
        Err(e) => {
            error!("Status read failed: {}", e);
            None
        }
    }
}

pub struct Bridge {
    session: Arc<DeviceSession>,
    poll_interval: Duration,
    channel_buffer_size: usize,
    running: Arc<AtomicBool>,
}

impl Bridge {
    pub fn new(session: DeviceSession, poll_interval: Duration, channel_buffer_size: usize) -> Self {
        Self {
            session: Arc::new(session),
            poll_interval,
            channel_buffer_size: channel_buffer_size.max(1),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Get a reference to the running flag for external control
    pub fn get_running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run until the running flag is cleared
    pub fn start(&self, sink: Box<dyn StatusSink>) -> Result<()> {
        let (status_tx, status_rx) = bounded::<FanStatus>(self.channel_buffer_size);

        let running_poll = Arc::clone(&self.running);
        let running_publisher = Arc::clone(&self.running);
        let session = Arc::clone(&self.session);
        let poll_interval = self.poll_interval;

        let poll_handle = thread::spawn(move || -> Result<()> {
            let rt = Runtime::new()?;
            rt.block_on(Self::poll_thread(session, poll_interval, status_tx, running_poll));
            info!("Poll thread finished");
            Ok(())
        });

        let publisher_handle = thread::spawn(move || {
            Self::publisher_thread(status_rx, sink, running_publisher);
            info!("Publisher thread finished");
        });

        let poll_result = poll_handle
            .join()
            .map_err(|_| anyhow!("Poll thread panicked"))?;
        publisher_handle
            .join()
            .map_err(|_| anyhow!("Publisher thread panicked"))?;

        poll_result
    }

    async fn poll_thread(
        session: Arc<DeviceSession>,
        poll_interval: Duration,
        status_tx: Sender<FanStatus>,
        running: Arc<AtomicBool>,
    ) {
        info!("🔄 Polling {} every {:?}", session.endpoint(), poll_interval);
        let mut cycles = 0u64;
        let mut failures = 0u64;

        while running.load(Ordering::SeqCst) {
            let started = Instant::now();
            cycles += 1;

            match poll_once(&session).await {
                Some(status) => match status_tx.try_send(status) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!("Status channel full, dropping snapshot");
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        error!("Publisher gone, stopping poll loop");
                        break;
                    }
                },
                None => failures += 1,
            }

            // Sleep out the interval in short steps so shutdown stays responsive
            while running.load(Ordering::SeqCst) && started.elapsed() < poll_interval {
                let remaining = poll_interval.saturating_sub(started.elapsed());
                tokio::time::sleep(remaining.min(FLAG_CHECK_INTERVAL)).await;
            }
        }

        info!("📈 Poll loop stats: {} cycles, {} without data", cycles, failures);
    }

    fn publisher_thread(
        status_rx: Receiver<FanStatus>,
        mut sink: Box<dyn StatusSink>,
        running: Arc<AtomicBool>,
    ) {
        let mut published = 0u64;

        while running.load(Ordering::SeqCst) || !status_rx.is_empty() {
            match status_rx.recv_timeout(FLAG_CHECK_INTERVAL) {
                Ok(status) => match sink.publish(&status) {
                    Ok(()) => {
                        published += 1;
                        info!(
                            "Published status of {} at {}",
                            status.device_id,
                            Local::now().format("%Y-%m-%d %H:%M:%S")
                        );
                    }
                    Err(e) => error!("Failed to publish status: {}", e),
                },
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("📤 Published {} snapshots", published);
    }
}
