use std::time::Duration;

use crate::common::phys::PhysLayer;
use crate::error::Shutdown;
use crate::retry::RetryStrategy;
use crate::serial::SerialSettings;
use crate::server::task::{SessionError, SessionTask};

/// Keeps a serial port open for the lifetime of the server
pub(crate) struct RtuServerTask {
    pub(crate) port: String,
    pub(crate) retry: Box<dyn RetryStrategy>,
    pub(crate) settings: SerialSettings,
    pub(crate) session: SessionTask,
}

impl RtuServerTask {
    pub(crate) async fn run(&mut self) -> Shutdown {
        loop {
            let delay = match self.serve_once().await {
                Ok(delay) => delay,
                Err(Shutdown) => return Shutdown,
            };
            if let Err(Shutdown) = self.session.sleep_for(delay).await {
                return Shutdown;
            }
        }
    }

    /// Open the port and serve it until it fails, returning how long to wait before reopening
    async fn serve_once(&mut self) -> Result<Duration, Shutdown> {
        let serial = match crate::serial::open(&self.port, self.settings) {
            Ok(serial) => serial,
            Err(err) => {
                let delay = self.retry.after_failed_connect();
                tracing::warn!("unable to open serial port ({}), retrying in {:?}", err, delay);
                return Ok(delay);
            }
        };

        self.retry.reset();
        tracing::info!("opened port");

        let mut phys = PhysLayer::new_serial(serial);
        match self.session.run(&mut phys).await {
            SessionError::Shutdown => Err(Shutdown),
            SessionError::Io(err) => {
                // a port that fails right after opening is not retried immediately
                let delay = self.retry.after_disconnect();
                tracing::warn!("port closed: {}, reopening in {:?}", err, delay);
                Ok(delay)
            }
        }
    }
}
