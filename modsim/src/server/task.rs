use std::time::Duration;

use crate::common::phys::PhysLayer;
use crate::error::Shutdown;
use crate::server::{Dispatcher, Reply};

const READ_BUFFER_SIZE: usize = 256;

/// Reason a session with an open port ended
#[derive(Debug)]
pub(crate) enum SessionError {
    /// The server handle was dropped
    Shutdown,
    /// Reading from or writing to the port failed
    Io(std::io::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SessionError::Shutdown => f.write_str("shutdown"),
            SessionError::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Io(err)
    }
}

pub(crate) struct SessionTask {
    dispatcher: Dispatcher,
    shutdown: tokio::sync::mpsc::Receiver<()>,
    poll_interval: Duration,
}

impl SessionTask {
    pub(crate) fn new(
        dispatcher: Dispatcher,
        shutdown: tokio::sync::mpsc::Receiver<()>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            dispatcher,
            shutdown,
            poll_interval,
        }
    }

    /// Serve requests on `phys` until shutdown or an I/O error
    pub(crate) async fn run(&mut self, phys: &mut PhysLayer) -> SessionError {
        // bytes left over from a previous port are meaningless
        self.dispatcher.reset();
        match self.run_inner(phys).await {
            Ok(never) => match never {},
            Err(err) => err,
        }
    }

    async fn run_inner(
        &mut self,
        phys: &mut PhysLayer,
    ) -> Result<std::convert::Infallible, SessionError> {
        let level = self.dispatcher.decode_level().physical;
        let mut buffer = [0u8; READ_BUFFER_SIZE];

        loop {
            // polling with nothing new received still lets partial frames expire
            self.reply_to_buffered(phys).await?;

            tokio::select! {
                _ = self.shutdown.recv() => {
                    return Err(SessionError::Shutdown);
                }
                res = tokio::time::timeout(self.poll_interval, phys.read(&mut buffer, level)) => {
                    match res {
                        Ok(count) => self.dispatcher.feed(&buffer[..count?]),
                        Err(_) => continue,
                    }
                }
            }
        }
    }

    async fn reply_to_buffered(&mut self, phys: &mut PhysLayer) -> Result<(), std::io::Error> {
        let level = self.dispatcher.decode_level().physical;
        loop {
            match self.dispatcher.poll_once() {
                Reply::NoFullPackage => return Ok(()),
                Reply::PackageOk(bytes) => phys.write(bytes, level).await?,
                Reply::NoSlaveMatch | Reply::IncorrectCrc => {}
            }
        }
    }

    /// Wait for `duration` unless the handle is dropped first
    pub(crate) async fn sleep_for(&mut self, duration: Duration) -> Result<(), Shutdown> {
        tokio::select! {
            _ = self.shutdown.recv() => Err(Shutdown),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}
