use std::time::Duration;

pub(crate) mod dispatch;
pub(crate) mod request;
pub(crate) mod response;
#[cfg(feature = "serial")]
pub(crate) mod task;

// re-export to the public API
pub use dispatch::*;

/// Default interval between checks of the receive buffer
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Options for the serial server task
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ServerOptions {
    /// Longest time the task waits for input before polling the dispatcher again
    ///
    /// Partially received frames can only expire when the dispatcher is polled.
    pub poll_interval: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A handle to the server async task. The task is shutdown when the handle is dropped.
#[derive(Debug)]
pub struct ServerHandle {
    _tx: tokio::sync::mpsc::Sender<()>,
}

impl ServerHandle {
    /// Construct a [ServerHandle] from the sending half of the shutdown channel
    pub fn new(tx: tokio::sync::mpsc::Sender<()>) -> Self {
        ServerHandle { _tx: tx }
    }
}

#[cfg(feature = "serial")]
pub use rtu::*;

#[cfg(feature = "serial")]
mod rtu {
    use tracing::Instrument;

    use super::{ServerHandle, ServerOptions};
    use crate::retry::RetryStrategy;
    use crate::serial::server::RtuServerTask;
    use crate::serial::SerialSettings;
    use crate::server::task::SessionTask;
    use crate::server::Dispatcher;

    /// Spawns an RTU server task onto the runtime. This method can only
    /// be called from within the runtime context. Use [`create_rtu_server_task`]
    /// and then spawn it manually if using outside the Tokio runtime.
    ///
    /// The port is re-opened according to `retry` whenever it cannot be opened or fails.
    ///
    /// * `path` - Path to the serial device. Generally `/dev/tty0` on Linux and `COM1` on Windows.
    /// * `settings` - Serial port settings
    /// * `retry` - A boxed trait object that controls when the port is retried after a failure
    /// * `dispatcher` - The devices to emulate and their frame handling
    /// * `options` - Task options
    pub fn spawn_rtu_server_task(
        path: &str,
        settings: SerialSettings,
        retry: Box<dyn RetryStrategy>,
        dispatcher: Dispatcher,
        options: ServerOptions,
    ) -> ServerHandle {
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        tokio::spawn(create_rtu_server_task(
            rx, path, settings, retry, dispatcher, options,
        ));
        ServerHandle::new(tx)
    }

    /// Creates an RTU server task that can then be spawned onto the runtime manually.
    /// Most users will prefer [`spawn_rtu_server_task`] unless they are using the library from
    /// outside the Tokio runtime and need to spawn it using a Runtime handle instead of the
    /// `tokio::spawn` function.
    ///
    /// The task stops once every sender of `rx` is dropped.
    pub fn create_rtu_server_task(
        rx: tokio::sync::mpsc::Receiver<()>,
        path: &str,
        settings: SerialSettings,
        retry: Box<dyn RetryStrategy>,
        dispatcher: Dispatcher,
        options: ServerOptions,
    ) -> impl std::future::Future<Output = ()> {
        let path = path.to_string();
        let devices = dispatcher.devices().len();
        let mut task = RtuServerTask {
            port: path.clone(),
            retry,
            settings,
            session: SessionTask::new(dispatcher, rx, options.poll_interval),
        };
        async move {
            tracing::info!("emulating {} device(s)", devices);
            task.run().await;
            tracing::info!("server shutdown");
        }
        .instrument(tracing::info_span!("Modbus-Server-RTU", "port" = ?path))
    }
}
