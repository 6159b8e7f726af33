use crate::decode::PhysDecodeLevel;
use std::fmt::Write;

#[cfg(feature = "serial")]
pub(crate) use layer::*;

#[cfg(feature = "serial")]
mod layer {
    use crate::decode::PhysDecodeLevel;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::time::{Duration, Instant};

    use super::PhysDisplay;

    pub(crate) struct PhysLayer {
        layer: PhysLayerImpl,
        silent_interval: Duration,
        last_activity: Option<Instant>,
    }

    // encapsulates all possible physical layers as an enum
    pub(crate) enum PhysLayerImpl {
        Serial(tokio_serial::SerialStream),
        #[cfg(test)]
        Mock(tokio::io::DuplexStream),
    }

    impl std::fmt::Debug for PhysLayer {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            match &self.layer {
                PhysLayerImpl::Serial(_) => f.write_str("Serial"),
                #[cfg(test)]
                PhysLayerImpl::Mock(_) => f.write_str("Mock"),
            }
        }
    }

    impl PhysLayer {
        pub(crate) fn new_serial(stream: tokio_serial::SerialStream) -> Self {
            let silent_interval = calculate_silent_interval(&stream);
            Self {
                layer: PhysLayerImpl::Serial(stream),
                silent_interval,
                last_activity: None,
            }
        }

        #[cfg(test)]
        pub(crate) fn new_mock(mock: tokio::io::DuplexStream) -> Self {
            Self {
                layer: PhysLayerImpl::Mock(mock),
                silent_interval: Duration::ZERO,
                last_activity: None,
            }
        }

        pub(crate) async fn read(
            &mut self,
            buffer: &mut [u8],
            decode_level: PhysDecodeLevel,
        ) -> Result<usize, std::io::Error> {
            let length = match &mut self.layer {
                PhysLayerImpl::Serial(x) => x.read(buffer).await?,
                #[cfg(test)]
                PhysLayerImpl::Mock(x) => x.read(buffer).await?,
            };

            if length == 0 {
                return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
            }

            self.last_activity = Some(Instant::now());

            if decode_level.enabled() {
                if let Some(x) = buffer.get(0..length) {
                    tracing::info!("PHYS RX - {}", PhysDisplay::new(decode_level, x))
                }
            }

            Ok(length)
        }

        pub(crate) async fn write(
            &mut self,
            data: &[u8],
            decode_level: PhysDecodeLevel,
        ) -> Result<(), std::io::Error> {
            // the bus must stay silent for 3.5 characters before we answer
            if let Some(last_activity) = self.last_activity {
                tokio::time::sleep_until(last_activity + self.silent_interval).await;
            }

            if decode_level.enabled() {
                tracing::info!("PHYS TX - {}", PhysDisplay::new(decode_level, data));
            }

            match &mut self.layer {
                PhysLayerImpl::Serial(x) => x.write_all(data).await?,
                #[cfg(test)]
                PhysLayerImpl::Mock(x) => x.write_all(data).await?,
            }

            self.last_activity = Some(Instant::now());
            Ok(())
        }
    }

    fn calculate_silent_interval(serial: &tokio_serial::SerialStream) -> Duration {
        use tokio_serial::SerialPort;

        // Modbus RTU uses 11-bit characters (1 start, 8 data, 1 parity or stop, 1 stop)
        const NUM_BITS_IN_CHAR: u64 = 11;

        // above this baud rate the interval is fixed
        const MAX_BAUD_RATE: u32 = 19200;
        const MIN_DELAY: Duration = Duration::from_micros(1750);

        match serial.baud_rate() {
            Ok(baud_rate) if baud_rate <= MAX_BAUD_RATE && baud_rate > 0 => {
                let character_time = Duration::from_secs(NUM_BITS_IN_CHAR) / baud_rate;
                35 * character_time / 10 // multiply by 3.5
            }
            Ok(_) => MIN_DELAY,
            Err(_) => {
                tracing::warn!(
                    "unable to determine the baud rate, defaulting to {} us",
                    MIN_DELAY.as_micros()
                );
                MIN_DELAY
            }
        }
    }
}

pub(crate) struct PhysDisplay<'a> {
    level: PhysDecodeLevel,
    data: &'a [u8],
}

impl<'a> PhysDisplay<'a> {
    pub(crate) fn new(level: PhysDecodeLevel, data: &'a [u8]) -> Self {
        PhysDisplay { level, data }
    }
}

impl std::fmt::Display for PhysDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} bytes", self.data.len())?;
        if self.level.data_enabled() {
            format_bytes(f, self.data)?;
        }
        Ok(())
    }
}

const BYTES_PER_DECODE_LINE: usize = 18;

pub(crate) fn format_bytes(f: &mut std::fmt::Formatter, bytes: &[u8]) -> std::fmt::Result {
    for chunk in bytes.chunks(BYTES_PER_DECODE_LINE) {
        writeln!(f)?;
        let mut first = true;
        for byte in chunk {
            if !first {
                f.write_char(' ')?;
            }
            first = false;
            write!(f, "{byte:02X?}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "serial")]
    #[test]
    fn mock_layer_moves_bytes_and_reports_eof() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        tokio_test::block_on(async {
            let (local, mut remote) = tokio::io::duplex(16);
            let mut phys = PhysLayer::new_mock(local);

            remote.write_all(&[0x0A, 0x03]).await.unwrap();
            let mut buffer = [0u8; 8];
            let count = phys.read(&mut buffer, PhysDecodeLevel::Data).await.unwrap();
            assert_eq!(&buffer[..count], &[0x0A, 0x03]);

            phys.write(&[0x0A, 0x83, 0x02], PhysDecodeLevel::Nothing)
                .await
                .unwrap();
            let mut reply = [0u8; 3];
            remote.read_exact(&mut reply).await.unwrap();
            assert_eq!(reply, [0x0A, 0x83, 0x02]);

            drop(remote);
            let err = phys.read(&mut buffer, PhysDecodeLevel::Nothing).await.unwrap_err();
            assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
        });
    }

    #[test]
    fn displays_length_and_hex_data() {
        let data = [0x0A, 0x03, 0xFF];
        assert_eq!(
            PhysDisplay::new(PhysDecodeLevel::Length, &data).to_string(),
            "3 bytes"
        );
        assert_eq!(
            PhysDisplay::new(PhysDecodeLevel::Data, &data).to_string(),
            "3 bytes\n0A 03 FF"
        );
    }
}
