//! Read identity and settings from an attached reader

use std::time::Duration;

use skreader::{settings, Error, Reader, UsbTransport};
use skreader_transport::Error as TransportError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> skreader::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let timeout = std::env::var("SKREADER_TIMEOUT_MS")
        .ok()
        .and_then(|ms| ms.parse().ok())
        .unwrap_or(2500);

    let transport = UsbTransport::new().with_timeout(Duration::from_millis(timeout));

    let mut reader = match Reader::connect(transport).await {
        Ok(reader) => reader,
        Err(Error::Transport(TransportError::AccessDenied(reason))) => {
            eprintln!("Insufficient permissions to access the reader: {}", reason);
            eprintln!("Add a udev rule for the device or run as root.");
            return Ok(());
        }
        Err(Error::Transport(TransportError::DeviceNotFound { .. })) => {
            eprintln!("Reader not detected. Check the cable and try again.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    println!("Reader connected!");

    let serial = reader.read_setting(&settings::SERIAL_NUMBER).await?;
    println!("{}", serial);

    let firmware = reader.read_setting(&settings::FIRMWARE_VERSION).await?;
    println!("Firmware: {}", firmware.ascii().unwrap_or("<none>"));

    let all = reader.read_setting(&settings::ALL_SETTINGS).await?;
    println!("Status: {}", all.status);
    for segment in all.segments() {
        println!("  {}", segment);
    }

    reader.close().await?;

    Ok(())
}
