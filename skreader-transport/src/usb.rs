//! USB HID transport for magnetic-stripe readers
//!
//! The reader exposes no interrupt endpoints we rely on; every frame moves
//! as a HID class control transfer on interface 0. rusb is blocking, so each
//! transfer runs on tokio's blocking pool against a shared handle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rusb::{Context, Device, DeviceHandle, UsbContext};
use tracing::{debug, trace, warn};

use skreader_core::{
    constants::{hid, usb, DEFAULT_TIMEOUT_MS, FRAME_SIZE},
    Frame,
};

use crate::{error::*, Transport};

/// Claimed device handle
struct OpenDevice {
    handle: Arc<DeviceHandle<Context>>,

    /// Kernel driver was detached on open and must be reattached
    reattach: bool,
}

/// USB transport for magnetic-stripe readers
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use skreader_transport::{Transport, UsbTransport};
///
/// # async fn run() -> skreader_transport::Result<()> {
/// let mut transport = UsbTransport::new().with_timeout(Duration::from_millis(1000));
/// transport.open().await?;
/// # Ok(())
/// # }
/// ```
pub struct UsbTransport {
    vendor_id: u16,
    product_id: u16,
    interface: u8,
    timeout: Duration,
    device: Option<OpenDevice>,
}

impl UsbTransport {
    /// Create transport for the reader's default vendor/product ids
    pub fn new() -> Self {
        Self {
            vendor_id: usb::VENDOR_ID,
            product_id: usb::PRODUCT_ID,
            interface: usb::INTERFACE,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            device: None,
        }
    }

    /// Match a different vendor/product id pair
    pub fn with_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }

    /// Set the interface to claim
    pub fn with_interface(mut self, interface: u8) -> Self {
        self.interface = interface;
        self
    }

    /// Set the per-transfer timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn handle(&self) -> Result<Arc<DeviceHandle<Context>>> {
        self.device
            .as_ref()
            .map(|device| Arc::clone(&device.handle))
            .ok_or(Error::NotConnected)
    }

    /// Locate, open and claim the device. Runs on the blocking pool.
    fn open_blocking(vendor_id: u16, product_id: u16, interface: u8) -> Result<OpenDevice> {
        let context = Context::new()?;
        let device = find_device(&context, vendor_id, product_id)?.ok_or(Error::DeviceNotFound {
            vendor_id,
            product_id,
        })?;

        debug!(
            bus = device.bus_number(),
            address = device.address(),
            "Opening {:04X}:{:04X}",
            vendor_id,
            product_id
        );

        let handle = device.open()?;

        let mut reattach = false;
        if rusb::supports_detach_kernel_driver() {
            match handle.kernel_driver_active(interface) {
                Ok(true) => match handle.detach_kernel_driver(interface) {
                    Ok(()) => {
                        debug!("Detached kernel driver from interface {}", interface);
                        reattach = true;
                    }
                    Err(e) => warn!("Could not detach kernel driver from interface {}: {}", interface, e),
                },
                Ok(false) => trace!("No kernel driver active on interface {}", interface),
                Err(e) => warn!("Could not query kernel driver on interface {}: {}", interface, e),
            }
        }

        handle.claim_interface(interface)?;
        debug!("Claimed interface {}", interface);

        Ok(OpenDevice {
            handle: Arc::new(handle),
            reattach,
        })
    }
}

impl Default for UsbTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn find_device(context: &Context, vendor_id: u16, product_id: u16) -> Result<Option<Device<Context>>> {
    for device in context.devices()?.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(descriptor) => descriptor,
            Err(e) => {
                trace!("Skipping device without descriptor: {}", e);
                continue;
            }
        };

        if descriptor.vendor_id() == vendor_id && descriptor.product_id() == product_id {
            return Ok(Some(device));
        }
    }

    Ok(None)
}

/// Combine the outcome of releasing an interface and reattaching its driver
///
/// The reattach is always attempted; a release failure takes precedence.
fn release_result(
    interface: u8,
    released: rusb::Result<()>,
    reattached: Option<rusb::Result<()>>,
) -> Result<()> {
    if let Err(e) = &released {
        warn!("Failed to release interface {}: {}", interface, e);
    }
    if let Some(Err(e)) = &reattached {
        warn!("Failed to reattach kernel driver on interface {}: {}", interface, e);
    }

    released?;
    reattached.transpose()?;

    debug!("Released interface {}", interface);
    Ok(())
}

#[async_trait]
impl Transport for UsbTransport {
    async fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyConnected);
        }

        let (vendor_id, product_id, interface) = (self.vendor_id, self.product_id, self.interface);
        let device = tokio::task::spawn_blocking(move || {
            Self::open_blocking(vendor_id, product_id, interface)
        })
        .await??;

        self.device = Some(device);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let Some(device) = self.device.take() else {
            return Ok(());
        };

        let interface = self.interface;
        tokio::task::spawn_blocking(move || {
            let released = device.handle.release_interface(interface);
            let reattached = device
                .reattach
                .then(|| device.handle.attach_kernel_driver(interface));
            release_result(interface, released, reattached)
        })
        .await?
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    async fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        let handle = self.handle()?;
        let timeout = self.timeout;
        let frame = *frame;

        trace!("Sending frame: {}", hex::encode(frame));

        let written = tokio::task::spawn_blocking(move || {
            handle.write_control(
                hid::REQUEST_TYPE_OUT,
                hid::SET_REPORT,
                hid::REPORT_VALUE,
                0,
                &frame,
                timeout,
            )
        })
        .await??;

        if written != FRAME_SIZE {
            return Err(Error::ShortWrite {
                expected: FRAME_SIZE,
                actual: written,
            });
        }

        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Bytes> {
        let handle = self.handle()?;
        let timeout = self.timeout;

        let frame = tokio::task::spawn_blocking(move || {
            let mut buf = [0u8; FRAME_SIZE];
            handle
                .read_control(
                    hid::REQUEST_TYPE_IN,
                    hid::GET_REPORT,
                    hid::REPORT_VALUE,
                    0,
                    &mut buf,
                    timeout,
                )
                .map(|n| Bytes::copy_from_slice(&buf[..n]))
        })
        .await??;

        trace!("Received frame: {}", hex::encode(&frame));
        Ok(frame)
    }

    fn description(&self) -> String {
        format!("usb:{:04X}:{:04X}/{}", self.vendor_id, self.product_id, self.interface)
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        if self.device.is_some() {
            warn!("{} dropped while open; kernel driver not reattached", self.description());
        }
    }
}
