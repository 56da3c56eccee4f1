//! High-level reader interface

use tracing::{debug, info, trace};

use skreader_core::{response, Packet, PacketAssembler, Request};
use skreader_transport::{Transport, UsbTransport};
use skreader_types::{Catalog, Response, SettingDescriptor};

use crate::error::{Error, Result};

/// Magnetic-stripe reader session
///
/// Owns the transport for its whole lifetime. Exchanges are strictly
/// sequential: every method that talks to the device takes `&mut self`.
///
/// # Examples
///
/// ```no_run
/// use skreader::{settings, Reader};
///
/// #[tokio::main]
/// async fn main() -> skreader::Result<()> {
///     let mut reader = Reader::connect_usb().await?;
///
///     let response = reader.read_setting(&settings::FIRMWARE_VERSION).await?;
///     println!("Firmware: {}", response.ascii().unwrap_or_default());
///
///     reader.close().await?;
///     Ok(())
/// }
/// ```
pub struct Reader {
    transport: Box<dyn Transport>,
    catalog: &'static Catalog,
}

impl Reader {
    /// Open a session over `transport`
    ///
    /// The transport is opened unless it already is.
    pub async fn connect(transport: impl Transport + 'static) -> Result<Self> {
        let mut transport: Box<dyn Transport> = Box::new(transport);

        info!("Connecting to {}...", transport.description());

        if !transport.is_open() {
            transport.open().await?;
        }

        info!("Connected to {}", transport.description());

        Ok(Self {
            transport,
            catalog: Catalog::standard(),
        })
    }

    /// Open a session on the first attached reader with default USB settings
    pub async fn connect_usb() -> Result<Self> {
        Self::connect(UsbTransport::new()).await
    }

    /// Resolve names and segments against a different catalog
    pub fn with_catalog(mut self, catalog: &'static Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn description(&self) -> String {
        self.transport.description()
    }

    /// Read one setting from the device
    ///
    /// # Errors
    ///
    /// - [`Error::NotReadable`] if the setting is write-only; the device is
    ///   not contacted
    /// - [`Error::Transport`] if any frame send or read fails
    /// - [`Error::Core`] if the reply fails verification
    pub async fn read_setting(&mut self, setting: &SettingDescriptor) -> Result<Response> {
        if !setting.readable {
            return Err(Error::NotReadable {
                name: setting.name,
                id: setting.id,
            });
        }

        debug!("Reading {}...", setting);

        let request = Request::read(setting);
        self.send_request(&request).await?;

        let packet = self.read_packet().await?;
        let response = response::decode(&packet, setting, self.catalog);

        debug!("{}: {}", setting, response.status);

        Ok(response)
    }

    /// Read a setting by catalog name (case-insensitive)
    pub async fn read_setting_by_name(&mut self, name: &str) -> Result<Response> {
        let setting = self.catalog.lookup(name)?;
        self.read_setting(setting).await
    }

    /// Close the session and release the device
    pub async fn close(mut self) -> Result<()> {
        info!("Closing {}...", self.transport.description());

        self.transport.close().await?;

        info!("Closed");
        Ok(())
    }

    // Helper methods

    async fn send_request(&mut self, request: &Request) -> Result<()> {
        trace!("Sending: {:?}", request);

        for frame in request.frames()? {
            self.transport.send_frame(&frame).await?;
        }

        Ok(())
    }

    async fn read_packet(&mut self) -> Result<Packet> {
        let mut assembler = PacketAssembler::new();

        while !assembler.is_complete() {
            let read = self.transport.read_frame().await?;
            assembler.push(&read)?;
        }

        let packet = assembler.finish()?;

        trace!("Received: {:?}", packet);

        Ok(packet)
    }
}
