//! The bus session
//!
//! [`I2cSession`] owns a bus backend and the per-session state: the current
//! target address, the transfer timeout, and the memory-pointer width. Every
//! transfer is guarded twice, in this order:
//!
//! 1. The peripheral must have been brought up with [`I2cSession::begin`]
//!    (otherwise [`SessionError::NotInitialized`]).
//! 2. The target must acknowledge its address
//!    (otherwise [`SessionError::NotReady`]).
//!
//! Probing is per-operation: a device that stops acknowledging between calls
//! surfaces as `NotReady`, not as a transport error.

use heapless::Vec;
use icebus_hal::{I2cBus, I2cConfig};

use crate::error::SessionError;
use crate::memory::{MemAddrWidth, MAX_MEM_DATA};

/// Default transfer timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u32 = 5000;

/// First address probed by [`I2cSession::scan`]
///
/// 0x00-0x07 are reserved (general call, CBUS, high-speed master codes).
pub const SCAN_FIRST: u8 = 0x08;

/// Last address probed by [`I2cSession::scan`]
///
/// 0x78-0x7F are reserved for 10-bit addressing and future use.
pub const SCAN_LAST: u8 = 0x77;

/// Scan result capacity (the whole probed range can respond)
pub const SCAN_CAPACITY: usize = (SCAN_LAST - SCAN_FIRST + 1) as usize;

/// Memory-write frame capacity: pointer bytes plus data
const MEM_FRAME_CAP: usize = MAX_MEM_DATA + 2;

/// A session over an I2C bus backend
///
/// Generic over the backend so the same session logic runs against a chip
/// HAL, the [`crate::eh1::EhBus`] adapter, or a mock in tests.
pub struct I2cSession<BUS> {
    bus: BUS,
    address: Option<u8>,
    timeout_ms: u32,
    mem_width: MemAddrWidth,
}

impl<BUS: I2cBus> I2cSession<BUS> {
    /// Create a session over `bus`
    ///
    /// The bus is not touched until [`begin`](I2cSession::begin). No target
    /// address is set; the timeout defaults to [`DEFAULT_TIMEOUT_MS`] and
    /// the memory-pointer width to 8 bits.
    pub fn new(bus: BUS) -> Self {
        Self {
            bus,
            address: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            mem_width: MemAddrWidth::default(),
        }
    }

    /// Bring the peripheral up
    ///
    /// Also records `config.own_address` as the current target address, so
    /// the implicit-address convenience methods work immediately after
    /// `begin` with the default peer.
    pub fn begin(&mut self, config: &I2cConfig) -> Result<(), SessionError<BUS::Error>> {
        if config.own_address > 0x7F {
            return Err(SessionError::InvalidAddress);
        }
        self.bus.configure(config).map_err(SessionError::Bus)?;
        self.address = Some(config.own_address);
        Ok(())
    }

    /// Tear the peripheral down
    ///
    /// Fails with [`SessionError::NotInitialized`] when the bus was never
    /// brought up (or has already been closed).
    pub fn close(&mut self) -> Result<(), SessionError<BUS::Error>> {
        self.ensure_init()?;
        self.bus.shutdown();
        Ok(())
    }

    /// Whether the peripheral is up
    pub fn is_init(&self) -> bool {
        self.bus.is_configured()
    }

    /// Whether the current target acknowledges its address
    pub fn is_ready(&mut self) -> Result<bool, SessionError<BUS::Error>> {
        self.ensure_init()?;
        let addr = self.current()?;
        Ok(self.bus.probe(addr, self.timeout_ms))
    }

    /// Set the current target address
    ///
    /// Rejects addresses outside the 7-bit range.
    pub fn set_address(&mut self, address: u8) -> Result<(), SessionError<BUS::Error>> {
        if address > 0x7F {
            return Err(SessionError::InvalidAddress);
        }
        self.address = Some(address);
        Ok(())
    }

    /// The current target address, if one has been set
    pub fn address(&self) -> Option<u8> {
        self.address
    }

    /// Set the transfer timeout in milliseconds
    pub fn set_timeout(&mut self, timeout_ms: u32) {
        self.timeout_ms = timeout_ms;
    }

    /// The transfer timeout in milliseconds
    pub fn timeout(&self) -> u32 {
        self.timeout_ms
    }

    /// Set the memory-pointer width for register transfers
    pub fn set_mem_width(&mut self, width: MemAddrWidth) {
        self.mem_width = width;
    }

    /// The memory-pointer width for register transfers
    pub fn mem_width(&self) -> MemAddrWidth {
        self.mem_width
    }

    /// Write `data` to the device at `address`
    pub fn send_to(&mut self, address: u8, data: &[u8]) -> Result<(), SessionError<BUS::Error>> {
        self.ensure_ready(address)?;
        self.bus
            .write(address, data, self.timeout_ms)
            .map_err(SessionError::Bus)
    }

    /// Write `data` to the current target
    pub fn send(&mut self, data: &[u8]) -> Result<(), SessionError<BUS::Error>> {
        let address = self.current()?;
        self.send_to(address, data)
    }

    /// Read into `buf` from the device at `address`
    pub fn recv_from(
        &mut self,
        address: u8,
        buf: &mut [u8],
    ) -> Result<(), SessionError<BUS::Error>> {
        self.ensure_ready(address)?;
        self.bus
            .read(address, buf, self.timeout_ms)
            .map_err(SessionError::Bus)
    }

    /// Read into `buf` from the current target
    pub fn recv(&mut self, buf: &mut [u8]) -> Result<(), SessionError<BUS::Error>> {
        let address = self.current()?;
        self.recv_from(address, buf)
    }

    /// Probe every non-reserved 7-bit address and return the responders
    ///
    /// Requires initialization but not a stored target address.
    pub fn scan(&mut self) -> Result<Vec<u8, SCAN_CAPACITY>, SessionError<BUS::Error>> {
        self.ensure_init()?;
        let mut found = Vec::new();
        for address in SCAN_FIRST..=SCAN_LAST {
            if self.bus.probe(address, self.timeout_ms) {
                // Capacity covers the whole probed range, push cannot fail
                let _ = found.push(address);
            }
        }
        Ok(found)
    }

    /// Write `data` to in-device memory at `memaddr` on the device at `address`
    ///
    /// The pointer is encoded at the session's memory-pointer width and the
    /// pointer + data go out as a single write. At most [`MAX_MEM_DATA`]
    /// data bytes per call.
    pub fn mem_write_to(
        &mut self,
        address: u8,
        memaddr: u16,
        data: &[u8],
    ) -> Result<(), SessionError<BUS::Error>> {
        let pointer = self
            .mem_width
            .encode(memaddr)
            .ok_or(SessionError::InvalidMemAddress)?;
        if data.len() > MAX_MEM_DATA {
            return Err(SessionError::BufferOverrun);
        }
        self.ensure_ready(address)?;

        let mut frame: Vec<u8, MEM_FRAME_CAP> = Vec::new();
        frame
            .extend_from_slice(pointer.as_bytes())
            .map_err(|_| SessionError::BufferOverrun)?;
        frame
            .extend_from_slice(data)
            .map_err(|_| SessionError::BufferOverrun)?;
        self.bus
            .write(address, &frame, self.timeout_ms)
            .map_err(SessionError::Bus)
    }

    /// Write `data` to in-device memory at `memaddr` on the current target
    pub fn mem_write(&mut self, memaddr: u16, data: &[u8]) -> Result<(), SessionError<BUS::Error>> {
        let address = self.current()?;
        self.mem_write_to(address, memaddr, data)
    }

    /// Read from in-device memory at `memaddr` on the device at `address`
    ///
    /// Writes the pointer and reads back in one transaction (repeated
    /// start), filling `buf`.
    pub fn mem_read_from(
        &mut self,
        address: u8,
        memaddr: u16,
        buf: &mut [u8],
    ) -> Result<(), SessionError<BUS::Error>> {
        let pointer = self
            .mem_width
            .encode(memaddr)
            .ok_or(SessionError::InvalidMemAddress)?;
        self.ensure_ready(address)?;
        self.bus
            .write_read(address, pointer.as_bytes(), buf, self.timeout_ms)
            .map_err(SessionError::Bus)
    }

    /// Read from in-device memory at `memaddr` on the current target
    pub fn mem_read(
        &mut self,
        memaddr: u16,
        buf: &mut [u8],
    ) -> Result<(), SessionError<BUS::Error>> {
        let address = self.current()?;
        self.mem_read_from(address, memaddr, buf)
    }

    /// Direct access to the backend, for operations the session does not cover
    pub fn bus_mut(&mut self) -> &mut BUS {
        &mut self.bus
    }

    /// Consume the session and return the owned bus handle
    pub fn release(self) -> BUS {
        self.bus
    }

    fn ensure_init(&self) -> Result<(), SessionError<BUS::Error>> {
        if self.bus.is_configured() {
            Ok(())
        } else {
            Err(SessionError::NotInitialized)
        }
    }

    fn current(&self) -> Result<u8, SessionError<BUS::Error>> {
        self.address.ok_or(SessionError::AddressNotSet)
    }

    fn ensure_ready(&mut self, address: u8) -> Result<(), SessionError<BUS::Error>> {
        self.ensure_init()?;
        if address > 0x7F {
            return Err(SessionError::InvalidAddress);
        }
        if !self.bus.probe(address, self.timeout_ms) {
            return Err(SessionError::NotReady);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::vec::Vec as StdVec;

    use icebus_hal::BusMode;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum MockError {
        NotConfigured,
        Nack,
    }

    /// Mock backend: a fixed set of responding devices and a flat memory
    /// image served to reads. Records every write frame.
    struct MockBus {
        configured: bool,
        devices: StdVec<u8>,
        mem: [u8; 64],
        writes: StdVec<(u8, StdVec<u8>)>,
        last_config: Option<I2cConfig>,
    }

    impl MockBus {
        fn with_devices(devices: &[u8]) -> Self {
            let mut mem = [0u8; 64];
            for (i, byte) in mem.iter_mut().enumerate() {
                *byte = i as u8;
            }
            Self {
                configured: false,
                devices: devices.into(),
                mem,
                writes: StdVec::new(),
                last_config: None,
            }
        }

        fn check(&self, address: u8) -> Result<(), MockError> {
            if !self.configured {
                return Err(MockError::NotConfigured);
            }
            if !self.devices.contains(&address) {
                return Err(MockError::Nack);
            }
            Ok(())
        }
    }

    impl I2cBus for MockBus {
        type Error = MockError;

        fn configure(&mut self, config: &I2cConfig) -> Result<(), MockError> {
            self.configured = true;
            self.last_config = Some(*config);
            Ok(())
        }

        fn shutdown(&mut self) {
            self.configured = false;
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn write(&mut self, address: u8, data: &[u8], _timeout_ms: u32) -> Result<(), MockError> {
            self.check(address)?;
            self.writes.push((address, data.into()));
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8], _timeout_ms: u32) -> Result<(), MockError> {
            self.check(address)?;
            buf.copy_from_slice(&self.mem[..buf.len()]);
            Ok(())
        }

        fn write_read(
            &mut self,
            address: u8,
            write_data: &[u8],
            read_buf: &mut [u8],
            _timeout_ms: u32,
        ) -> Result<(), MockError> {
            self.check(address)?;
            // Interpret the written bytes as a big-endian memory pointer
            let start = match write_data {
                [lo] => *lo as usize,
                [hi, lo] => u16::from_be_bytes([*hi, *lo]) as usize,
                _ => panic!("unexpected pointer length"),
            };
            read_buf.copy_from_slice(&self.mem[start..start + read_buf.len()]);
            Ok(())
        }
    }

    fn started(devices: &[u8]) -> I2cSession<MockBus> {
        let mut session = I2cSession::new(MockBus::with_devices(devices));
        session.begin(&I2cConfig::default()).unwrap();
        session
    }

    #[test]
    fn new_session_defaults() {
        let session = I2cSession::new(MockBus::with_devices(&[]));
        assert!(!session.is_init());
        assert_eq!(session.address(), None);
        assert_eq!(session.timeout(), DEFAULT_TIMEOUT_MS);
        assert_eq!(session.mem_width(), MemAddrWidth::Bits8);
    }

    #[test]
    fn begin_configures_and_records_address() {
        let mut session = I2cSession::new(MockBus::with_devices(&[0x12]));
        session.begin(&I2cConfig::default()).unwrap();
        assert!(session.is_init());
        assert_eq!(session.address(), Some(0x12));
        let config = session.bus_mut().last_config.unwrap();
        assert_eq!(config.mode, BusMode::Master);
        assert_eq!(config.frequency, 400_000);
    }

    #[test]
    fn begin_rejects_wide_own_address() {
        let mut session = I2cSession::new(MockBus::with_devices(&[]));
        let config = I2cConfig {
            own_address: 0x80,
            ..I2cConfig::default()
        };
        assert_eq!(session.begin(&config), Err(SessionError::InvalidAddress));
        assert!(!session.is_init());
    }

    #[test]
    fn close_requires_begin() {
        let mut session = I2cSession::new(MockBus::with_devices(&[]));
        assert_eq!(session.close(), Err(SessionError::NotInitialized));

        session.begin(&I2cConfig::default()).unwrap();
        session.close().unwrap();
        assert!(!session.is_init());
        // Double close fails the same way
        assert_eq!(session.close(), Err(SessionError::NotInitialized));
    }

    #[test]
    fn send_before_begin_fails() {
        let mut session = I2cSession::new(MockBus::with_devices(&[0x50]));
        assert_eq!(
            session.send_to(0x50, &[1, 2]),
            Err(SessionError::NotInitialized)
        );
    }

    #[test]
    fn send_to_absent_device_fails() {
        let mut session = started(&[0x50]);
        assert_eq!(session.send_to(0x51, &[1]), Err(SessionError::NotReady));
    }

    #[test]
    fn send_forwards_frame() {
        let mut session = started(&[0x50]);
        session.send_to(0x50, &[0xDE, 0xAD]).unwrap();
        let (address, frame) = session.bus_mut().writes.last().unwrap().clone();
        assert_eq!(address, 0x50);
        assert_eq!(frame, [0xDE, 0xAD]);
    }

    #[test]
    fn implicit_send_requires_address() {
        let session = started(&[0x50]);
        // begin stored the own address; clear it by constructing fresh
        let mut bus = session.release();
        bus.configured = true;
        let mut session = I2cSession::new(bus);
        assert_eq!(session.send(&[1]), Err(SessionError::AddressNotSet));

        session.set_address(0x50).unwrap();
        session.send(&[1]).unwrap();
    }

    #[test]
    fn recv_fills_buffer() {
        let mut session = started(&[0x12]);
        let mut buf = [0u8; 4];
        session.recv(&mut buf).unwrap();
        // begin() targets 0x12 by default and the mock serves its memory image
        assert_eq!(buf, [0, 1, 2, 3]);
    }

    #[test]
    fn recv_from_absent_device_fails() {
        let mut session = started(&[0x12]);
        let mut buf = [0u8; 1];
        assert_eq!(
            session.recv_from(0x33, &mut buf),
            Err(SessionError::NotReady)
        );
    }

    #[test]
    fn set_address_validates_range() {
        let mut session = started(&[]);
        assert_eq!(
            session.set_address(0x80),
            Err(SessionError::InvalidAddress)
        );
        session.set_address(0x7F).unwrap();
        assert_eq!(session.address(), Some(0x7F));
    }

    #[test]
    fn is_ready_reflects_presence() {
        let mut session = started(&[0x12]);
        assert_eq!(session.is_ready(), Ok(true));
        session.set_address(0x13).unwrap();
        assert_eq!(session.is_ready(), Ok(false));
    }

    #[test]
    fn scan_reports_responders_in_range() {
        // 0x03 is reserved and must not appear even though it responds
        let mut session = started(&[0x03, 0x08, 0x50, 0x77]);
        let found = session.scan().unwrap();
        assert_eq!(found.as_slice(), &[0x08, 0x50, 0x77]);
    }

    #[test]
    fn scan_before_begin_fails() {
        let mut session = I2cSession::new(MockBus::with_devices(&[0x50]));
        assert_eq!(session.scan(), Err(SessionError::NotInitialized));
    }

    #[test]
    fn mem_write_prefixes_pointer() {
        let mut session = started(&[0x50]);
        session.mem_write_to(0x50, 0x10, &[0xAA, 0xBB]).unwrap();
        let (_, frame) = session.bus_mut().writes.last().unwrap().clone();
        assert_eq!(frame, [0x10, 0xAA, 0xBB]);
    }

    #[test]
    fn mem_write_16bit_pointer_is_big_endian() {
        let mut session = started(&[0x50]);
        session.set_mem_width(MemAddrWidth::Bits16);
        session.mem_write_to(0x50, 0x01_20, &[0xCC]).unwrap();
        let (_, frame) = session.bus_mut().writes.last().unwrap().clone();
        assert_eq!(frame, [0x01, 0x20, 0xCC]);
    }

    #[test]
    fn mem_write_rejects_wide_pointer_at_8bit() {
        let mut session = started(&[0x50]);
        assert_eq!(
            session.mem_write_to(0x50, 0x100, &[0]),
            Err(SessionError::InvalidMemAddress)
        );
        // Nothing reached the bus
        assert!(session.bus_mut().writes.is_empty());
    }

    #[test]
    fn mem_write_rejects_oversized_payload() {
        let mut session = started(&[0x50]);
        let data = [0u8; MAX_MEM_DATA + 1];
        assert_eq!(
            session.mem_write_to(0x50, 0, &data),
            Err(SessionError::BufferOverrun)
        );
    }

    #[test]
    fn mem_write_accepts_full_block() {
        let mut session = started(&[0x50]);
        let data = [0x5Au8; MAX_MEM_DATA];
        session.mem_write_to(0x50, 0x20, &data).unwrap();
        let (_, frame) = session.bus_mut().writes.last().unwrap().clone();
        assert_eq!(frame.len(), MAX_MEM_DATA + 1);
    }

    #[test]
    fn mem_read_uses_repeated_start() {
        let mut session = started(&[0x50]);
        let mut buf = [0u8; 3];
        session.mem_read_from(0x50, 0x04, &mut buf).unwrap();
        assert_eq!(buf, [4, 5, 6]);
    }

    #[test]
    fn mem_read_16bit_width() {
        let mut session = started(&[0x50]);
        session.set_mem_width(MemAddrWidth::Bits16);
        let mut buf = [0u8; 2];
        session.mem_read_from(0x50, 0x000A, &mut buf).unwrap();
        assert_eq!(buf, [10, 11]);
    }

    #[test]
    fn timeout_is_forwarded_state() {
        let mut session = started(&[]);
        session.set_timeout(250);
        assert_eq!(session.timeout(), 250);
    }

    #[test]
    fn release_returns_bus() {
        let mut session = started(&[0x50]);
        session.send_to(0x50, &[7]).unwrap();
        let bus = session.release();
        assert_eq!(bus.writes.len(), 2); // probe write + data write
    }
}
