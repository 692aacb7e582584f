//! Session error taxonomy

/// Errors that can occur during session operations
///
/// `E` is the transport error of the underlying bus backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError<E> {
    /// Operation attempted before `begin` (or `close` without `begin`)
    NotInitialized,
    /// The target device did not acknowledge its address
    NotReady,
    /// A current-address convenience method was called with no address set
    AddressNotSet,
    /// Address outside the 7-bit range
    InvalidAddress,
    /// Memory pointer does not fit the configured pointer width
    InvalidMemAddress,
    /// Memory-write payload exceeds the transfer frame capacity
    BufferOverrun,
    /// Transport error from the bus backend
    Bus(E),
}
