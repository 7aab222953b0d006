//! Point-to-point exchange for time-parallel coupling.
//!
//! Only the contract lives here. No runtime in this crate implements it; a
//! parallel-in-time driver supplies its own transport.

use crate::error::Result;

/// Blocking point-to-point transfer of flat `f64` buffers.
pub trait StateExchange {
    /// Send `data` to rank `dest` with a message tag.
    fn send(&self, data: &[f64], dest: usize, tag: u32) -> Result<()>;

    /// Receive into `data` from rank `src`; blocks until a message with the
    /// tag arrives. The message length must match `data.len()`.
    fn recv(&self, data: &mut [f64], src: usize, tag: u32) -> Result<()>;
}
