//! Collective operations between cooperating processes.

use crate::error::Result;

/// Broadcast/reduce contract between cooperating processes.
///
/// Every rank must call the collectives in the same order with buffers of
/// the same length. After [`reduce_sum`](ParallelRuntime::reduce_sum) only
/// the root's buffer is defined.
pub trait ParallelRuntime: Send + Sync {
    /// This process's rank in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of cooperating processes.
    fn size(&self) -> usize;

    /// Copy `root`'s buffer into every other rank's buffer.
    fn broadcast(&self, data: &mut [f64], root: usize) -> Result<()>;

    /// Elementwise sum of all ranks' buffers, stored on `root`.
    fn reduce_sum(&self, data: &mut [f64], root: usize) -> Result<()>;

    /// Whether this is rank 0.
    fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

/// Runtime for a single process; every collective is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleProcess;

impl ParallelRuntime for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn broadcast(&self, _data: &mut [f64], _root: usize) -> Result<()> {
        Ok(())
    }

    fn reduce_sum(&self, _data: &mut [f64], _root: usize) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_process_is_identity() {
        let rt = SingleProcess;
        let mut data = vec![1.0, 2.0];
        rt.broadcast(&mut data, 0).unwrap();
        rt.reduce_sum(&mut data, 0).unwrap();
        assert_eq!(data, vec![1.0, 2.0]);
        assert!(rt.is_root());
        assert_eq!(rt.size(), 1);
    }
}
