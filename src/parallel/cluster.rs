//! In-process cluster: one thread per rank.
//!
//! [`LocalCluster`] gives the multi-process code paths a real collective
//! implementation without an external message-passing library. Ranks meet at
//! a shared barrier; each rank publishes its buffer in its own slot and
//! reads the others' after the barrier.

use std::sync::{Arc, Barrier};

use parking_lot::Mutex;

use crate::error::{Result, RexiError};

use super::runtime::ParallelRuntime;

struct Shared {
    size: usize,
    barrier: Barrier,
    slots: Vec<Mutex<Vec<f64>>>,
}

fn length_mismatch(expected: usize, actual: usize) -> RexiError {
    RexiError::dimension_mismatch(
        format!("message of {expected} values"),
        format!("{actual} values"),
    )
}

/// Factory for a set of connected [`ClusterRank`]s.
pub struct LocalCluster;

impl LocalCluster {
    /// Create `size` connected ranks.
    ///
    /// Every collective must be entered by all ranks, so each rank has to run
    /// on its own thread.
    pub fn new(size: usize) -> Result<Vec<ClusterRank>> {
        if size == 0 {
            return Err(RexiError::configuration("cluster size must be at least 1"));
        }
        let shared = Arc::new(Shared {
            size,
            barrier: Barrier::new(size),
            slots: (0..size).map(|_| Mutex::new(Vec::new())).collect(),
        });
        Ok((0..size)
            .map(|rank| ClusterRank {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect())
    }

    /// Run `f` on every rank of a fresh cluster, one scoped thread each,
    /// and collect the results in rank order.
    pub fn run<T, F>(size: usize, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(ClusterRank) -> T + Sync,
    {
        let ranks = Self::new(size)?;
        let f = &f;
        std::thread::scope(|scope| {
            let handles: Vec<_> = ranks
                .into_iter()
                .map(|rank| scope.spawn(move || f(rank)))
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(r, h)| {
                    h.join()
                        .map_err(|_| RexiError::Collective(format!("rank {r} panicked")))
                })
                .collect()
        })
    }
}

/// One rank of a [`LocalCluster`].
#[derive(Clone)]
pub struct ClusterRank {
    rank: usize,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ClusterRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterRank")
            .field("rank", &self.rank)
            .field("size", &self.shared.size)
            .finish()
    }
}

impl ClusterRank {
    fn check_root(&self, root: usize) -> Result<()> {
        if root >= self.shared.size {
            return Err(RexiError::Collective(format!(
                "root {root} outside cluster of {}",
                self.shared.size
            )));
        }
        Ok(())
    }
}

impl ParallelRuntime for ClusterRank {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn broadcast(&self, data: &mut [f64], root: usize) -> Result<()> {
        self.check_root(root)?;
        if self.rank == root {
            let mut slot = self.shared.slots[root].lock();
            slot.clear();
            slot.extend_from_slice(data);
        }
        self.shared.barrier.wait();

        let mut outcome = Ok(());
        if self.rank != root {
            let slot = self.shared.slots[root].lock();
            if slot.len() == data.len() {
                data.copy_from_slice(&slot);
            } else {
                outcome = Err(length_mismatch(data.len(), slot.len()));
            }
        }
        // Root may not overwrite its slot until everyone has read it.
        self.shared.barrier.wait();
        outcome
    }

    fn reduce_sum(&self, data: &mut [f64], root: usize) -> Result<()> {
        self.check_root(root)?;
        {
            let mut slot = self.shared.slots[self.rank].lock();
            slot.clear();
            slot.extend_from_slice(data);
        }
        self.shared.barrier.wait();

        let mut outcome = Ok(());
        if self.rank == root {
            data.iter_mut().for_each(|v| *v = 0.0);
            // Fixed rank order keeps the sum reproducible.
            for slot in &self.shared.slots {
                let slot = slot.lock();
                if slot.len() != data.len() {
                    outcome = Err(length_mismatch(data.len(), slot.len()));
                    break;
                }
                for (acc, v) in data.iter_mut().zip(slot.iter()) {
                    *acc += v;
                }
            }
        }
        self.shared.barrier.wait();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_from_root() {
        let results = LocalCluster::run(3, |rank| {
            let mut data = vec![rank.rank() as f64; 4];
            rank.broadcast(&mut data, 1).unwrap();
            data
        })
        .unwrap();
        for data in results {
            assert_eq!(data, vec![1.0; 4]);
        }
    }

    #[test]
    fn test_reduce_sum_on_root() {
        let results = LocalCluster::run(4, |rank| {
            let mut data = vec![1.0, rank.rank() as f64];
            rank.reduce_sum(&mut data, 0).unwrap();
            data
        })
        .unwrap();
        assert_eq!(results[0], vec![4.0, 6.0]);
    }

    #[test]
    fn test_repeated_collectives_stay_in_lockstep() {
        let results = LocalCluster::run(2, |rank| {
            let mut total = 0.0;
            for step in 0..10 {
                let mut data = vec![step as f64 + rank.rank() as f64];
                rank.reduce_sum(&mut data, 0).unwrap();
                rank.broadcast(&mut data, 0).unwrap();
                total += data[0];
            }
            total
        })
        .unwrap();
        // Σ (2·step + 1) for step in 0..10
        assert_eq!(results, vec![100.0, 100.0]);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(LocalCluster::new(0).is_err());
    }
}
