//! Static partitioning of REXI terms over global workers.
//!
//! With `G = threads_per_process × num_processes` workers and `N` terms,
//! every worker gets a contiguous block of `ceil(N / G)` terms; trailing
//! workers may get a short or empty block.

/// Half-open range `[start, end)` of term indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PartitionRange {
    pub start: usize,
    pub end: usize,
}

impl PartitionRange {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Number of terms in the range.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Range as a `std::ops::Range` for slicing.
    #[inline]
    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Maps global worker ids to term ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkPartitioner {
    threads_per_process: usize,
    num_processes: usize,
}

impl WorkPartitioner {
    /// # Panics
    ///
    /// Panics if either count is zero.
    pub fn new(threads_per_process: usize, num_processes: usize) -> Self {
        assert!(threads_per_process > 0, "threads_per_process must be positive");
        assert!(num_processes > 0, "num_processes must be positive");
        Self {
            threads_per_process,
            num_processes,
        }
    }

    /// Total number of workers G.
    #[inline]
    pub fn num_workers(&self) -> usize {
        self.threads_per_process * self.num_processes
    }

    /// Global id of thread `thread` on process `rank`.
    #[inline]
    pub fn global_id(&self, rank: usize, thread: usize) -> usize {
        thread + self.threads_per_process * rank
    }

    /// Terms per worker, `ceil(N / G)`.
    #[inline]
    pub fn block_size(&self, n: usize) -> usize {
        n.div_ceil(self.num_workers())
    }

    /// Term range owned by a global worker.
    pub fn partition_for(&self, global_worker_id: usize, n: usize) -> PartitionRange {
        let block = self.block_size(n);
        let start = (block * global_worker_id).min(n);
        let end = (block * (global_worker_id + 1)).min(n);
        PartitionRange::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_even_split() {
        let p = WorkPartitioner::new(2, 2);
        assert_eq!(p.block_size(8), 2);
        assert_eq!(p.partition_for(0, 8), PartitionRange::new(0, 2));
        assert_eq!(p.partition_for(3, 8), PartitionRange::new(6, 8));
    }

    #[test]
    fn test_more_workers_than_terms() {
        let p = WorkPartitioner::new(4, 1);
        assert_eq!(p.partition_for(0, 3), PartitionRange::new(0, 1));
        assert_eq!(p.partition_for(2, 3), PartitionRange::new(2, 3));
        assert!(p.partition_for(3, 3).is_empty());
    }

    #[test]
    fn test_global_id_layout() {
        let p = WorkPartitioner::new(3, 2);
        assert_eq!(p.global_id(0, 2), 2);
        assert_eq!(p.global_id(1, 0), 3);
        assert_eq!(p.global_id(1, 2), 5);
    }

    proptest! {
        #[test]
        fn prop_partitions_cover_exactly_once(
            n in 1usize..5000,
            threads in 1usize..17,
            procs in 1usize..9,
        ) {
            let p = WorkPartitioner::new(threads, procs);
            let mut next = 0;
            for rank in 0..procs {
                for t in 0..threads {
                    let r = p.partition_for(p.global_id(rank, t), n);
                    prop_assert!(r.start <= r.end);
                    if !r.is_empty() {
                        prop_assert_eq!(r.start, next);
                        next = r.end;
                    }
                }
            }
            prop_assert_eq!(next, n);
        }
    }
}
