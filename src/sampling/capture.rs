use crate::signal_processing::Filter;

/// Outcome of a push into a [`CaptureBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    /// Stored, room remains
    Stored,
    /// Stored, and this sample filled the buffer
    Sealed,
    /// Buffer was already sealed; nothing changed
    Rejected,
}

/// One exported capture row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRecord {
    pub index: usize,
    pub raw: f32,
    pub filtered: f32,
}

/// Fixed-capacity paired (raw, filtered) capture
///
/// Filled one sample at a time, sealed at capacity (or by [`seal`](Self::seal))
/// and read-only until [`reset`](Self::reset). Pushing into a sealed buffer is a
/// no-op reported through [`PushStatus::Rejected`].
#[derive(Debug, Clone)]
pub struct CaptureBuffer {
    raw: Vec<f32>,
    filtered: Vec<f32>,
    capacity: usize,
    sealed: bool,
    pending: bool,
    is_filtered: bool,
}

impl CaptureBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            raw: Vec::with_capacity(capacity),
            filtered: Vec::with_capacity(capacity),
            capacity,
            sealed: false,
            pending: false,
            is_filtered: false,
        }
    }

    /// Store a (raw, filtered) pair
    pub fn push(&mut self, raw: f32, filtered: f32) -> PushStatus {
        let status = self.store(raw, filtered);
        if status != PushStatus::Rejected {
            self.is_filtered = true;
        }
        status
    }

    /// Store a raw sample only; the filtered column is filled later by
    /// [`apply_filter`](Self::apply_filter)
    pub fn push_raw(&mut self, raw: f32) -> PushStatus {
        let status = self.store(raw, 0.0);
        if status != PushStatus::Rejected {
            self.is_filtered = false;
        }
        status
    }

    fn store(&mut self, raw: f32, filtered: f32) -> PushStatus {
        if self.sealed {
            return PushStatus::Rejected;
        }
        self.raw.push(raw);
        self.filtered.push(filtered);
        self.pending = true;

        if self.raw.len() == self.capacity {
            self.sealed = true;
            log::debug!("Capture sealed at {} samples", self.capacity);
            PushStatus::Sealed
        } else {
            PushStatus::Stored
        }
    }

    /// Stop the capture early; the stored samples stay readable
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Run every committed raw sample through `filter`, oldest first
    pub fn apply_filter<F: Filter + ?Sized>(&mut self, filter: &mut F) {
        for (raw, out) in self.raw.iter().zip(self.filtered.iter_mut()) {
            *out = filter.process(*raw);
        }
        self.is_filtered = true;
    }

    /// Rows in index order, without touching any flag
    pub fn records(&self) -> impl Iterator<Item = CaptureRecord> + '_ {
        self.raw
            .iter()
            .zip(self.filtered.iter())
            .enumerate()
            .map(|(index, (&raw, &filtered))| CaptureRecord {
                index,
                raw,
                filtered,
            })
    }

    /// Rows in index order; marks the data consumed but keeps it until `reset`
    pub fn drain(&mut self) -> impl Iterator<Item = CaptureRecord> + '_ {
        self.pending = false;
        self.records()
    }

    pub fn reset(&mut self) {
        self.raw.clear();
        self.filtered.clear();
        self.sealed = false;
        self.pending = false;
        self.is_filtered = false;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    pub fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn raw(&self) -> &[f32] {
        &self.raw
    }

    pub fn filtered(&self) -> &[f32] {
        &self.filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal_processing::FirFilterCore;

    #[test]
    fn test_seals_at_capacity() {
        let mut buf = CaptureBuffer::new(3);
        assert_eq!(buf.push(1.0, 10.0), PushStatus::Stored);
        assert_eq!(buf.push(2.0, 20.0), PushStatus::Stored);
        assert!(!buf.is_sealed());
        assert_eq!(buf.push(3.0, 30.0), PushStatus::Sealed);
        assert!(buf.is_sealed());
        assert_eq!(buf.push(4.0, 40.0), PushStatus::Rejected);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_overfill_matches_exact_fill() {
        let mut exact = CaptureBuffer::new(4);
        let mut over = CaptureBuffer::new(4);
        for i in 0..4 {
            exact.push(i as f32, 0.0);
        }
        for i in 0..12 {
            over.push(i as f32, 0.0);
        }
        assert_eq!(exact.is_sealed(), over.is_sealed());
        assert_eq!(exact.raw(), over.raw());
        assert_eq!(exact.records().collect::<Vec<_>>(), over.records().collect::<Vec<_>>());
    }

    #[test]
    fn test_drain_reset_drain_is_empty() {
        let mut buf = CaptureBuffer::new(2);
        buf.push(1.0, 2.0);
        buf.push(3.0, 4.0);
        assert!(buf.has_pending());

        let rows: Vec<_> = buf.drain().collect();
        assert_eq!(
            rows,
            vec![
                CaptureRecord {
                    index: 0,
                    raw: 1.0,
                    filtered: 2.0,
                },
                CaptureRecord {
                    index: 1,
                    raw: 3.0,
                    filtered: 4.0,
                },
            ]
        );
        assert!(!buf.has_pending());
        // drain is not destructive
        assert_eq!(buf.records().count(), 2);

        buf.reset();
        assert_eq!(buf.drain().count(), 0);
        assert!(!buf.is_sealed());
        assert_eq!(buf.push(9.0, 9.0), PushStatus::Stored);
    }

    #[test]
    fn test_push_raw_then_filter() {
        let mut buf = CaptureBuffer::new(3);
        for x in [4.0, 0.0, 0.0] {
            buf.push_raw(x);
        }
        assert!(buf.is_sealed());
        assert!(!buf.is_filtered());

        let mut fir = FirFilterCore::new(vec![0.25, 0.5, 0.25]).unwrap();
        buf.apply_filter(&mut fir);
        assert!(buf.is_filtered());
        assert_eq!(buf.filtered(), &[1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_manual_seal() {
        let mut buf = CaptureBuffer::new(100);
        buf.push(1.0, 1.0);
        buf.seal();
        assert_eq!(buf.push(2.0, 2.0), PushStatus::Rejected);
        assert_eq!(buf.len(), 1);
    }
}
