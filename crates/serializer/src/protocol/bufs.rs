//! Owned scatter-gather buffer sequences.
//!
//! A [`WriteBufs`] is what leaves the write coordinator: a list of discontiguous [`Bytes`]
//! slices written as one logical transport write. Framing is added by pushing small buffers
//! around the body slices, so body bytes are never copied.

use bytes::{Buf, Bytes};
use std::collections::VecDeque;
use std::io::IoSlice;

/// A sequence of byte slices to be written as one logical write.
///
/// Implements [`Buf`], so transports can drain it with vectored writes. Empty slices are never
/// stored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteBufs {
    bufs: VecDeque<Bytes>,
    remaining: usize,
}

impl WriteBufs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { bufs: VecDeque::with_capacity(capacity), remaining: 0 }
    }

    /// Appends a slice at the end of the sequence.
    pub fn push(&mut self, bytes: Bytes) {
        if bytes.is_empty() {
            return;
        }
        self.remaining += bytes.len();
        self.bufs.push_back(bytes);
    }

    /// Inserts a slice in front of the sequence.
    pub fn push_front(&mut self, bytes: Bytes) {
        if bytes.is_empty() {
            return;
        }
        self.remaining += bytes.len();
        self.bufs.push_front(bytes);
    }

    /// Moves every slice of `other` to the end of this sequence.
    pub fn append(&mut self, mut other: WriteBufs) {
        self.remaining += other.remaining;
        self.bufs.append(&mut other.bufs);
    }

    /// Total number of bytes left in the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.remaining
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Number of discontiguous slices.
    #[inline]
    pub fn slice_count(&self) -> usize {
        self.bufs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bytes> {
        self.bufs.iter()
    }

    /// Copies the whole sequence into one contiguous vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.remaining);
        for bytes in &self.bufs {
            out.extend_from_slice(bytes);
        }
        out
    }
}

impl From<Bytes> for WriteBufs {
    fn from(bytes: Bytes) -> Self {
        let mut bufs = WriteBufs::with_capacity(1);
        bufs.push(bytes);
        bufs
    }
}

impl From<&'static [u8]> for WriteBufs {
    fn from(slice: &'static [u8]) -> Self {
        Bytes::from_static(slice).into()
    }
}

impl FromIterator<Bytes> for WriteBufs {
    fn from_iter<I: IntoIterator<Item = Bytes>>(iter: I) -> Self {
        let mut bufs = WriteBufs::new();
        for bytes in iter {
            bufs.push(bytes);
        }
        bufs
    }
}

impl Buf for WriteBufs {
    fn remaining(&self) -> usize {
        self.remaining
    }

    fn chunk(&self) -> &[u8] {
        self.bufs.front().map_or(&[][..], |bytes| &bytes[..])
    }

    fn chunks_vectored<'a>(&'a self, dst: &mut [IoSlice<'a>]) -> usize {
        let mut filled = 0;
        for (slot, bytes) in dst.iter_mut().zip(self.bufs.iter()) {
            *slot = IoSlice::new(bytes);
            filled += 1;
        }
        filled
    }

    fn advance(&mut self, mut cnt: usize) {
        assert!(cnt <= self.remaining, "cannot advance past the end of WriteBufs: {cnt} > {}", self.remaining);
        self.remaining -= cnt;

        while cnt > 0 {
            let Some(front) = self.bufs.front_mut() else {
                break;
            };
            if cnt < front.len() {
                front.advance(cnt);
                break;
            }
            cnt -= front.len();
            self.bufs.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slices_are_skipped() {
        let mut bufs = WriteBufs::new();
        bufs.push(Bytes::new());
        bufs.push_front(Bytes::new());
        assert!(bufs.is_empty());
        assert_eq!(bufs.slice_count(), 0);
        assert_eq!(bufs.chunk(), b"");
    }

    #[test]
    fn test_advance_across_slices() {
        let mut bufs: WriteBufs =
            [Bytes::from_static(b"abc"), Bytes::from_static(b"de"), Bytes::from_static(b"fgh")].into_iter().collect();
        assert_eq!(bufs.len(), 8);

        bufs.advance(4);
        assert_eq!(bufs.remaining(), 4);
        assert_eq!(bufs.chunk(), b"e");
        assert_eq!(bufs.to_vec(), b"efgh");

        bufs.advance(1);
        assert_eq!(bufs.chunk(), b"fgh");
        assert_eq!(bufs.slice_count(), 1);

        bufs.advance(3);
        assert!(bufs.is_empty());
    }

    #[test]
    fn test_chunks_vectored_limited_by_destination() {
        let mut bufs = WriteBufs::from(&b"head"[..]);
        bufs.append([Bytes::from_static(b"a"), Bytes::from_static(b"b")].into_iter().collect());

        let mut slices = [IoSlice::new(&[]); 2];
        let filled = bufs.chunks_vectored(&mut slices);
        assert_eq!(filled, 2);
        assert_eq!(&*slices[0], b"head");
        assert_eq!(&*slices[1], b"a");
    }

    #[test]
    fn test_push_front_prefixes() {
        let mut bufs = WriteBufs::from(&b"body"[..]);
        bufs.push_front(Bytes::from_static(b"head:"));
        assert_eq!(bufs.to_vec(), b"head:body");
    }
}
