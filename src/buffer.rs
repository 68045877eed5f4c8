use std::fmt;
use std::io;
use std::ops::Deref;

/// An owned byte buffer that can be lent to an I/O submission
///
/// The buffer tracks the number of filled bytes separately from its
/// capacity: a recv submission fills `writable()` and the completion
/// handler commits the received length with `advance()`. Capacity never
/// changes behind the caller's back; growth is an explicit `grow()` so the
/// connection state machines can enforce their configured limits.
///
/// While a submission is outstanding the buffer is moved into it and the
/// owning connection keeps `None` in its place, so the no-mutation
/// invariant is a move, not a runtime check.
pub struct IoBuf {
    data: Box<[u8]>,
    len: usize,
}

impl IoBuf {
    /// Create a buffer with the given fixed capacity
    pub fn with_capacity(cap: usize) -> IoBuf {
        IoBuf {
            data: vec![0; cap].into_boxed_slice(),
            len: 0,
        }
    }

    /// Number of filled bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no bytes are filled
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// True if there is no room left to receive into
    pub fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// The unfilled tail, to be passed to a recv submission
    pub fn writable(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut self.data[len..]
    }

    /// Commit `n` bytes a completion reported received into `writable()`
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the remaining capacity; a reactor reporting
    /// more bytes than the submitted range is a contract violation.
    pub fn advance(&mut self, n: usize) {
        assert!(self.len + n <= self.data.len());
        self.len += n;
    }

    /// Discard the first `n` filled bytes, compacting the remainder
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// Drop all filled bytes, keeping the allocation
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Cut the filled bytes back to `len`
    pub fn truncate(&mut self, len: usize) {
        assert!(len <= self.len);
        self.len = len;
    }

    /// Reallocate to `new_cap`, preserving the filled bytes
    ///
    /// # Panics
    ///
    /// Panics when shrinking below the filled length.
    pub fn grow(&mut self, new_cap: usize) {
        assert!(new_cap >= self.len);
        let mut data = vec![0; new_cap].into_boxed_slice();
        data[..self.len].copy_from_slice(&self.data[..self.len]);
        self.data = data;
    }

    /// Append bytes, growing the allocation if they do not fit
    pub fn extend(&mut self, bytes: &[u8]) {
        if self.len + bytes.len() > self.data.len() {
            let cap = (self.len + bytes.len()).next_power_of_two();
            self.grow(cap);
        }
        self.data[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
    }
}

impl Deref for IoBuf {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl io::Write for IoBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for IoBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "IoBuf[{}/{}]", self.len, self.data.len())
    }
}
