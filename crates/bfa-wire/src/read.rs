use crate::error::WireError;

/// Width of a forward (unsigned) offset on the wire.
pub const UOFFSET_SIZE: u64 = 4;

/// Width of the signed table-to-vtable offset stored at a table's start.
pub const SOFFSET_SIZE: u64 = 4;

/// Width of a vtable field slot.
pub const VOFFSET_SIZE: u64 = 2;

/// A fixed-width little-endian value that can be read out of the buffer.
///
/// Implemented for every scalar the schema can describe. `read_le` takes
/// the value from the front of `bytes` and returns `None` when the slice is
/// too short, so no implementation can index past the end.
pub trait Scalar: Copy + Sized {
    /// Encoded width in bytes.
    const SIZE: u64;

    /// Decode `Self` from the first [`SIZE`](Self::SIZE) bytes of `bytes`.
    fn read_le(bytes: &[u8]) -> Option<Self>;
}

macro_rules! impl_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Scalar for $ty {
                const SIZE: u64 = std::mem::size_of::<$ty>() as u64;

                fn read_le(bytes: &[u8]) -> Option<Self> {
                    let raw = bytes.get(..std::mem::size_of::<$ty>())?;
                    Some(<$ty>::from_le_bytes(raw.try_into().ok()?))
                }
            }
        )+
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Bounds-checked random access over the buffer being annotated.
///
/// Every read goes through [`check_range`](Self::check_range) first, so a
/// corrupt offset surfaces as [`WireError::OutOfBounds`] carrying the
/// position it was attempted at instead of an out-of-range slice index.
///
/// The three offset encodings of the format are exposed directly:
///
/// ```text
/// ┌───────────┬────────┬────────┬─────────────────────────────────────┐
/// │ Encoding  │ Width  │ Signed │ Absolute target                     │
/// ├───────────┼────────┼────────┼─────────────────────────────────────┤
/// │ uoffset   │ 4      │ no     │ position_of_field + value           │
/// │ soffset   │ 4      │ yes    │ table_start - value                 │
/// │ voffset   │ 2      │ no     │ table_start + value (0 = absent)    │
/// └───────────┴────────┴────────┴─────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Total buffer length in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.buf.len() as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Verify that `[offset, offset + len)` lies inside the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::OutOfBounds`] if the range overflows or ends
    /// past the buffer.
    pub fn check_range(&self, offset: u64, len: u64) -> Result<(), WireError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len() => Ok(()),
            _ => Err(self.out_of_bounds(offset, len)),
        }
    }

    /// Borrow `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::OutOfBounds`] if the range is not inside the
    /// buffer.
    pub fn slice(&self, offset: u64, len: u64) -> Result<&'a [u8], WireError> {
        self.check_range(offset, len)?;
        let start = usize::try_from(offset).map_err(|_| self.out_of_bounds(offset, len))?;
        let end = usize::try_from(offset + len).map_err(|_| self.out_of_bounds(offset, len))?;
        self.buf
            .get(start..end)
            .ok_or_else(|| self.out_of_bounds(offset, len))
    }

    /// Read a little-endian scalar at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::OutOfBounds`] if `T::SIZE` bytes are not
    /// available at `offset`.
    pub fn read<T: Scalar>(&self, offset: u64) -> Result<T, WireError> {
        let bytes = self.slice(offset, T::SIZE)?;
        T::read_le(bytes).ok_or_else(|| self.out_of_bounds(offset, T::SIZE))
    }

    /// Follow the forward offset stored at `at`, returning the absolute
    /// target. The target itself is not validated; reading from it is.
    ///
    /// # Errors
    ///
    /// - [`WireError::OutOfBounds`] if the 4-byte offset cannot be read.
    /// - [`WireError::OffsetOverflow`] if `at + value` overflows.
    pub fn read_uoffset(&self, at: u64) -> Result<u64, WireError> {
        let value = self.read::<u32>(at)?;
        at.checked_add(u64::from(value))
            .ok_or(WireError::OffsetOverflow {
                offset: at,
                value: i64::from(value),
            })
    }

    /// Resolve the vtable location for the table starting at
    /// `table_start` (`table_start - soffset`).
    ///
    /// # Errors
    ///
    /// - [`WireError::OutOfBounds`] if the 4-byte offset cannot be read.
    /// - [`WireError::OffsetOverflow`] if the result falls before byte 0.
    pub fn read_soffset(&self, table_start: u64) -> Result<u64, WireError> {
        let value = self.read::<i32>(table_start)?;
        let target = i128::from(table_start) - i128::from(value);
        u64::try_from(target).map_err(|_| WireError::OffsetOverflow {
            offset: table_start,
            value: i64::from(value),
        })
    }

    /// Read a 2-byte vtable field slot at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::OutOfBounds`] if 2 bytes are not available.
    pub fn read_voffset(&self, at: u64) -> Result<u16, WireError> {
        self.read::<u16>(at)
    }

    fn out_of_bounds(&self, offset: u64, len: u64) -> WireError {
        WireError::OutOfBounds {
            offset,
            len,
            buffer_len: self.len(),
        }
    }
}
