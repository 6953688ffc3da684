//! Cursor-based canonical encoding and decoding
//!
//! Marshalling rules:
//! * all multi-byte scalars are encoded big-endian
//! * `bool` is one byte, `0x00` or `0x01`; anything else is invalid on decode
//! * `f32`/`f64` are transported by IEEE-754 bit pattern
//! * arrays are encoded element by element in increasing index order, with no
//!   separators and no length prefix

use emlink_core::Error;

mod sealed {
    pub trait Sealed {}
}

/// A scalar type with a canonical fixed-width wire encoding.
///
/// The set is closed: the 8/16/32/64-bit integers, `bool`, `f32` and `f64`.
pub trait Scalar: Copy + sealed::Sealed {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Writes the encoding into `dst`, which holds exactly [`Self::SIZE`] bytes.
    fn put(self, dst: &mut [u8]);

    /// Reads a value back from `src`, which holds exactly [`Self::SIZE`] bytes.
    fn get(src: &[u8]) -> Result<Self, Error>;
}

macro_rules! impl_int_scalar {
    ($($int:ty),* $(,)?) => {$(
        impl sealed::Sealed for $int {}

        impl Scalar for $int {
            const SIZE: usize = core::mem::size_of::<$int>();

            fn put(self, dst: &mut [u8]) {
                dst.copy_from_slice(&self.to_be_bytes());
            }

            fn get(src: &[u8]) -> Result<Self, Error> {
                let mut bytes = [0u8; core::mem::size_of::<$int>()];
                bytes.copy_from_slice(src);
                Ok(<$int>::from_be_bytes(bytes))
            }
        }
    )*};
}

impl_int_scalar!(u8, i8, u16, i16, u32, i32, u64, i64);

impl sealed::Sealed for bool {}

impl Scalar for bool {
    const SIZE: usize = 1;

    fn put(self, dst: &mut [u8]) {
        dst[0] = self as u8;
    }

    fn get(src: &[u8]) -> Result<Self, Error> {
        match src[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(Error::InvalidParameter),
        }
    }
}

impl sealed::Sealed for f32 {}

impl Scalar for f32 {
    const SIZE: usize = 4;

    fn put(self, dst: &mut [u8]) {
        self.to_bits().put(dst);
    }

    fn get(src: &[u8]) -> Result<Self, Error> {
        Ok(f32::from_bits(u32::get(src)?))
    }
}

impl sealed::Sealed for f64 {}

impl Scalar for f64 {
    const SIZE: usize = 8;

    fn put(self, dst: &mut [u8]) {
        self.to_bits().put(dst);
    }

    fn get(src: &[u8]) -> Result<Self, Error> {
        Ok(f64::from_bits(u64::get(src)?))
    }
}

/// Position-tracking encoder over a caller-supplied output slice.
///
/// A failing write leaves the cursor position and all previously written
/// bytes untouched.
pub struct Writer<'a> {
    out: &'a mut [u8],
    index: usize,
}

impl<'a> Writer<'a> {
    pub fn new(out: &'a mut [u8]) -> Self {
        Self { out, index: 0 }
    }

    pub fn bytes_written(&self) -> usize {
        self.index
    }

    pub fn write<T: Scalar>(&mut self, value: T) -> Result<(), Error> {
        let end = self.index + T::SIZE;
        if end > self.out.len() {
            return Err(Error::InvalidParameter);
        }
        value.put(&mut self.out[self.index..end]);
        self.index = end;
        Ok(())
    }

    pub fn write_array<T: Scalar>(&mut self, values: &[T]) -> Result<(), Error> {
        for &value in values {
            self.write(value)?;
        }
        Ok(())
    }
}

/// Position-tracking decoder over a caller-supplied input slice.
///
/// Reads fail on underflow; the `bool` decoding additionally fails on any
/// byte other than `0x00`/`0x01`.
pub struct Reader<'a> {
    input: &'a [u8],
    index: usize,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, index: 0 }
    }

    /// True once every input byte has been consumed.
    ///
    /// Permissive decoders ignore this; strict ones check it after the last
    /// field.
    pub fn fully_consumed(&self) -> bool {
        self.index == self.input.len()
    }

    pub fn read<T: Scalar>(&mut self) -> Result<T, Error> {
        let end = self.index + T::SIZE;
        if end > self.input.len() {
            return Err(Error::InvalidParameter);
        }
        let value = T::get(&self.input[self.index..end])?;
        self.index = end;
        Ok(value)
    }

    pub fn read_array<T: Scalar>(&mut self, out: &mut [T]) -> Result<(), Error> {
        for slot in out {
            *slot = self.read()?;
        }
        Ok(())
    }
}
