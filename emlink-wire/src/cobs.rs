//! Consistent Overhead Byte Stuffing
//!
//! COBS rewrites a byte sequence so that no `0x00` appears in the output,
//! letting a single zero byte terminate a packet on any byte-stream
//! transport. Each group starts with a code byte holding the distance to the
//! next zero (or group boundary); a code of `0xff` marks a full 254-byte
//! group with no implied zero.
//!
//! The encoded output never includes the trailing delimiter; emitting it is
//! the caller's responsibility.

use emlink_core::Error;

/// Incremental COBS encoder writing into a caller-supplied slice.
///
/// Feed input with [`push`](Encoder::push) / [`push_slice`](Encoder::push_slice),
/// then call [`finish`](Encoder::finish) to close the open group and obtain
/// the encoded length. After a push has failed the encoder state is spent;
/// discard it.
pub struct Encoder<'a> {
    out: &'a mut [u8],
    code_index: usize,
    write_index: usize,
    code: u8,
}

impl<'a> Encoder<'a> {
    pub fn new(out: &'a mut [u8]) -> Result<Self, Error> {
        if out.is_empty() {
            return Err(Error::InvalidParameter);
        }
        out[0] = 0;
        Ok(Self {
            out,
            code_index: 0,
            write_index: 1,
            code: 1,
        })
    }

    pub fn push(&mut self, byte: u8) -> Result<(), Error> {
        if byte == 0 {
            return self.open_group();
        }
        if self.write_index >= self.out.len() {
            return Err(Error::InvalidParameter);
        }
        self.out[self.write_index] = byte;
        self.write_index += 1;
        self.code += 1;
        if self.code == 0xff {
            // 254 non-zero bytes buffered: flush as if a zero had arrived,
            // without consuming an input byte.
            return self.open_group();
        }
        Ok(())
    }

    pub fn push_slice(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for &byte in bytes {
            self.push(byte)?;
        }
        Ok(())
    }

    /// Closes the open group and returns the total encoded length.
    pub fn finish(self) -> usize {
        self.out[self.code_index] = self.code;
        self.write_index
    }

    fn open_group(&mut self) -> Result<(), Error> {
        // The next group needs its own code slot.
        if self.write_index >= self.out.len() {
            return Err(Error::InvalidParameter);
        }
        self.out[self.code_index] = self.code;
        self.code_index = self.write_index;
        self.write_index += 1;
        self.code = 1;
        Ok(())
    }
}

/// Single-shot convenience around [`Encoder`].
pub fn encode(input: &[u8], out: &mut [u8]) -> Result<usize, Error> {
    let mut encoder = Encoder::new(out)?;
    encoder.push_slice(input)?;
    Ok(encoder.finish())
}

/// Decodes a COBS-encoded buffer in place and returns the decoded length.
///
/// Decoded bytes always fit before the bytes still to be read, so the buffer
/// is reused without copying to the side. Fails with
/// [`Error::CobsDecodeFailed`] on an embedded zero or on a group code that
/// claims more bytes than remain.
pub fn decode_in_place(buf: &mut [u8]) -> Result<usize, Error> {
    let mut read_index = 0;
    let mut write_index = 0;

    while read_index < buf.len() {
        let code = buf[read_index];
        read_index += 1;
        if code == 0 {
            return Err(Error::CobsDecodeFailed);
        }

        for _ in 1..code {
            if read_index >= buf.len() {
                return Err(Error::CobsDecodeFailed);
            }
            let byte = buf[read_index];
            if byte == 0 {
                return Err(Error::CobsDecodeFailed);
            }
            buf[write_index] = byte;
            write_index += 1;
            read_index += 1;
        }

        if code != 0xff && read_index < buf.len() {
            buf[write_index] = 0x00;
            write_index += 1;
        }
    }

    Ok(write_index)
}
