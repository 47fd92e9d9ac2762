//! A simple implementation of a bytestream reader
//! and writer.
//!
//! This module contains two main structs that help in
//! byte reading and byte writing.
//!
//! Useful for chunk level PNG parsing and writing, where
//! most values on the wire are big endian integers.

use core::mem::size_of;

static READ_ERROR_MSG: &str = "No more bytes";
static WRITE_ERROR_MSG: &str = "No more space";

enum Mode
{
    // Big endian
    BE,
    // Little Endian
    LE
}

/// An encapsulation of a byte stream reader
///
/// The lifetime parameter comes from the stream
/// the reader borrows from
pub struct ZByteReader<'a>
{
    /// Data stream
    stream:   &'a [u8],
    position: usize
}

impl<'a> ZByteReader<'a>
{
    /// Create a new reader for the stream
    pub const fn new(buf: &'a [u8]) -> ZByteReader<'a>
    {
        ZByteReader {
            stream:   buf,
            position: 0
        }
    }
    /// Skip `num` bytes ahead of the stream
    pub fn skip(&mut self, num: usize)
    {
        self.position = self.position.wrapping_add(num);
    }
    /// Undo a read of `num` bytes, moving the cursor back
    pub fn rewind(&mut self, num: usize)
    {
        self.position = self.position.wrapping_sub(num);
    }
    /// Return true whether or not this stream can
    /// support reading `num` more bytes
    ///
    /// # Example
    /// ```
    /// use repng_core::bytestream::ZByteReader;
    /// let data = [0;10];
    /// let stream = ZByteReader::new(&data);
    /// assert!(stream.has(5));
    /// assert!(!stream.has(100));
    /// ```
    pub const fn has(&self, num: usize) -> bool
    {
        self.position.saturating_add(num) <= self.stream.len()
    }
    /// Return the number of unread bytes in this stream
    pub const fn remaining(&self) -> usize
    {
        // Must be saturating to prevent underflow
        self.stream.len().saturating_sub(self.position)
    }
    /// Return the current position of the cursor
    pub const fn get_position(&self) -> usize
    {
        self.position
    }
    /// Look ahead `position` bytes from the cursor and return a
    /// reference to `num` bytes from that position, or an error if
    /// the peek would be out of bounds.
    ///
    /// This does not advance the cursor.
    pub fn peek_at(&self, position: usize, num: usize) -> Result<&'a [u8], &'static str>
    {
        let start = self.position.wrapping_add(position);
        let end = start.wrapping_add(num);

        match self.stream.get(start..end)
        {
            Some(bytes) => Ok(bytes),
            None => Err(READ_ERROR_MSG)
        }
    }
    /// Return a reference to the next `num` bytes of the stream,
    /// advancing the cursor past them, or an error if the stream
    /// cannot support the read
    pub fn get(&mut self, num: usize) -> Result<&'a [u8], &'static str>
    {
        match self.stream.get(self.position..self.position.wrapping_add(num))
        {
            Some(bytes) =>
            {
                self.position += num;
                Ok(bytes)
            }
            None => Err(READ_ERROR_MSG)
        }
    }
    /// Read a single byte from the stream, returning 0
    /// if the stream has no more bytes
    pub fn get_u8(&mut self) -> u8
    {
        match self.stream.get(self.position)
        {
            Some(byte) =>
            {
                self.position += 1;
                *byte
            }
            None => 0
        }
    }
    /// Read a single byte from the stream, erroring out
    /// if the stream has no more bytes
    pub fn get_u8_err(&mut self) -> Result<u8, &'static str>
    {
        match self.stream.get(self.position)
        {
            Some(byte) =>
            {
                self.position += 1;
                Ok(*byte)
            }
            None => Err(READ_ERROR_MSG)
        }
    }
}

macro_rules! get_single_type {
    ($name:tt,$name2:tt,$name3:tt,$name4:tt,$name5:tt,$name6:tt,$int_type:tt) => {
        impl<'a> ZByteReader<'a>
        {
            #[inline(always)]
            fn $name(&mut self, mode: Mode) -> $int_type
            {
                const SIZE_OF_VAL: usize = size_of::<$int_type>();

                let mut space = [0; SIZE_OF_VAL];

                match self.stream.get(self.position..self.position + SIZE_OF_VAL)
                {
                    Some(position) =>
                    {
                        space.copy_from_slice(position);
                        self.position += SIZE_OF_VAL;

                        match mode
                        {
                            Mode::LE => $int_type::from_le_bytes(space),
                            Mode::BE => $int_type::from_be_bytes(space)
                        }
                    }
                    None => 0
                }
            }

            #[inline(always)]
            fn $name2(&mut self, mode: Mode) -> Result<$int_type, &'static str>
            {
                const SIZE_OF_VAL: usize = size_of::<$int_type>();

                let mut space = [0; SIZE_OF_VAL];

                match self.stream.get(self.position..self.position + SIZE_OF_VAL)
                {
                    Some(position) =>
                    {
                        space.copy_from_slice(position);
                        self.position += SIZE_OF_VAL;

                        match mode
                        {
                            Mode::LE => Ok($int_type::from_le_bytes(space)),
                            Mode::BE => Ok($int_type::from_be_bytes(space))
                        }
                    }
                    None => Err(READ_ERROR_MSG)
                }
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            pub fn $name3(&mut self) -> Result<$int_type, &'static str>
            {
                self.$name2(Mode::BE)
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            pub fn $name4(&mut self) -> Result<$int_type, &'static str>
            {
                self.$name2(Mode::LE)
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning 0 if the underlying buffer does not have enough bytes for a ",stringify!($int_type)," read.")]
            pub fn $name5(&mut self) -> $int_type
            {
                self.$name(Mode::BE)
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning 0 if the underlying buffer does not have enough bytes for a ",stringify!($int_type)," read.")]
            pub fn $name6(&mut self) -> $int_type
            {
                self.$name(Mode::LE)
            }
        }
    };
}
get_single_type!(
    get_u16_inner_or_default,
    get_u16_inner_or_die,
    get_u16_be_err,
    get_u16_le_err,
    get_u16_be,
    get_u16_le,
    u16
);
get_single_type!(
    get_u32_inner_or_default,
    get_u32_inner_or_die,
    get_u32_be_err,
    get_u32_le_err,
    get_u32_be,
    get_u32_le,
    u32
);
get_single_type!(
    get_u64_inner_or_default,
    get_u64_inner_or_die,
    get_u64_be_err,
    get_u64_le_err,
    get_u64_be,
    get_u64_le,
    u64
);

/// Encapsulates a simple byte writer with
/// support for Endian aware writes
pub struct ZByteWriter<'a>
{
    buffer:   &'a mut [u8],
    position: usize
}

impl<'a> ZByteWriter<'a>
{
    /// Create a new writer for the stream
    pub fn new(data: &'a mut [u8]) -> ZByteWriter<'a>
    {
        ZByteWriter {
            buffer:   data,
            position: 0
        }
    }
    /// Return number of unwritten bytes in this stream
    ///
    /// # Example
    /// ```
    /// use repng_core::bytestream::ZByteWriter;
    /// let mut storage = [0;10];
    ///
    /// let writer = ZByteWriter::new(&mut storage);
    /// assert_eq!(writer.bytes_left(),10); // no bytes were written
    /// ```
    pub const fn bytes_left(&self) -> usize
    {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Return the number of bytes the writer has written
    ///
    /// ```
    /// use repng_core::bytestream::ZByteWriter;
    /// let mut stream = ZByteWriter::new(&mut []);
    /// assert_eq!(stream.position(),0);
    /// ```
    pub const fn position(&self) -> usize
    {
        self.position
    }

    /// Return true if the writer has no more space
    /// for any more writes
    pub const fn eof(&self) -> bool
    {
        self.position >= self.buffer.len()
    }

    /// Check if the byte writer can support
    /// the following write
    ///
    /// # Example
    /// ```
    /// use repng_core::bytestream::ZByteWriter;
    /// let mut data = [0;10];
    /// let mut stream = ZByteWriter::new(&mut data);
    /// assert!(stream.has(5));
    /// assert!(!stream.has(100));
    /// ```
    pub const fn has(&self, bytes: usize) -> bool
    {
        self.position.saturating_add(bytes) <= self.buffer.len()
    }

    /// Write a single byte into the bytestream or error out
    /// if there is not enough space
    ///
    /// # Example
    /// ```
    /// use repng_core::bytestream::ZByteWriter;
    /// let mut buf = [0;10];
    /// let mut stream  =  ZByteWriter::new(&mut buf);
    /// assert!(stream.write_u8_err(34).is_ok());
    /// ```
    /// No space
    /// ```
    /// use repng_core::bytestream::ZByteWriter;
    /// let mut stream = ZByteWriter::new(&mut []);
    /// assert!(stream.write_u8_err(32).is_err());
    /// ```
    ///
    pub fn write_u8_err(&mut self, byte: u8) -> Result<(), &'static str>
    {
        match self.buffer.get_mut(self.position)
        {
            Some(m_byte) =>
            {
                self.position += 1;
                *m_byte = byte;

                Ok(())
            }
            None => Err(WRITE_ERROR_MSG)
        }
    }

    /// Write a single byte in the stream or don't write
    /// anything if the buffer is full and cannot support the byte read
    ///
    /// Should be combined with [`has`](Self::has)
    pub fn write_u8(&mut self, byte: u8)
    {
        if let Some(m_byte) = self.buffer.get_mut(self.position)
        {
            self.position += 1;
            *m_byte = byte;
        }
    }

    /// Write all bytes from `data` into the stream, erroring
    /// out if the stream does not have enough space for them
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), &'static str>
    {
        match self
            .buffer
            .get_mut(self.position..self.position.wrapping_add(data.len()))
        {
            Some(bytes) =>
            {
                self.position += data.len();
                bytes.copy_from_slice(data);

                Ok(())
            }
            None => Err(WRITE_ERROR_MSG)
        }
    }
}

macro_rules! write_single_type {
    ($name:tt,$name2:tt,$name3:tt,$name4:tt,$name5:tt,$name6:tt,$int_type:tt) => {
        impl<'a> ZByteWriter<'a>
        {
            #[inline(always)]
            fn $name(&mut self, byte: $int_type, mode: Mode) -> Result<(), &'static str>
            {
                const SIZE: usize = size_of::<$int_type>();

                match self.buffer.get_mut(self.position..self.position + SIZE)
                {
                    Some(m_byte) =>
                    {
                        self.position += SIZE;
                        // get bits, depending on mode.
                        // This should be inlined and not visible in
                        // the generated binary since mode is a compile
                        // time constant.
                        let bytes = match mode
                        {
                            Mode::BE => byte.to_be_bytes(),
                            Mode::LE => byte.to_le_bytes()
                        };

                        m_byte.copy_from_slice(&bytes);

                        Ok(())
                    }
                    None => Err(WRITE_ERROR_MSG)
                }
            }
            #[inline(always)]
            fn $name2(&mut self, byte: $int_type, mode: Mode)
            {
                const SIZE: usize = size_of::<$int_type>();

                if let Some(m_byte) = self.buffer.get_mut(self.position..self.position + SIZE)
                {
                    self.position += SIZE;

                    let bytes = match mode
                    {
                        Mode::BE => byte.to_be_bytes(),
                        Mode::LE => byte.to_le_bytes()
                    };

                    m_byte.copy_from_slice(&bytes);
                }
            }

            #[doc=concat!("Write ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," write.")]
            pub fn $name3(&mut self, byte: $int_type) -> Result<(), &'static str>
            {
                self.$name(byte, Mode::BE)
            }

            #[doc=concat!("Write ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," write.")]
            pub fn $name4(&mut self, byte: $int_type) -> Result<(), &'static str>
            {
                self.$name(byte, Mode::LE)
            }

            #[doc=concat!("Write ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Or don't write anything if the writer cannot support a ",stringify!($int_type)," write.")]
            #[doc=concat!("\nShould be combined with the [`has`](Self::has) method to ensure a write succeeds")]
            pub fn $name5(&mut self, byte: $int_type)
            {
                self.$name2(byte, Mode::BE)
            }

            #[doc=concat!("Write ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Or don't write anything if the writer cannot support a ",stringify!($int_type)," write.")]
            #[doc=concat!("\nShould be combined with the [`has`](Self::has) method to ensure a write succeeds")]
            pub fn $name6(&mut self, byte: $int_type)
            {
                self.$name2(byte, Mode::LE)
            }
        }
    };
}

write_single_type!(
    write_u64_inner_or_die,
    write_u64_inner_or_none,
    write_u64_be_err,
    write_u64_le_err,
    write_u64_be,
    write_u64_le,
    u64
);

write_single_type!(
    write_u32_inner_or_die,
    write_u32_inner_or_none,
    write_u32_be_err,
    write_u32_le_err,
    write_u32_be,
    write_u32_le,
    u32
);

write_single_type!(
    write_u16_inner_or_die,
    write_u16_inner_or_none,
    write_u16_be_err,
    write_u16_le_err,
    write_u16_be,
    write_u16_le,
    u16
);

#[test]
fn reader_reads_integers_across_the_stream()
{
    let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0xFF];
    let mut stream = ZByteReader::new(&data);

    assert_eq!(stream.get_u64_be_err(), Ok(0x89504E470D0A1A0A));
    assert_eq!(stream.get_u8(), 0xFF);
    // drained, the soft read returns a default
    assert_eq!(stream.get_u8(), 0);
    assert!(stream.get_u32_be_err().is_err());

    assert_eq!(ZByteReader::new(&[0x01, 0x00]).get_u16_le(), 1);
}

#[test]
fn peek_does_not_advance_the_cursor()
{
    let data = [1_u8, 2, 3, 4, 5];
    let mut stream = ZByteReader::new(&data);

    stream.skip(1);

    assert_eq!(stream.peek_at(1, 2), Ok(&[3_u8, 4][..]));
    assert_eq!(stream.get_position(), 1);
    assert!(stream.peek_at(4, 2).is_err());
}

#[test]
fn rewind_undoes_a_read()
{
    let data = [0_u8, 0, 0, 9];
    let mut stream = ZByteReader::new(&data);

    assert_eq!(stream.get_u32_be(), 9);

    stream.rewind(4);

    assert_eq!(stream.remaining(), 4);
    assert_eq!(stream.get_u32_be(), 9);
}

#[test]
fn writer_rejects_writes_past_the_end()
{
    let mut buf = [0_u8; 6];

    {
        let mut stream = ZByteWriter::new(&mut buf);

        assert!(stream.write_u32_be_err(0xCAFE_BABE).is_ok());
        // only two bytes left, a four byte write cannot fit
        assert!(stream.write_u32_be_err(0xDEAD).is_err());
        assert!(stream.write_u16_be_err(0xBEEF).is_ok());
        assert!(stream.eof());
    }

    assert_eq!(buf, [0xCA, 0xFE, 0xBA, 0xBE, 0xBE, 0xEF]);
}
