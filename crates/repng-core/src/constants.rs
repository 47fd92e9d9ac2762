//! Shared constants for the PNG container and the zlib stream

/// The 8 byte signature every PNG file starts with, as a big endian u64
pub const PNG_SIGNATURE: u64 = 0x89504E470D0A1A0A;

/// Length of the IHDR chunk payload, always 13 bytes
pub const IHDR_LENGTH: usize = 13;

/// Bytes a chunk occupies on the wire in addition to its payload,
/// 4 length bytes, 4 name bytes and 4 CRC bytes
pub const CHUNK_OVERHEAD: usize = 12;

/// Window size used when streaming data in and out of zlib
pub const ZLIB_CHUNK: usize = 32768;

/// Default upper bound for the payload of a single emitted IDAT chunk
pub const DEFAULT_IDAT_SIZE: usize = 1 << 16;
