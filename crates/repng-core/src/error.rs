//! Errors possible when re-encoding a PNG file

use std::fmt::{Debug, Formatter};

pub enum RecodeErrors
{
    BadSignature,
    GenericStatic(&'static str),
    Generic(String),
    /// CRC stored in a chunk does not match the one
    /// calculated over its contents, (expected, found)
    BadCrc(u32, u32),
    BadHeader(String),
    /// Filter byte of a scanline is not one of the five
    /// standard filters
    UnknownFilter(u8),
    InflateErrors(flate2::DecompressError),
    DeflateErrors(flate2::CompressError)
}

impl Debug for RecodeErrors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::BadSignature => writeln!(f, "Bad PNG signature, not a png"),
            Self::GenericStatic(val) => writeln!(f, "{val:?}"),
            Self::Generic(val) => writeln!(f, "{val:?}"),
            Self::BadCrc(expected, found) => writeln!(
                f,
                "CRC does not match, expected {expected} but found {found}",
            ),
            Self::BadHeader(val) =>
            {
                writeln!(f, "Bad header: {val}")
            }
            Self::UnknownFilter(filter) =>
            {
                writeln!(f, "Unknown filter {filter}, not a standard PNG filter")
            }
            Self::InflateErrors(err) =>
            {
                writeln!(f, "Error decompressing idat chunks {err:?}")
            }
            Self::DeflateErrors(err) =>
            {
                writeln!(f, "Error compressing idat chunks {err:?}")
            }
        }
    }
}

impl From<&'static str> for RecodeErrors
{
    fn from(val: &'static str) -> Self
    {
        Self::GenericStatic(val)
    }
}

impl From<String> for RecodeErrors
{
    fn from(val: String) -> Self
    {
        Self::Generic(val)
    }
}

impl From<flate2::DecompressError> for RecodeErrors
{
    fn from(val: flate2::DecompressError) -> Self
    {
        Self::InflateErrors(val)
    }
}

impl From<flate2::CompressError> for RecodeErrors
{
    fn from(val: flate2::CompressError) -> Self
    {
        Self::DeflateErrors(val)
    }
}
