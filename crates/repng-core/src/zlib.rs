//! Streaming zlib decompression and compression
//!
//! The concatenated IDAT payloads of a PNG file form one zlib
//! stream. Both directions here run through a fixed size window
//! so memory per step stays bounded even when the compressed and
//! decompressed sizes differ by orders of magnitude.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use log::trace;

use crate::constants::ZLIB_CHUNK;
use crate::error::RecodeErrors;

/// Decompress a complete zlib stream
///
/// The stream must reach its stream end marker, a truncated
/// stream is an error rather than a short result.
pub fn inflate_all(compressed: &[u8]) -> Result<Vec<u8>, RecodeErrors>
{
    let mut inflater = Decompress::new(true);
    let mut out = Vec::new();

    let mut window = [0_u8; ZLIB_CHUNK];

    loop
    {
        let consumed = inflater.total_in() as usize;
        let produced_before = inflater.total_out();

        let status = inflater.decompress(
            &compressed[consumed..],
            &mut window,
            FlushDecompress::None
        )?;

        let produced = (inflater.total_out() - produced_before) as usize;

        out.extend_from_slice(&window[..produced]);

        match status
        {
            Status::Ok =>
            {}
            Status::StreamEnd => break,
            // no forward progress possible, the input ran out
            // before the stream end marker
            Status::BufError =>
            {
                return Err(RecodeErrors::GenericStatic(
                    "Zlib stream ended without a stream end marker, corrupt stream"
                ))
            }
        }
    }

    if (inflater.total_in() as usize) < compressed.len()
    {
        trace!(
            "{} bytes in the idat stream after the zlib stream end",
            compressed.len() - inflater.total_in() as usize
        );
    }

    trace!(
        "Inflated {} bytes to {} bytes",
        inflater.total_in(),
        inflater.total_out()
    );

    Ok(out)
}

/// Compress `raw` into a complete zlib stream at the given level
pub fn deflate_all(raw: &[u8], level: u32) -> Result<Vec<u8>, RecodeErrors>
{
    let mut deflater = Compress::new(Compression::new(level), true);
    let mut out = Vec::new();

    let mut window = [0_u8; ZLIB_CHUNK];

    loop
    {
        let consumed = deflater.total_in() as usize;
        let produced_before = deflater.total_out();

        // everything is handed to the compressor, ask it to finish
        // the stream
        let flush = if consumed == raw.len()
        {
            FlushCompress::Finish
        }
        else
        {
            FlushCompress::None
        };

        let status = deflater.compress(&raw[consumed..], &mut window, flush)?;

        let produced = (deflater.total_out() - produced_before) as usize;

        out.extend_from_slice(&window[..produced]);

        match status
        {
            Status::Ok =>
            {}
            Status::StreamEnd => break,
            Status::BufError =>
            {
                return Err(RecodeErrors::GenericStatic(
                    "Zlib compressor could not make progress, aborting"
                ))
            }
        }
    }

    trace!(
        "Deflated {} bytes to {} bytes",
        deflater.total_in(),
        deflater.total_out()
    );

    Ok(out)
}

#[test]
fn inflate_reverses_deflate()
{
    let data = b"the quick brown fox jumps over the lazy dog";

    let compressed = deflate_all(data, 6).unwrap();
    let decompressed = inflate_all(&compressed).unwrap();

    assert_eq!(decompressed, data);
}

#[test]
fn windowed_streams_survive_large_buffers()
{
    // larger than one window so both loops take more than one trip
    let mut data = vec![0_u8; ZLIB_CHUNK * 3 + 11];

    for (i, byte) in data.iter_mut().enumerate()
    {
        *byte = (i % 251) as u8;
    }

    // level 0 stores blocks, output larger than input
    for level in [0, 1, 9]
    {
        let compressed = deflate_all(&data, level).unwrap();

        assert_eq!(inflate_all(&compressed).unwrap(), data);
    }
}

#[test]
fn truncated_stream_rejected()
{
    let data = vec![7_u8; 1024];

    let compressed = deflate_all(&data, 6).unwrap();

    let cut = &compressed[..compressed.len() / 2];

    assert!(inflate_all(cut).is_err());
}

#[test]
fn empty_stream_rejected()
{
    assert!(inflate_all(&[]).is_err());
}

#[test]
fn empty_payload_roundtrips()
{
    let compressed = deflate_all(&[], 6).unwrap();

    assert_eq!(inflate_all(&compressed).unwrap(), Vec::<u8>::new());
}
