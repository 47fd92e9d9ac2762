//! Chunk level access to the PNG container
//!
//! A PNG file is an 8 byte signature followed by a list of
//! chunks, each carrying a length, a 4 byte name, a payload and a
//! CRC over the name and payload. This module parses that list
//! into a [`ChunkChain`], allows replacing the IDAT run inside it
//! and serializes the result back to the wire.
//!
//! Stored CRCs are confirmed at parse time and recalculated at
//! write time, a chunk whose payload was never touched writes
//! back byte for byte identical.

use log::{trace, warn};

use crate::bytestream::{ZByteReader, ZByteWriter};
use crate::constants::{CHUNK_OVERHEAD, PNG_SIGNATURE};
use crate::crc::{calc_crc, calc_crc_with_bytes};
use crate::enums::PngChunkType;
use crate::error::RecodeErrors;
use crate::options::RecodeOptions;

/// A single chunk lifted off the wire
///
/// The stored CRC is dropped at parse time, serializing the chunk
/// recalculates it over the name and the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngChunk
{
    pub name:       [u8; 4],
    pub chunk_type: PngChunkType,
    pub data:       Vec<u8>
}

/// Every chunk of a PNG file, in file order
///
/// The chain owns its chunk payloads, the input buffer can be
/// dropped once parsing returns.
#[derive(Debug, Default, Clone)]
pub struct ChunkChain
{
    chunks: Vec<PngChunk>
}

impl ChunkChain
{
    /// Parse a complete PNG file into its chunks
    ///
    /// The signature is confirmed, the first chunk must be IHDR
    /// and parsing stops at the first IEND chunk. Bytes after
    /// IEND are ignored.
    pub fn parse(data: &[u8], options: &RecodeOptions) -> Result<ChunkChain, RecodeErrors>
    {
        let mut stream = ZByteReader::new(data);

        let signature = stream.get_u64_be_err()?;

        if signature != PNG_SIGNATURE
        {
            return Err(RecodeErrors::BadSignature);
        }

        // check if first chunk is ihdr here
        if stream.peek_at(4, 4)? != b"IHDR"
        {
            return Err(RecodeErrors::GenericStatic(
                "First chunk not IHDR, Corrupt PNG"
            ));
        }

        let mut chunks = Vec::new();
        let mut seen_hdr = false;

        loop
        {
            let chunk = Self::read_chunk(&mut stream, options)?;

            trace!(
                "Read chunk {}, length {}",
                std::str::from_utf8(&chunk.name).unwrap_or("XXXX"),
                chunk.data.len()
            );

            if chunk.chunk_type == PngChunkType::IHDR
            {
                if seen_hdr
                {
                    return Err(RecodeErrors::GenericStatic("Multiple IHDR, corrupt PNG"));
                }
                seen_hdr = true;
            }

            let last = chunk.chunk_type == PngChunkType::IEND;

            if last && !chunk.data.is_empty()
            {
                // carried through untouched, but nothing should be in there
                warn!("IEND chunk carries {} bytes of data", chunk.data.len());
            }

            chunks.push(chunk);

            if last
            {
                break;
            }
        }

        if stream.remaining() > 0
        {
            trace!("Ignoring {} bytes after IEND", stream.remaining());
        }

        Ok(ChunkChain { chunks })
    }

    /// Build a chain directly from chunks, for callers doing
    /// their own chunk surgery
    pub fn from_chunks(chunks: Vec<PngChunk>) -> ChunkChain
    {
        ChunkChain { chunks }
    }

    /// The parsed chunks, in file order
    pub fn chunks(&self) -> &[PngChunk]
    {
        &self.chunks
    }

    fn read_chunk(
        stream: &mut ZByteReader, options: &RecodeOptions
    ) -> Result<PngChunk, RecodeErrors>
    {
        // Format is length - chunk name - [data] - crc
        let chunk_length = stream.get_u32_be_err()? as usize;
        let name = stream.get_u32_be_err()?.to_be_bytes();

        let chunk_type = match &name
        {
            b"IHDR" => PngChunkType::IHDR,
            b"PLTE" => PngChunkType::PLTE,
            b"IDAT" => PngChunkType::IDAT,
            b"IEND" => PngChunkType::IEND,

            _ => PngChunkType::unkn
        };

        if !stream.has(chunk_length + 4 /*crc stream*/)
        {
            let err = format!(
                "Not enough bytes for chunk {:?}, bytes requested are {}, but bytes present are {}",
                chunk_type,
                chunk_length + 4,
                stream.remaining()
            );

            return Err(RecodeErrors::Generic(err));
        }

        // An unknown critical chunk may depend on the pixel layout,
        // carrying it blindly across a re-encode is not safe
        if chunk_type == PngChunkType::unkn && name[0] & (1 << 5) == 0
        {
            let chunk_name = std::str::from_utf8(&name).unwrap_or("XXXX");

            return Err(RecodeErrors::Generic(format!(
                "Marker {chunk_name} unknown but deemed necessary"
            )));
        }

        let mut crc_bytes = [0; 4];

        let crc_ref = stream.peek_at(chunk_length, 4)?;

        crc_bytes.copy_from_slice(crc_ref);

        let crc = u32::from_be_bytes(crc_bytes);

        // Confirm the CRC here.
        if options.get_confirm_crc()
        {
            // go back and point to the chunk name, the stored
            // CRC covers the name and the data together
            stream.rewind(4);

            let bytes = stream.peek_at(0, chunk_length + 4)?;

            let calc = calc_crc(bytes);

            if crc != calc
            {
                return Err(RecodeErrors::BadCrc(crc, calc));
            }
            // go point after the chunk name again
            stream.skip(4);
        }

        let data = stream.get(chunk_length)?.to_vec();

        // skip crc, it was already read
        stream.skip(4);

        Ok(PngChunk {
            name,
            chunk_type,
            data
        })
    }

    /// Find the consecutive run of IDAT chunks and concatenate
    /// their payloads into one compressed stream
    ///
    /// Returns the index of the first IDAT chunk along with the
    /// compressed bytes. A zero length IDAT inside the run is
    /// stepped over, only a chunk of another type ends the run.
    pub fn gather_idat(&self) -> Result<(usize, Vec<u8>), RecodeErrors>
    {
        let start = self
            .chunks
            .iter()
            .position(|chunk| chunk.chunk_type == PngChunkType::IDAT)
            .ok_or(RecodeErrors::GenericStatic(
                "Image does not contain any IDAT chunk"
            ))?;

        let mut compressed = Vec::new();

        for chunk in &self.chunks[start..]
        {
            if chunk.chunk_type != PngChunkType::IDAT
            {
                break;
            }
            compressed.extend_from_slice(&chunk.data);
        }

        Ok((start, compressed))
    }

    /// Replace the consecutive run of IDAT chunks with `new_idat`,
    /// leaving every chunk before and after the run untouched
    pub fn splice_idat(&mut self, new_idat: Vec<PngChunk>) -> Result<(), RecodeErrors>
    {
        let start = self
            .chunks
            .iter()
            .position(|chunk| chunk.chunk_type == PngChunkType::IDAT)
            .ok_or(RecodeErrors::GenericStatic(
                "Image does not contain any IDAT chunk"
            ))?;

        let count = self.chunks[start..]
            .iter()
            .take_while(|chunk| chunk.chunk_type == PngChunkType::IDAT)
            .count();

        self.chunks.splice(start..start + count, new_idat);

        Ok(())
    }

    /// Number of bytes the chain occupies when written back out,
    /// the signature plus every chunk with its overhead
    pub fn total_size(&self) -> usize
    {
        let chunks_len: usize = self
            .chunks
            .iter()
            .map(|chunk| chunk.data.len() + CHUNK_OVERHEAD)
            .sum();

        // 8 byte signature
        8 + chunks_len
    }

    /// Serialize the chain back to the PNG wire format
    ///
    /// The CRC of every chunk is recalculated over its name and
    /// data while writing.
    pub fn flatten(&self) -> Result<Vec<u8>, RecodeErrors>
    {
        let mut out = vec![0_u8; self.total_size()];

        {
            let mut stream = ZByteWriter::new(&mut out);

            stream.write_u64_be_err(PNG_SIGNATURE)?;

            for chunk in &self.chunks
            {
                stream.write_u32_be_err(chunk.data.len() as u32)?;
                stream.write_all(&chunk.name)?;
                stream.write_all(&chunk.data)?;

                // the name and the data live apart, chain one CRC
                // register across both
                let crc = calc_crc_with_bytes(&chunk.name, u32::MAX);
                let crc = !calc_crc_with_bytes(&chunk.data, crc);

                stream.write_u32_be_err(crc)?;
            }

            assert!(stream.eof()); //we wrote all bytes
        }

        Ok(out)
    }
}

/// Split a compressed stream into IDAT chunks, each carrying at
/// most `max_chunk_len` bytes of payload
///
/// An empty stream still produces one empty IDAT chunk, the
/// emitted file never loses its IDAT run entirely.
pub fn chunk_idat(compressed: &[u8], max_chunk_len: usize) -> Vec<PngChunk>
{
    debug_assert!(max_chunk_len > 0);

    if compressed.is_empty()
    {
        return vec![PngChunk {
            name:       *b"IDAT",
            chunk_type: PngChunkType::IDAT,
            data:       Vec::new()
        }];
    }

    compressed
        .chunks(max_chunk_len)
        .map(|part| PngChunk {
            name:       *b"IDAT",
            chunk_type: PngChunkType::IDAT,
            data:       part.to_vec()
        })
        .collect()
}

#[cfg(test)]
fn make_chunk(name: &[u8; 4], data: &[u8]) -> PngChunk
{
    let chunk_type = match name
    {
        b"IHDR" => PngChunkType::IHDR,
        b"PLTE" => PngChunkType::PLTE,
        b"IDAT" => PngChunkType::IDAT,
        b"IEND" => PngChunkType::IEND,
        _ => PngChunkType::unkn
    };

    PngChunk {
        name: *name,
        chunk_type,
        data: data.to_vec()
    }
}

#[cfg(test)]
fn sample_ihdr() -> PngChunk
{
    use crate::enums::{InterlaceMethod, PngColor};
    use crate::headers::PngInfo;

    let info = PngInfo {
        width:              4,
        height:             4,
        depth:              8,
        color:              PngColor::Luma,
        component:          1,
        compression_method: 0,
        filter_method:      0,
        interlace_method:   InterlaceMethod::Standard
    };

    info.to_ihdr()
}

#[test]
fn parse_flatten_identity()
{
    let chain = ChunkChain::from_chunks(vec![
        sample_ihdr(),
        make_chunk(b"tEXt", b"Comment\0nothing to see"),
        make_chunk(b"IDAT", &[1, 2, 3, 4]),
        make_chunk(b"IEND", &[]),
    ]);

    let bytes = chain.flatten().unwrap();

    assert_eq!(bytes.len(), chain.total_size());

    let parsed = ChunkChain::parse(&bytes, &RecodeOptions::default()).unwrap();

    assert_eq!(parsed.chunks(), chain.chunks());
    assert_eq!(parsed.flatten().unwrap(), bytes);
}

#[test]
fn bad_crc_detected()
{
    let chain = ChunkChain::from_chunks(vec![
        sample_ihdr(),
        make_chunk(b"IDAT", &[1, 2, 3, 4]),
        make_chunk(b"IEND", &[]),
    ]);

    let mut bytes = chain.flatten().unwrap();

    // corrupt the CRC of the IEND chunk
    *bytes.last_mut().unwrap() ^= 0xFF;

    let err = ChunkChain::parse(&bytes, &RecodeOptions::default()).unwrap_err();

    assert!(matches!(err, RecodeErrors::BadCrc(_, _)));

    // with confirmation off the file parses
    let options = RecodeOptions::default().set_confirm_crc(false);

    assert!(ChunkChain::parse(&bytes, &options).is_ok());
}

#[test]
fn multiple_ihdr_rejected()
{
    let chain = ChunkChain::from_chunks(vec![
        sample_ihdr(),
        sample_ihdr(),
        make_chunk(b"IEND", &[]),
    ]);

    let bytes = chain.flatten().unwrap();

    assert!(ChunkChain::parse(&bytes, &RecodeOptions::default()).is_err());
}

#[test]
fn first_chunk_must_be_ihdr()
{
    let chain = ChunkChain::from_chunks(vec![
        make_chunk(b"IDAT", &[1, 2, 3]),
        make_chunk(b"IEND", &[]),
    ]);

    let bytes = chain.flatten().unwrap();

    assert!(ChunkChain::parse(&bytes, &RecodeOptions::default()).is_err());
}

#[test]
fn bad_signature_rejected()
{
    let err = ChunkChain::parse(&[0_u8; 16], &RecodeOptions::default()).unwrap_err();

    assert!(matches!(err, RecodeErrors::BadSignature));
}

#[test]
fn critical_unknown_chunk_rejected()
{
    let chain = ChunkChain::from_chunks(vec![
        sample_ihdr(),
        make_chunk(b"TEST", &[7, 7]),
        make_chunk(b"IDAT", &[1]),
        make_chunk(b"IEND", &[]),
    ]);

    let bytes = chain.flatten().unwrap();

    assert!(ChunkChain::parse(&bytes, &RecodeOptions::default()).is_err());
}

#[test]
fn gather_concatenates_the_idat_run()
{
    let chain = ChunkChain::from_chunks(vec![
        sample_ihdr(),
        make_chunk(b"IDAT", &[1, 2]),
        make_chunk(b"IDAT", &[]),
        make_chunk(b"IDAT", &[3]),
        make_chunk(b"tEXt", b"after"),
        make_chunk(b"IEND", &[]),
    ]);

    let (start, compressed) = chain.gather_idat().unwrap();

    // the empty chunk inside the run does not end it
    assert_eq!(start, 1);
    assert_eq!(compressed, vec![1, 2, 3]);
}

#[test]
fn splice_preserves_surrounding_chunks()
{
    let mut chain = ChunkChain::from_chunks(vec![
        sample_ihdr(),
        make_chunk(b"gAMA", &[0, 0, 0xB1, 0x8F]),
        make_chunk(b"IDAT", &[1, 2]),
        make_chunk(b"IDAT", &[3]),
        make_chunk(b"tEXt", b"after"),
        make_chunk(b"IEND", &[]),
    ]);

    chain
        .splice_idat(vec![make_chunk(b"IDAT", &[9, 9, 9])])
        .unwrap();

    let names: Vec<&[u8; 4]> = chain.chunks().iter().map(|chunk| &chunk.name).collect();

    assert_eq!(names, [b"IHDR", b"gAMA", b"IDAT", b"tEXt", b"IEND"]);
    assert_eq!(chain.chunks()[2].data, vec![9, 9, 9]);
}

#[test]
fn gather_without_idat_fails()
{
    let chain = ChunkChain::from_chunks(vec![sample_ihdr(), make_chunk(b"IEND", &[])]);

    assert!(chain.gather_idat().is_err());
}

#[test]
fn chunk_idat_respects_the_size_limit()
{
    let chunks = chunk_idat(&[1, 2, 3, 4, 5], 2);

    let sizes: Vec<usize> = chunks.iter().map(|chunk| chunk.data.len()).collect();

    assert_eq!(sizes, [2, 2, 1]);

    // an exact multiple has no runt chunk
    let chunks = chunk_idat(&[1, 2, 3, 4], 2);

    let sizes: Vec<usize> = chunks.iter().map(|chunk| chunk.data.len()).collect();

    assert_eq!(sizes, [2, 2]);
}

#[test]
fn chunk_idat_empty_stream_still_emits_a_chunk()
{
    let chunks = chunk_idat(&[], 1 << 16);

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].data.is_empty());
    assert_eq!(chunks[0].chunk_type, PngChunkType::IDAT);
}

#[test]
fn bytes_after_iend_ignored()
{
    let chain = ChunkChain::from_chunks(vec![
        sample_ihdr(),
        make_chunk(b"IDAT", &[1]),
        make_chunk(b"IEND", &[]),
    ]);

    let mut bytes = chain.flatten().unwrap();

    bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

    let parsed = ChunkChain::parse(&bytes, &RecodeOptions::default()).unwrap();

    assert_eq!(parsed.chunks().len(), 3);
    assert_eq!(parsed.chunks(), chain.chunks());
}
