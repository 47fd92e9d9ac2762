use nanorand::Rng;
use png::{BitDepth, ColorType, Transformations};
use repng_core::error::RecodeErrors;
use repng_core::{ChunkChain, PngChunk, PngChunkType, PngRecoder, RecodeOptions};

fn random_pixels(len: usize) -> Vec<u8>
{
    let mut pixels = vec![0_u8; len];

    nanorand::WyRand::new().fill(&mut pixels);

    pixels
}

fn encode_ref(pixels: &[u8], width: u32, height: u32) -> Vec<u8>
{
    let mut output = Vec::new();

    {
        // scoped so that we can return the resulting Vec at the end
        let mut encoder = png::Encoder::new(&mut output, width, height);

        encoder.set_color(ColorType::Rgb);
        encoder.set_depth(BitDepth::Eight);

        let mut writer = encoder.write_header().unwrap();

        writer.write_image_data(pixels).unwrap();
    }

    output
}

fn decode_ref(data: &[u8]) -> Vec<u8>
{
    let mut decoder = png::Decoder::new(data);
    let expand = Transformations::EXPAND;
    decoder.set_transformations(expand);

    let mut reader = decoder.read_info().unwrap();

    // Allocate the output buffer.
    let mut buf = vec![0; reader.output_buffer_size()];
    // Read the next frame. An APNG might contain multiple frames.
    let _ = reader.next_frame(&mut buf).unwrap();

    buf
}

fn make_chunk(name: &[u8; 4], data: &[u8]) -> PngChunk
{
    let chunk_type = match name
    {
        b"IDAT" => PngChunkType::IDAT,
        _ => PngChunkType::unkn
    };

    PngChunk {
        name: *name,
        chunk_type,
        data: data.to_vec()
    }
}

#[test]
fn ancillary_chunks_survive_a_recode()
{
    let (width, height) = (32, 17);

    let pixels = random_pixels(width * height * 3);
    let encoded = encode_ref(&pixels, width as u32, height as u32);

    // rebuild the file with extra ancillary chunks on both sides of
    // the IDAT run
    let parsed = ChunkChain::parse(&encoded, &RecodeOptions::default()).unwrap();

    let mut chunks = parsed.chunks().to_vec();

    chunks.insert(1, make_chunk(b"gAMA", &[0, 0, 0xB1, 0x8F]));
    chunks.insert(2, make_chunk(b"zzZz", &[1, 2, 3]));

    let iend = chunks.len() - 1;
    chunks.insert(iend, make_chunk(b"tEXt", b"Author\0nobody"));

    let input = ChunkChain::from_chunks(chunks).flatten().unwrap();

    let recoded = PngRecoder::new(&input).recode().unwrap();

    let names: Vec<[u8; 4]> = ChunkChain::parse(&recoded, &RecodeOptions::default())
        .unwrap()
        .chunks()
        .iter()
        .filter(|chunk| chunk.chunk_type != PngChunkType::IDAT)
        .map(|chunk| chunk.name)
        .collect();

    assert_eq!(names, [*b"IHDR", *b"gAMA", *b"zzZz", *b"tEXt", *b"IEND"]);

    assert_eq!(decode_ref(&recoded), pixels);
}

#[test]
fn zero_length_idat_chunks_are_stepped_over()
{
    let (width, height) = (16, 16);

    let pixels = random_pixels(width * height * 3);
    let encoded = encode_ref(&pixels, width as u32, height as u32);

    let parsed = ChunkChain::parse(&encoded, &RecodeOptions::default()).unwrap();

    let mut chunks = parsed.chunks().to_vec();

    // pad the idat run with empty chunks on each end, the run still
    // holds one compressed stream
    let idat = chunks
        .iter()
        .position(|chunk| chunk.chunk_type == PngChunkType::IDAT)
        .unwrap();

    chunks.insert(idat + 1, make_chunk(b"IDAT", &[]));
    chunks.insert(idat, make_chunk(b"IDAT", &[]));

    let input = ChunkChain::from_chunks(chunks).flatten().unwrap();

    let raw = PngRecoder::new(&input).decode_raw().unwrap();

    assert_eq!(raw, pixels);

    let recoded = PngRecoder::new(&input).recode().unwrap();

    assert_eq!(decode_ref(&recoded), pixels);
}

#[test]
fn trailing_bytes_after_iend_are_dropped()
{
    let (width, height) = (8, 8);

    let pixels = random_pixels(width * height * 3);
    let mut encoded = encode_ref(&pixels, width as u32, height as u32);

    encoded.extend_from_slice(b"garbage after the image");

    let recoded = PngRecoder::new(&encoded).recode().unwrap();

    // the recoded file ends at IEND
    let chain = ChunkChain::parse(&recoded, &RecodeOptions::default()).unwrap();

    assert_eq!(chain.total_size(), recoded.len());
    assert_eq!(decode_ref(&recoded), pixels);
}

#[test]
fn crc_confirmation_can_be_switched_off()
{
    let (width, height) = (8, 8);

    let pixels = random_pixels(width * height * 3);
    let encoded = encode_ref(&pixels, width as u32, height as u32);

    let parsed = ChunkChain::parse(&encoded, &RecodeOptions::default()).unwrap();

    let mut chunks = parsed.chunks().to_vec();

    chunks.insert(1, make_chunk(b"tIME", &[0x07, 0xE6, 1, 1, 0, 0, 0]));

    let mut input = ChunkChain::from_chunks(chunks).flatten().unwrap();

    // signature, 25 bytes of IHDR, then the tIME chunk, its CRC sits
    // after the length, name and 7 payload bytes
    let crc_offset = 8 + 25 + 4 + 4 + 7;

    input[crc_offset] ^= 0xFF;

    let err = PngRecoder::new(&input).recode().unwrap_err();

    assert!(matches!(err, RecodeErrors::BadCrc(_, _)));

    // with confirmation off the file recodes, the emitted chunk gets
    // a freshly calculated CRC
    let options = RecodeOptions::default().set_confirm_crc(false);

    let recoded = PngRecoder::new_with_options(&input, options)
        .recode()
        .unwrap();

    assert_eq!(decode_ref(&recoded), pixels);
}
