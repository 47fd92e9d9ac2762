use nanorand::Rng;
use png::{BitDepth, ColorType, Transformations};
use repng_core::{
    ChunkChain, FilterMethod, InterlaceMethod, PngChunk, PngChunkType, PngColor, PngInfo,
    PngRecoder, RecodeOptions
};

fn random_pixels(len: usize) -> Vec<u8>
{
    let mut pixels = vec![0_u8; len];

    nanorand::WyRand::new().fill(&mut pixels);

    pixels
}

fn encode_ref(
    pixels: &[u8], width: u32, height: u32, color: ColorType, depth: BitDepth
) -> Vec<u8>
{
    let mut output = Vec::new();

    {
        // scoped so that we can return the resulting Vec at the end
        let mut encoder = png::Encoder::new(&mut output, width, height);

        encoder.set_color(color);
        encoder.set_depth(depth);

        if color == ColorType::Indexed
        {
            // a full palette, every index a pixel can carry is in range
            let entries = 1_usize << (depth as u8);

            encoder.set_palette(random_pixels(entries * 3));
        }

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

#[test]
fn every_target_filter_roundtrips()
{
    let (width, height) = (100, 59);

    let pixels = random_pixels(width * height * 3);
    let encoded = encode_ref(
        &pixels,
        width as u32,
        height as u32,
        ColorType::Rgb,
        BitDepth::Eight
    );

    let filters = [
        FilterMethod::None,
        FilterMethod::Sub,
        FilterMethod::Up,
        FilterMethod::Average,
        FilterMethod::Paeth
    ];

    for filter in filters
    {
        let options = RecodeOptions::default().set_filter(filter);

        let recoded = PngRecoder::new_with_options(&encoded, options)
            .recode()
            .unwrap();

        assert_eq!(
            decode_ref(&recoded),
            pixels,
            "pixels diverged when re-filtering with {filter:?}"
        );
    }
}

#[test]
fn every_color_type_and_depth_survives_a_recode()
{
    // color type, bit depth and samples per pixel
    let combos = [
        (ColorType::Grayscale, BitDepth::One, 1),
        (ColorType::Grayscale, BitDepth::Two, 1),
        (ColorType::Grayscale, BitDepth::Four, 1),
        (ColorType::Grayscale, BitDepth::Eight, 1),
        (ColorType::Grayscale, BitDepth::Sixteen, 1),
        (ColorType::GrayscaleAlpha, BitDepth::Eight, 2),
        (ColorType::GrayscaleAlpha, BitDepth::Sixteen, 2),
        (ColorType::Rgb, BitDepth::Eight, 3),
        (ColorType::Rgb, BitDepth::Sixteen, 3),
        (ColorType::Rgba, BitDepth::Eight, 4),
        (ColorType::Rgba, BitDepth::Sixteen, 4),
        (ColorType::Indexed, BitDepth::Four, 1),
        (ColorType::Indexed, BitDepth::Eight, 1)
    ];

    // an odd width leaves partial bytes in sub 8 bit rows
    let (width, height) = (37, 23);

    for (color, depth, samples) in combos
    {
        let row_bits = width * samples * depth as usize;
        let len = ((row_bits + 7) / 8) * height;

        let pixels = random_pixels(len);
        let encoded = encode_ref(&pixels, width as u32, height as u32, color, depth);

        let recoded = PngRecoder::new(&encoded).recode().unwrap();

        assert_eq!(
            decode_ref(&encoded),
            decode_ref(&recoded),
            "recode changed pixels for {color:?} at depth {depth:?}"
        );
    }
}

#[test]
fn raw_decode_agrees_with_the_reference_encoder()
{
    let (width, height) = (64, 64);

    // one file per input filter, every reconstruction path gets hit
    let filters = [
        png::FilterType::NoFilter,
        png::FilterType::Sub,
        png::FilterType::Up,
        png::FilterType::Avg,
        png::FilterType::Paeth
    ];

    for filter in filters
    {
        let pixels = random_pixels(width * height * 4);

        let mut encoded = Vec::new();

        {
            let mut encoder = png::Encoder::new(&mut encoded, width as u32, height as u32);

            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            encoder.set_filter(filter);

            let mut writer = encoder.write_header().unwrap();

            writer.write_image_data(&pixels).unwrap();
        }

        let raw = PngRecoder::new(&encoded).decode_raw().unwrap();

        assert_eq!(raw, pixels, "decoding diverged for input filter {filter:?}");
    }
}

#[test]
fn emitted_idat_chunks_respect_the_size_limit()
{
    let (width, height) = (40, 40);

    let pixels = random_pixels(width * height * 3);
    let encoded = encode_ref(
        &pixels,
        width as u32,
        height as u32,
        ColorType::Rgb,
        BitDepth::Eight
    );

    let options = RecodeOptions::default().set_idat_size(100);

    let recoded = PngRecoder::new_with_options(&encoded, options)
        .recode()
        .unwrap();

    let chain = ChunkChain::parse(&recoded, &RecodeOptions::default()).unwrap();

    let idat_sizes: Vec<usize> = chain
        .chunks()
        .iter()
        .filter(|chunk| chunk.chunk_type == PngChunkType::IDAT)
        .map(|chunk| chunk.data.len())
        .collect();

    // random pixels cannot deflate into a single 100 byte chunk
    assert!(idat_sizes.len() > 1);
    assert!(idat_sizes.iter().all(|size| *size <= 100));

    assert_eq!(decode_ref(&recoded), pixels);
}

#[test]
fn compression_level_changes_size_but_not_pixels()
{
    let (width, height) = (64, 64);

    // a repeating ramp compresses well, the level difference must show
    let pixels: Vec<u8> = (0..width * height * 3).map(|i| (i % 251) as u8).collect();

    let encoded = encode_ref(
        &pixels,
        width as u32,
        height as u32,
        ColorType::Rgb,
        BitDepth::Eight
    );

    let stored = PngRecoder::new_with_options(&encoded, RecodeOptions::default().set_level(0))
        .recode()
        .unwrap();

    let best = PngRecoder::new_with_options(&encoded, RecodeOptions::default().set_level(9))
        .recode()
        .unwrap();

    assert!(best.len() < stored.len());

    assert_eq!(decode_ref(&stored), pixels);
    assert_eq!(decode_ref(&best), pixels);
}

#[test]
fn unusable_settings_are_rejected()
{
    let pixels = random_pixels(4 * 4 * 3);
    let encoded = encode_ref(&pixels, 4, 4, ColorType::Rgb, BitDepth::Eight);

    let too_high = RecodeOptions::default().set_level(10);

    assert!(PngRecoder::new_with_options(&encoded, too_high)
        .recode()
        .is_err());

    let no_chunks = RecodeOptions::default().set_idat_size(0);

    assert!(PngRecoder::new_with_options(&encoded, no_chunks)
        .recode()
        .is_err());

    let inner_filter = RecodeOptions::default().set_filter(FilterMethod::PaethFirst);

    assert!(PngRecoder::new_with_options(&encoded, inner_filter)
        .recode()
        .is_err());
}

#[test]
fn header_queries_need_decode_headers_first()
{
    let pixels = random_pixels(21 * 9 * 3);
    let encoded = encode_ref(&pixels, 21, 9, ColorType::Rgb, BitDepth::Eight);

    let mut recoder = PngRecoder::new(&encoded);

    assert_eq!(recoder.get_dimensions(), None);
    assert_eq!(recoder.get_depth(), None);

    recoder.decode_headers().unwrap();

    assert_eq!(recoder.get_dimensions(), Some((21, 9)));
    assert_eq!(recoder.get_depth(), Some(8));
    assert_eq!(recoder.get_colorspace(), Some(PngColor::RGB));
}

#[test]
fn interlaced_images_pass_through_unchanged()
{
    // the reference encoder cannot write interlaced files, build one
    // by hand, the pixel data never gets inflated anyway
    let info = PngInfo {
        width:              8,
        height:             8,
        depth:              8,
        color:              PngColor::RGB,
        component:          3,
        compression_method: 0,
        filter_method:      0,
        interlace_method:   InterlaceMethod::Adam7
    };

    let idat = PngChunk {
        name:       *b"IDAT",
        chunk_type: PngChunkType::IDAT,
        data:       vec![7; 32]
    };

    let iend = PngChunk {
        name:       *b"IEND",
        chunk_type: PngChunkType::IEND,
        data:       Vec::new()
    };

    let chain = ChunkChain::from_chunks(vec![info.to_ihdr(), idat, iend]);
    let encoded = chain.flatten().unwrap();

    let recoded = PngRecoder::new(&encoded).recode().unwrap();

    assert_eq!(recoded, encoded);
}
