//! The read half of the re-encoder
//!
//! Parsing the container, extracting the header and decoding
//! pixel data down to bare scanlines live here, the write half is
//! in the encoder module.

use log::{info, trace};

use crate::chunk::ChunkChain;
use crate::enums::{InterlaceMethod, PngColor};
use crate::error::RecodeErrors;
use crate::filters::reconstruct_image;
use crate::headers::PngInfo;
use crate::options::RecodeOptions;
use crate::zlib::inflate_all;

/// A PNG re-encoder
///
/// Reads a PNG file, fully decodes its pixel data and writes an
/// equivalent file back out with the pixels re-filtered and
/// re-compressed. Chunks that do not carry pixel data are
/// preserved byte for byte.
///
/// ```no_run
/// use repng_core::PngRecoder;
///
/// let data = std::fs::read("in.png").unwrap();
///
/// let out = PngRecoder::new(&data).recode().unwrap();
/// ```
pub struct PngRecoder<'a>
{
    pub(crate) data:     &'a [u8],
    pub(crate) options:  RecodeOptions,
    pub(crate) chain:    ChunkChain,
    pub(crate) png_info: PngInfo,
    pub(crate) seen_hdr: bool
}

impl<'a> PngRecoder<'a>
{
    /// Create a new re-encoder over a complete PNG file with
    /// default options
    pub fn new(data: &'a [u8]) -> PngRecoder<'a>
    {
        let default_opt = RecodeOptions::default();

        PngRecoder::new_with_options(data, default_opt)
    }

    /// Create a new re-encoder with custom options
    pub fn new_with_options(data: &'a [u8], options: RecodeOptions) -> PngRecoder<'a>
    {
        PngRecoder {
            data,
            options,
            chain: ChunkChain::default(),
            png_info: PngInfo::default(),
            seen_hdr: false
        }
    }

    /// Parse the chunk list and extract and validate the image
    /// header, without touching pixel data
    ///
    /// Calling this more than once is cheap, later calls return
    /// immediately.
    pub fn decode_headers(&mut self) -> Result<(), RecodeErrors>
    {
        if self.seen_hdr
        {
            return Ok(());
        }

        self.chain = ChunkChain::parse(self.data, &self.options)?;

        // parse guarantees the first chunk is IHDR
        let info = PngInfo::extract(&self.chain.chunks()[0].data)?;

        info.validate(&self.options)?;

        info!("Width: {}", info.width);
        info!("Height: {}", info.height);
        info!("Color: {:?}", info.color);
        info!("Depth: {}", info.depth);
        info!("Interlace :{:?}", info.interlace_method);

        self.png_info = info;
        self.seen_hdr = true;

        Ok(())
    }

    /// Image dimensions as `(width, height)`, present after
    /// [`decode_headers`](Self::decode_headers)
    pub const fn get_dimensions(&self) -> Option<(usize, usize)>
    {
        if !self.seen_hdr
        {
            return None;
        }

        Some((self.png_info.width, self.png_info.height))
    }

    /// Bit depth of the image, present after
    /// [`decode_headers`](Self::decode_headers)
    pub const fn get_depth(&self) -> Option<u8>
    {
        if !self.seen_hdr
        {
            return None;
        }

        Some(self.png_info.depth)
    }

    /// Color type of the image, present after
    /// [`decode_headers`](Self::decode_headers)
    pub const fn get_colorspace(&self) -> Option<PngColor>
    {
        if !self.seen_hdr
        {
            return None;
        }

        Some(self.png_info.color)
    }

    /// The complete extracted header, present after
    /// [`decode_headers`](Self::decode_headers)
    pub const fn get_info(&self) -> Option<PngInfo>
    {
        if !self.seen_hdr
        {
            return None;
        }

        Some(self.png_info)
    }

    /// Decode the pixel data down to bare scanlines, undoing
    /// compression and filtering
    ///
    /// The returned buffer holds `height` scanlines of
    /// `row_bytes` bytes each, filter bytes stripped. Samples
    /// below 8 bits stay packed the way the file stored them.
    pub fn decode_raw(&mut self) -> Result<Vec<u8>, RecodeErrors>
    {
        self.decode_headers()?;

        if self.png_info.interlace_method == InterlaceMethod::Adam7
        {
            return Err(RecodeErrors::GenericStatic(
                "Adam7 interlaced images cannot be decoded to raw scanlines"
            ));
        }

        let (start, compressed) = self.chain.gather_idat()?;

        trace!("IDAT run starts at chunk index {}", start);
        trace!("Gathered {} compressed bytes", compressed.len());

        let inflated = inflate_all(&compressed)?;

        info!("Inflated idat stream holds {} bytes", inflated.len());

        reconstruct_image(&self.png_info, &inflated)
    }
}
