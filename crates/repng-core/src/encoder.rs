//! The write half of the re-encoder
//!
//! Re-filtering, re-compression, IDAT splitting and the splice
//! back into the chunk chain all happen inside
//! [`recode`](crate::PngRecoder::recode).

use log::{info, warn};

use crate::chunk::chunk_idat;
use crate::enums::{FilterMethod, InterlaceMethod};
use crate::error::RecodeErrors;
use crate::filters::filter_image_fixed;
use crate::zlib::deflate_all;
use crate::PngRecoder;

impl<'a> PngRecoder<'a>
{
    /// Re-encode the input into a complete PNG file
    ///
    /// Pixel data is decoded to raw scanlines, re-filtered with
    /// the configured filter, re-compressed at the configured
    /// level and split into IDAT chunks that replace the original
    /// run. Every chunk before and after the IDAT run is carried
    /// through untouched.
    ///
    /// Interlaced images are re-emitted unchanged, the pixel data
    /// of an interlaced file is never reorganized.
    pub fn recode(&mut self) -> Result<Vec<u8>, RecodeErrors>
    {
        if self.options.get_idat_size() == 0
        {
            return Err(RecodeErrors::GenericStatic(
                "Maximum IDAT size cannot be zero"
            ));
        }

        if self.options.get_level() > 9
        {
            return Err(RecodeErrors::Generic(format!(
                "Compression level {} out of range, maximum is 9",
                self.options.get_level()
            )));
        }

        let filter = self.options.get_filter();

        // the first scanline variants are internal to the filter
        // loops, a whole image cannot be written with them
        if matches!(
            filter,
            FilterMethod::Unknown | FilterMethod::PaethFirst | FilterMethod::AvgFirst
        )
        {
            return Err(RecodeErrors::Generic(format!(
                "{filter:?} is not a filter scanlines can be written with"
            )));
        }

        self.decode_headers()?;

        if self.png_info.interlace_method == InterlaceMethod::Adam7
        {
            warn!("Interlaced image, re-emitting chunks unchanged");

            return self.chain.flatten();
        }

        let raw = self.decode_raw()?;

        let filtered = filter_image_fixed(&self.png_info, &raw, filter);

        let compressed = deflate_all(&filtered, self.options.get_level())?;

        info!(
            "Filtered {} bytes compressed down to {}",
            filtered.len(),
            compressed.len()
        );

        let new_idat = chunk_idat(&compressed, self.options.get_idat_size());

        info!("Emitting {} IDAT chunks", new_idat.len());

        self.chain.splice_idat(new_idat)?;

        let out = self.chain.flatten()?;

        info!("Final size {} bytes", out.len());

        Ok(out)
    }
}
