//! Options controlling how a PNG file is re-encoded

use crate::constants::DEFAULT_IDAT_SIZE;
use crate::enums::FilterMethod;

/// Re-encode options
///
/// Controls the limits the parser enforces and the shape
/// of the file written back out.
///
/// Options are set in a builder fashion, each setter consumes
/// the options and returns a modified copy
///
/// ```
/// use repng_core::{FilterMethod, RecodeOptions};
///
/// let options = RecodeOptions::default()
///     .set_filter(FilterMethod::Up)
///     .set_level(9);
///
/// assert_eq!(options.get_level(), 9);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct RecodeOptions
{
    /// Maximum width for which the re-encoder will
    /// not try to process images wider than the
    /// specified width
    ///
    /// - Default value: 2^17
    max_width:   usize,
    /// Maximum height for which the re-encoder will
    /// not try to process images taller than the
    /// specified height
    ///
    /// - Default value: 2^17
    max_height:  usize,
    /// Whether chunk CRCs should be confirmed while
    /// parsing the input
    ///
    /// - Default value: true
    confirm_crc: bool,
    /// The fixed filter applied to every scanline
    /// written back out
    ///
    /// - Default value: `FilterMethod::Paeth`
    filter:      FilterMethod,
    /// Zlib compression level for the emitted IDAT stream,
    /// between 0 and 9
    ///
    /// - Default value: 6
    level:       u32,
    /// Upper bound for the payload of a single emitted
    /// IDAT chunk
    ///
    /// - Default value: 65536
    idat_size:   usize
}

impl RecodeOptions
{
    /// Get maximum width configured for the re-encoder
    pub const fn get_max_width(&self) -> usize
    {
        self.max_width
    }
    /// Get maximum height configured for the re-encoder
    pub const fn get_max_height(&self) -> usize
    {
        self.max_height
    }
    /// Return true if chunk CRCs are confirmed during parsing
    pub const fn get_confirm_crc(&self) -> bool
    {
        self.confirm_crc
    }
    /// Get the filter scanlines are re-filtered with
    pub const fn get_filter(&self) -> FilterMethod
    {
        self.filter
    }
    /// Get the zlib compression level used for the output
    pub const fn get_level(&self) -> u32
    {
        self.level
    }
    /// Get the maximum payload size of an emitted IDAT chunk
    pub const fn get_idat_size(&self) -> usize
    {
        self.idat_size
    }

    /// Set maximum width for which the re-encoder should not
    /// try processing images wider than that width
    pub fn set_max_width(mut self, width: usize) -> Self
    {
        self.max_width = width;
        self
    }
    /// Set maximum height for which the re-encoder should not
    /// try processing images taller than that height
    pub fn set_max_height(mut self, height: usize) -> Self
    {
        self.max_height = height;
        self
    }
    /// Set whether chunk CRCs should be confirmed while parsing
    ///
    /// When false, stored CRCs are carried along but never
    /// checked, useful for recovering truncated or damaged files
    pub fn set_confirm_crc(mut self, yes: bool) -> Self
    {
        self.confirm_crc = yes;
        self
    }
    /// Set the filter every scanline is re-filtered with
    pub fn set_filter(mut self, filter: FilterMethod) -> Self
    {
        self.filter = filter;
        self
    }
    /// Set the zlib compression level for the output,
    /// between 0 and 9
    pub fn set_level(mut self, level: u32) -> Self
    {
        self.level = level;
        self
    }
    /// Set the maximum payload size of a single emitted IDAT
    /// chunk, pixel data larger than this is split over
    /// multiple chunks
    pub fn set_idat_size(mut self, size: usize) -> Self
    {
        self.idat_size = size;
        self
    }
}

impl Default for RecodeOptions
{
    fn default() -> Self
    {
        Self {
            max_width:   1 << 17,
            max_height:  1 << 17,
            confirm_crc: true,
            filter:      FilterMethod::Paeth,
            level:       6,
            idat_size:   DEFAULT_IDAT_SIZE
        }
    }
}
