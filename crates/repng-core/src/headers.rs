//! Extraction and validation of the image header
//!
//! The IHDR chunk is always the first chunk of a PNG file and
//! carries the geometry and sample layout that scanline
//! reconstruction and re-filtering depend on. The header is
//! extracted once, validated against the configured limits and
//! never modified afterwards.

use crate::bytestream::{ZByteReader, ZByteWriter};
use crate::chunk::PngChunk;
use crate::constants::IHDR_LENGTH;
use crate::enums::{InterlaceMethod, PngChunkType, PngColor};
use crate::error::RecodeErrors;
use crate::options::RecodeOptions;

/// Image information extracted from the IHDR chunk
///
/// Fields mirror the wire layout of the chunk, `component` is
/// derived from the color type when extracting.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct PngInfo
{
    pub width:              usize,
    pub height:             usize,
    pub depth:              u8,
    pub color:              PngColor,
    pub component:          u8,
    pub compression_method: u8,
    pub filter_method:      u8,
    pub interlace_method:   InterlaceMethod
}

impl PngInfo
{
    /// Extract image information from the payload of an IHDR chunk
    ///
    /// `data` is the chunk payload alone, without the length, name
    /// or CRC bytes surrounding it on the wire.
    pub fn extract(data: &[u8]) -> Result<PngInfo, RecodeErrors>
    {
        if data.len() != IHDR_LENGTH
        {
            return Err(RecodeErrors::GenericStatic("BAD IHDR length"));
        }

        let mut stream = ZByteReader::new(data);
        let mut info = PngInfo::default();

        let pos_start = stream.get_position();

        info.width = stream.get_u32_be() as usize;
        info.height = stream.get_u32_be() as usize;

        info.depth = stream.get_u8();

        let color = stream.get_u8();

        if let Some(img_color) = PngColor::from_int(color)
        {
            info.color = img_color;
        }
        else
        {
            return Err(RecodeErrors::BadHeader(format!(
                "Unknown color value {color}"
            )));
        }
        info.component = info.color.num_components();

        info.compression_method = stream.get_u8();
        info.filter_method = stream.get_u8();

        let interlace_method = stream.get_u8();

        if let Some(method) = InterlaceMethod::from_int(interlace_method)
        {
            info.interlace_method = method;
        }
        else
        {
            return Err(RecodeErrors::BadHeader(format!(
                "Unknown interlace method {interlace_method}",
            )));
        }

        let pos_end = stream.get_position();

        assert_eq!(pos_end - pos_start, IHDR_LENGTH); //we read all bytes

        Ok(info)
    }

    /// Confirm the extracted header describes an image this crate
    /// can re-encode, enforcing the configured dimension limits
    pub fn validate(&self, options: &RecodeOptions) -> Result<(), RecodeErrors>
    {
        if self.width == 0 || self.height == 0
        {
            return Err(RecodeErrors::GenericStatic("Width or height cannot be zero"));
        }

        if self.width > options.get_max_width()
        {
            return Err(RecodeErrors::Generic(format!(
                "Image width {}, larger than maximum configured width {}, aborting",
                self.width,
                options.get_max_width()
            )));
        }

        if self.height > options.get_max_height()
        {
            return Err(RecodeErrors::Generic(format!(
                "Image height {}, larger than maximum configured height {}, aborting",
                self.height,
                options.get_max_height()
            )));
        }

        // verify colors plus bit depths
        let depth_ok = match self.color
        {
            PngColor::Luma => matches!(self.depth, 1 | 2 | 4 | 8 | 16),
            PngColor::Palette => matches!(self.depth, 1 | 2 | 4 | 8),
            PngColor::LumaA | PngColor::RGB | PngColor::RGBA => matches!(self.depth, 8 | 16),
            PngColor::Unknown => false
        };

        if !depth_ok
        {
            return Err(RecodeErrors::BadHeader(format!(
                "Bit depth {} not allowed for color type {:?}",
                self.depth, self.color
            )));
        }

        if self.compression_method != 0
        {
            return Err(RecodeErrors::GenericStatic("Unknown compression method"));
        }

        if self.filter_method != 0
        {
            return Err(RecodeErrors::GenericStatic("Unknown filter method"));
        }

        // reconstruction pre-sizes its buffers from these products,
        // they must fit in usize
        if self.checked_filtered_len().is_none()
        {
            return Err(RecodeErrors::GenericStatic(
                "Image dimensions overflow the pixel buffer size"
            ));
        }

        Ok(())
    }

    /// Write the header back out as an IHDR chunk
    ///
    /// Inverse of [`extract`](Self::extract), only meaningful for
    /// a header that passed validation.
    pub fn to_ihdr(&self) -> PngChunk
    {
        let mut data = vec![0_u8; IHDR_LENGTH];

        {
            let mut stream = ZByteWriter::new(&mut data);

            stream.write_u32_be(self.width as u32);
            stream.write_u32_be(self.height as u32);
            stream.write_u8(self.depth);
            stream.write_u8(self.color.to_int());
            stream.write_u8(self.compression_method);
            stream.write_u8(self.filter_method);
            stream.write_u8(self.interlace_method.to_int());

            assert!(stream.eof()); //we wrote all bytes
        }

        PngChunk {
            name:       *b"IHDR",
            chunk_type: PngChunkType::IHDR,
            data
        }
    }

    /// Number of bytes a single pixel occupies in the filter model,
    /// rounded up to a whole byte for depths below 8
    pub fn bpp(&self) -> usize
    {
        (usize::from(self.depth) * usize::from(self.component) + 7) / 8
    }

    /// Number of bytes in a single de-filtered scanline
    pub fn row_bytes(&self) -> usize
    {
        (self.width * usize::from(self.depth) * usize::from(self.component) + 7) / 8
    }

    /// Length of the filtered pixel buffer, every scanline plus
    /// one filter byte each
    pub fn filtered_len(&self) -> usize
    {
        (self.row_bytes() + 1) * self.height
    }

    fn checked_filtered_len(&self) -> Option<usize>
    {
        let bits = usize::from(self.depth) * usize::from(self.component);

        let row = self.width.checked_mul(bits)?.checked_add(7)? / 8;

        row.checked_add(1)?.checked_mul(self.height)
    }
}

#[test]
fn extract_roundtrips_through_ihdr()
{
    let info = PngInfo {
        width:              640,
        height:             480,
        depth:              8,
        color:              PngColor::RGB,
        component:          3,
        compression_method: 0,
        filter_method:      0,
        interlace_method:   InterlaceMethod::Standard
    };

    let chunk = info.to_ihdr();

    assert_eq!(chunk.data.len(), IHDR_LENGTH);
    assert_eq!(PngInfo::extract(&chunk.data).unwrap(), info);
}

#[test]
fn zero_dimensions_rejected()
{
    let mut info = PngInfo {
        width:            0,
        height:           10,
        depth:            8,
        color:            PngColor::Luma,
        component:        1,
        interlace_method: InterlaceMethod::Standard,
        ..PngInfo::default()
    };

    assert!(info.validate(&RecodeOptions::default()).is_err());

    info.width = 10;
    assert!(info.validate(&RecodeOptions::default()).is_ok());
}

#[test]
fn palette_sixteen_bit_rejected()
{
    let mut info = PngInfo {
        width:            10,
        height:           10,
        depth:            16,
        color:            PngColor::Palette,
        component:        1,
        interlace_method: InterlaceMethod::Standard,
        ..PngInfo::default()
    };

    assert!(info.validate(&RecodeOptions::default()).is_err());

    info.depth = 8;
    assert!(info.validate(&RecodeOptions::default()).is_ok());
}

#[test]
fn rgb_low_depths_rejected()
{
    let mut info = PngInfo {
        width:            10,
        height:           10,
        depth:            4,
        color:            PngColor::RGB,
        component:        3,
        interlace_method: InterlaceMethod::Standard,
        ..PngInfo::default()
    };

    assert!(info.validate(&RecodeOptions::default()).is_err());

    info.depth = 16;
    assert!(info.validate(&RecodeOptions::default()).is_ok());
}

#[test]
fn oversized_products_rejected()
{
    // lifted limits alone must not allow a buffer size past usize
    let options = RecodeOptions::default()
        .set_max_width(usize::MAX)
        .set_max_height(usize::MAX);

    let info = PngInfo {
        width:            usize::MAX / 4,
        height:           usize::MAX / 4,
        depth:            16,
        color:            PngColor::RGBA,
        component:        4,
        interlace_method: InterlaceMethod::Standard,
        ..PngInfo::default()
    };

    assert!(info.validate(&options).is_err());
}

#[test]
fn bpp_rounds_up_to_a_whole_byte()
{
    let mut info = PngInfo {
        width:     5,
        height:    1,
        depth:     1,
        color:     PngColor::Luma,
        component: 1,
        ..PngInfo::default()
    };

    // sub-byte samples still advance the filter window by one byte
    assert_eq!(info.bpp(), 1);
    assert_eq!(info.row_bytes(), 1);

    info.depth = 16;
    info.color = PngColor::RGBA;
    info.component = 4;

    assert_eq!(info.bpp(), 8);
    assert_eq!(info.row_bytes(), 40);
    assert_eq!(info.filtered_len(), 41);
}
