//! Filter functions for de-filtering and re-filtering png
//! scanlines.
//!
//! There exist two types of filter functions here,
//! special filter functions for the first scanline which has special conditions
//! and normal filter functions,
//!
//! The special first scanlines have a suffix _first on them and are only called
//! for the first scanline.
//!
//! De-filtering reverses whatever filter a scanline was stored
//! with, re-filtering applies one configured filter to every
//! scanline on the way back out. The two directions mirror each
//! other, wrapping subtraction in place of wrapping addition.

use log::warn;

use crate::enums::FilterMethod;
use crate::error::RecodeErrors;
use crate::headers::PngInfo;

/// Reverse the scanline filters of a filtered pixel buffer
///
/// `filtered` is the inflated IDAT stream, each scanline led by
/// its filter byte. The returned buffer holds bare scanlines,
/// `row_bytes` each.
pub fn reconstruct_image(info: &PngInfo, filtered: &[u8]) -> Result<Vec<u8>, RecodeErrors>
{
    let width_stride = info.row_bytes();
    let chunk_size = width_stride + 1;
    let image_len = chunk_size * info.height;

    let bpp = info.bpp();

    if filtered.len() < image_len
    {
        let msg = format!(
            "Not enough pixels, expected {} but found {}",
            image_len,
            filtered.len()
        );
        return Err(RecodeErrors::Generic(msg));
    }

    if filtered.len() > image_len
    {
        warn!(
            "Inflated stream carries {} bytes more than the image needs, ignoring them",
            filtered.len() - image_len
        );
    }

    let mut out = vec![0_u8; width_stride * info.height];

    let chunks = filtered.chunks_exact(chunk_size);

    //
    // ┌─────┬─────┐
    // │ c   │  b  │
    // ├─────┼─────┤
    // │ a   │ x   │
    // └─────┴─────┘
    //
    // Begin doing loop un-filtering.

    let mut prev_row_start = 0;
    let mut first_row = true;
    let mut out_position = 0;

    for in_stride in chunks.take(info.height)
    {
        // Split output into current and previous
        // current points to the start of the row where we are writing de-filtered output to
        // prev is all rows we already wrote output to.
        let (prev, current) = out.split_at_mut(out_position);

        // get the previous row.
        //Set this to a dummy to handle special case of first row, if we aren't in the first
        // row, we actually take the real slice a line down
        let mut prev_row: &[u8] = &[0_u8];

        if !first_row
        {
            prev_row = &prev[prev_row_start..prev_row_start + width_stride];
            prev_row_start += width_stride;
        }

        out_position += width_stride;

        // take filter
        let filter_byte = in_stride[0];

        // raw image bytes
        let raw = &in_stride[1..];

        // get it's type
        let mut filter =
            FilterMethod::from_int(filter_byte).ok_or(RecodeErrors::UnknownFilter(filter_byte))?;

        if first_row
        {
            // match our filters to special filters for first row
            // these special filters do not need the previous scanline and treat it
            // as zero

            if filter == FilterMethod::Paeth
            {
                filter = FilterMethod::PaethFirst;
            }
            if filter == FilterMethod::Up
            {
                // up for the first row becomes a memcpy
                filter = FilterMethod::None;
            }
            if filter == FilterMethod::Average
            {
                filter = FilterMethod::AvgFirst;
            }

            first_row = false;
        }

        match filter
        {
            FilterMethod::None =>
            {
                // Memcpy
                current[0..width_stride].copy_from_slice(raw)
            }

            FilterMethod::Average => handle_avg(prev_row, raw, current, bpp),

            FilterMethod::Sub => handle_sub(raw, current, bpp),

            FilterMethod::Up => handle_up(prev_row, raw, current),

            FilterMethod::Paeth => handle_paeth(prev_row, raw, current, bpp),

            FilterMethod::PaethFirst => handle_paeth_first(raw, current, bpp),

            FilterMethod::AvgFirst => handle_avg_first(raw, current, bpp),

            FilterMethod::Unknown => unreachable!()
        }
    }

    Ok(out)
}

/// Filter every scanline of `raw` with one fixed filter, yielding
/// a buffer ready for compression
///
/// The filter byte written ahead of each scanline is the chosen
/// filter, including the first scanline, decoders do the same
/// remapping this crate does when reading it back.
pub fn filter_image_fixed(info: &PngInfo, raw: &[u8], filter: FilterMethod) -> Vec<u8>
{
    let width_stride = info.row_bytes();
    let chunk_size = width_stride + 1;

    let bpp = info.bpp();

    debug_assert_eq!(raw.len(), width_stride * info.height);

    let mut out = vec![0_u8; chunk_size * info.height];

    let filter_byte = filter.to_int();

    let mut first_row = true;
    let mut prev_row: &[u8] = &[];

    for (in_row, out_row) in raw
        .chunks_exact(width_stride)
        .zip(out.chunks_exact_mut(chunk_size))
    {
        out_row[0] = filter_byte;

        let current = &mut out_row[1..];

        let mut row_filter = filter;

        if first_row
        {
            // same first scanline remapping as the de-filter
            // direction, the row above is all zero

            if row_filter == FilterMethod::Paeth
            {
                row_filter = FilterMethod::PaethFirst;
            }
            if row_filter == FilterMethod::Up
            {
                row_filter = FilterMethod::None;
            }
            if row_filter == FilterMethod::Average
            {
                row_filter = FilterMethod::AvgFirst;
            }

            first_row = false;
        }

        match row_filter
        {
            FilterMethod::None =>
            {
                // Memcpy
                current.copy_from_slice(in_row)
            }

            FilterMethod::Average => filter_avg(prev_row, in_row, current, bpp),

            FilterMethod::Sub => filter_sub(in_row, current, bpp),

            FilterMethod::Up => filter_up(prev_row, in_row, current),

            FilterMethod::Paeth => filter_paeth(prev_row, in_row, current, bpp),

            FilterMethod::PaethFirst => filter_paeth_first(in_row, current, bpp),

            FilterMethod::AvgFirst => filter_avg_first(in_row, current, bpp),

            FilterMethod::Unknown => unreachable!()
        }

        prev_row = in_row;
    }

    out
}

#[allow(clippy::manual_memcpy)]
pub fn handle_avg(prev_row: &[u8], raw: &[u8], current: &mut [u8], bpp: usize)
{
    if raw.len() < bpp || current.len() < bpp
    {
        return;
    }

    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = raw[i].wrapping_add(prev_row[i] >> 1);
    }
    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len()).min(prev_row.len());

    if bpp > 8
    {
        // optimizer hint to tell the compiler that we don't see this ever happening
        return;
    }
    for i in bpp..end
    {
        let a = u16::from(current[i - bpp]);
        let b = u16::from(prev_row[i]);

        let c = (((a + b) >> 1) & 0xFF) as u8;

        current[i] = raw[i].wrapping_add(c);
    }
}

#[allow(clippy::manual_memcpy)]
pub fn handle_sub(raw: &[u8], current: &mut [u8], bpp: usize)
{
    if current.len() < bpp || raw.len() < bpp
    {
        return;
    }
    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = raw[i];
    }
    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len());

    for i in bpp..end
    {
        let a = current[i - bpp];
        current[i] = raw[i].wrapping_add(a);
    }
}

#[allow(clippy::manual_memcpy)]
pub fn handle_paeth(prev_row: &[u8], raw: &[u8], current: &mut [u8], bpp: usize)
{
    if raw.len() < bpp || current.len() < bpp
    {
        return;
    }

    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = raw[i].wrapping_add(paeth(0, prev_row[i], 0));
    }
    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len()).min(prev_row.len());

    if bpp > 8
    {
        // optimizer hint to tell the compiler that we don't see this ever happening
        return;
    }

    for i in bpp..end
    {
        let paeth_res = paeth(current[i - bpp], prev_row[i], prev_row[i - bpp]);

        current[i] = raw[i].wrapping_add(paeth_res)
    }
}

pub fn handle_up(prev_row: &[u8], raw: &[u8], current: &mut [u8])
{
    for ((filt, recon), up) in raw.iter().zip(current).zip(prev_row)
    {
        *recon = (*filt).wrapping_add(*up)
    }
}

/// Handle images with the first scanline as paeth scanline
///
/// Special in that the above row is treated as zero
#[allow(clippy::manual_memcpy)]
pub fn handle_paeth_first(raw: &[u8], current: &mut [u8], bpp: usize)
{
    if raw.len() < bpp || current.len() < bpp
    {
        return;
    }

    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = raw[i];
    }
    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len());

    for i in bpp..end
    {
        let paeth_res = paeth(current[i - bpp], 0, 0);
        current[i] = raw[i].wrapping_add(paeth_res)
    }
}

/// Handle images with the first scanline as an average scanline
///
/// The above row is treated as zero
#[allow(clippy::manual_memcpy)]
pub fn handle_avg_first(raw: &[u8], current: &mut [u8], bpp: usize)
{
    if raw.len() < bpp || current.len() < bpp
    {
        return;
    }

    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = raw[i];
    }
    // raw length is one row,so always keep it in check
    let end = current.len().min(raw.len());

    for i in bpp..end
    {
        let avg = current[i - bpp] >> 1;
        current[i] = raw[i].wrapping_add(avg)
    }
}

#[allow(clippy::manual_memcpy)]
pub fn filter_avg(prev_row: &[u8], in_row: &[u8], current: &mut [u8], bpp: usize)
{
    if in_row.len() < bpp || current.len() < bpp
    {
        return;
    }

    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = in_row[i].wrapping_sub(prev_row[i] >> 1);
    }

    let end = current.len().min(in_row.len()).min(prev_row.len());

    for i in bpp..end
    {
        let a = u16::from(in_row[i - bpp]);
        let b = u16::from(prev_row[i]);

        let c = (((a + b) >> 1) & 0xFF) as u8;

        current[i] = in_row[i].wrapping_sub(c);
    }
}

#[allow(clippy::manual_memcpy)]
pub fn filter_sub(in_row: &[u8], current: &mut [u8], bpp: usize)
{
    if current.len() < bpp || in_row.len() < bpp
    {
        return;
    }

    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = in_row[i];
    }

    let end = current.len().min(in_row.len());

    for i in bpp..end
    {
        current[i] = in_row[i].wrapping_sub(in_row[i - bpp]);
    }
}

#[allow(clippy::manual_memcpy)]
pub fn filter_paeth(prev_row: &[u8], in_row: &[u8], current: &mut [u8], bpp: usize)
{
    if in_row.len() < bpp || current.len() < bpp
    {
        return;
    }

    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = in_row[i].wrapping_sub(paeth(0, prev_row[i], 0));
    }

    let end = current.len().min(in_row.len()).min(prev_row.len());

    for i in bpp..end
    {
        let paeth_res = paeth(in_row[i - bpp], prev_row[i], prev_row[i - bpp]);

        current[i] = in_row[i].wrapping_sub(paeth_res)
    }
}

pub fn filter_up(prev_row: &[u8], in_row: &[u8], current: &mut [u8])
{
    for ((orig, filt), up) in in_row.iter().zip(current).zip(prev_row)
    {
        *filt = (*orig).wrapping_sub(*up)
    }
}

/// Filter the first scanline as a paeth scanline
///
/// Special in that the above row is treated as zero
#[allow(clippy::manual_memcpy)]
pub fn filter_paeth_first(in_row: &[u8], current: &mut [u8], bpp: usize)
{
    if in_row.len() < bpp || current.len() < bpp
    {
        return;
    }

    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = in_row[i];
    }

    let end = current.len().min(in_row.len());

    for i in bpp..end
    {
        let paeth_res = paeth(in_row[i - bpp], 0, 0);

        current[i] = in_row[i].wrapping_sub(paeth_res)
    }
}

/// Filter the first scanline as an average scanline
///
/// The above row is treated as zero
#[allow(clippy::manual_memcpy)]
pub fn filter_avg_first(in_row: &[u8], current: &mut [u8], bpp: usize)
{
    if in_row.len() < bpp || current.len() < bpp
    {
        return;
    }

    // handle leftmost byte explicitly
    for i in 0..bpp
    {
        current[i] = in_row[i];
    }

    let end = current.len().min(in_row.len());

    for i in bpp..end
    {
        let avg = in_row[i - bpp] >> 1;

        current[i] = in_row[i].wrapping_sub(avg);
    }
}

#[inline(always)]
pub fn paeth(a: u8, b: u8, c: u8) -> u8
{
    let a = i16::from(a);
    let b = i16::from(b);
    let c = i16::from(c);
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc
    {
        return a as u8;
    }
    if pb <= pc
    {
        return b as u8;
    }
    c as u8
}

#[cfg(test)]
fn sample_info(width: usize, height: usize, depth: u8, components: u8) -> PngInfo
{
    use crate::enums::{InterlaceMethod, PngColor};

    let color = match components
    {
        1 => PngColor::Luma,
        2 => PngColor::LumaA,
        3 => PngColor::RGB,
        4 => PngColor::RGBA,
        _ => unreachable!()
    };

    PngInfo {
        width,
        height,
        depth,
        color,
        component: components,
        compression_method: 0,
        filter_method: 0,
        interlace_method: InterlaceMethod::Standard
    }
}

#[cfg(test)]
fn sample_pixels(len: usize) -> Vec<u8>
{
    (0..len).map(|i| (i * 31 + 7) as u8).collect()
}

#[test]
fn paeth_prefers_a_then_b_then_c_on_ties()
{
    assert_eq!(paeth(5, 5, 5), 5);
    // pa and pb tie, a wins
    assert_eq!(paeth(7, 7, 5), 7);
    // pc strictly smallest
    assert_eq!(paeth(0, 10, 5), 5);
    // plain nearest pick
    assert_eq!(paeth(3, 4, 8), 3);
}

#[test]
fn sub_filter_roundtrips_a_row()
{
    let raw = [1_u8, 10, 5, 250, 3, 7];
    let mut filtered = [0_u8; 6];
    let mut recon = [0_u8; 6];

    filter_sub(&raw, &mut filtered, 3);

    assert_eq!(filtered[..3], raw[..3]);

    handle_sub(&filtered, &mut recon, 3);

    assert_eq!(recon, raw);
}

#[test]
fn sub_reconstruction_accumulates_left_bytes()
{
    let info = sample_info(2, 1, 8, 1);

    // one sub filtered scanline, each byte adds the one to its left
    let recon = reconstruct_image(&info, &[1, 10, 5]).unwrap();

    assert_eq!(recon, [10, 15]);
}

#[test]
fn every_filter_roundtrips_an_image()
{
    let info = sample_info(5, 4, 8, 3);
    let raw = sample_pixels(info.row_bytes() * info.height);

    for filter in [
        FilterMethod::None,
        FilterMethod::Sub,
        FilterMethod::Up,
        FilterMethod::Average,
        FilterMethod::Paeth
    ]
    {
        let filtered = filter_image_fixed(&info, &raw, filter);

        assert_eq!(filtered.len(), info.filtered_len());

        // every scanline leads with the chosen filter byte
        for row in filtered.chunks_exact(info.row_bytes() + 1)
        {
            assert_eq!(row[0], filter.to_int());
        }

        let recon = reconstruct_image(&info, &filtered).unwrap();

        assert_eq!(recon, raw, "filter {filter:?} did not roundtrip");
    }
}

#[test]
fn sixteen_bit_image_roundtrips()
{
    // RGBA at depth 16, the widest filter distance there is
    let info = sample_info(3, 2, 16, 4);

    assert_eq!(info.bpp(), 8);

    let raw = sample_pixels(info.row_bytes() * info.height);

    for filter in [FilterMethod::Sub, FilterMethod::Average, FilterMethod::Paeth]
    {
        let filtered = filter_image_fixed(&info, &raw, filter);
        let recon = reconstruct_image(&info, &filtered).unwrap();

        assert_eq!(recon, raw, "filter {filter:?} did not roundtrip");
    }
}

#[test]
fn up_on_the_first_scanline_stores_raw_bytes()
{
    let info = sample_info(4, 2, 8, 1);
    let raw = sample_pixels(info.row_bytes() * info.height);

    let filtered = filter_image_fixed(&info, &raw, FilterMethod::Up);

    // filter byte still says up
    assert_eq!(filtered[0], FilterMethod::Up.to_int());
    // but the first scanline is a plain copy, there is no row above
    assert_eq!(filtered[1..=info.row_bytes()], raw[..info.row_bytes()]);
}

#[test]
fn short_pixel_stream_rejected()
{
    let info = sample_info(5, 4, 8, 3);
    let raw = sample_pixels(info.row_bytes() * info.height);

    let filtered = filter_image_fixed(&info, &raw, FilterMethod::None);

    let err = reconstruct_image(&info, &filtered[..filtered.len() - 1]).unwrap_err();

    assert!(matches!(err, RecodeErrors::Generic(_)));
}

#[test]
fn surplus_pixel_bytes_tolerated()
{
    let info = sample_info(5, 4, 8, 3);
    let raw = sample_pixels(info.row_bytes() * info.height);

    let mut filtered = filter_image_fixed(&info, &raw, FilterMethod::Paeth);

    filtered.extend_from_slice(&[0xAA; 17]);

    let recon = reconstruct_image(&info, &filtered).unwrap();

    assert_eq!(recon, raw);
}

#[test]
fn unknown_filter_byte_rejected()
{
    let info = sample_info(5, 4, 8, 3);
    let raw = sample_pixels(info.row_bytes() * info.height);

    let mut filtered = filter_image_fixed(&info, &raw, FilterMethod::None);

    filtered[0] = 7;

    let err = reconstruct_image(&info, &filtered).unwrap_err();

    assert!(matches!(err, RecodeErrors::UnknownFilter(7)));
}
