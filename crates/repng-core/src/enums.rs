#![allow(clippy::upper_case_acronyms, non_camel_case_types)]

/// Chunk types this crate tells apart, see
/// https://www.w3.org/TR/2003/REC-PNG-20031110/
///
/// Only the critical chunks are named, every other chunk is
/// carried through unchanged as `unkn`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngChunkType
{
    IHDR,
    PLTE,
    IDAT,
    IEND,
    unkn
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilterMethod
{
    None,
    Sub,
    Up,
    Average,
    Paeth,
    // First scanline, special
    PaethFirst,
    AvgFirst,
    // Unknown type of filter
    Unknown
}

impl FilterMethod
{
    pub fn from_int(int: u8) -> Option<FilterMethod>
    {
        match int
        {
            0 => Some(FilterMethod::None),
            1 => Some(FilterMethod::Sub),
            2 => Some(FilterMethod::Up),
            3 => Some(FilterMethod::Average),
            4 => Some(FilterMethod::Paeth),
            _ => None
        }
    }
    /// Return the value written to the filter byte of a scanline
    /// filtered with this method
    ///
    /// The first scanline variants map back to the standard method
    /// they specialize.
    pub fn to_int(self) -> u8
    {
        match self
        {
            FilterMethod::None => 0,
            FilterMethod::Sub => 1,
            FilterMethod::Up => 2,
            FilterMethod::Average | FilterMethod::AvgFirst => 3,
            FilterMethod::Paeth | FilterMethod::PaethFirst => 4,
            FilterMethod::Unknown => unreachable!()
        }
    }
}

impl Default for FilterMethod
{
    fn default() -> Self
    {
        FilterMethod::Unknown
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InterlaceMethod
{
    Standard,
    Adam7,
    Unknown
}

impl Default for InterlaceMethod
{
    fn default() -> Self
    {
        Self::Unknown
    }
}

impl InterlaceMethod
{
    pub fn from_int(int: u8) -> Option<InterlaceMethod>
    {
        match int
        {
            0 => Some(Self::Standard),
            1 => Some(Self::Adam7),
            _ => None
        }
    }
    pub fn to_int(self) -> u8
    {
        match self
        {
            Self::Standard => 0,
            Self::Adam7 => 1,
            Self::Unknown => unreachable!()
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngColor
{
    Luma,
    Palette,
    LumaA,
    RGB,
    RGBA,
    Unknown
}

impl Default for PngColor
{
    fn default() -> Self
    {
        Self::Unknown
    }
}

impl PngColor
{
    pub(crate) fn num_components(self) -> u8
    {
        match self
        {
            PngColor::Luma => 1,
            PngColor::Palette => 1,
            PngColor::LumaA => 2,
            PngColor::RGB => 3,
            PngColor::RGBA => 4,
            PngColor::Unknown => unreachable!()
        }
    }
    pub(crate) fn from_int(int: u8) -> Option<PngColor>
    {
        match int
        {
            0 => Some(Self::Luma),
            2 => Some(Self::RGB),
            3 => Some(Self::Palette),
            4 => Some(Self::LumaA),
            6 => Some(Self::RGBA),
            _ => None
        }
    }
    pub(crate) fn to_int(self) -> u8
    {
        match self
        {
            PngColor::Luma => 0,
            PngColor::RGB => 2,
            PngColor::Palette => 3,
            PngColor::LumaA => 4,
            PngColor::RGBA => 6,
            PngColor::Unknown => unreachable!()
        }
    }
}
