//! CRC32 calculation as defined by the PNG specification
//!
//! Every chunk in a PNG file carries a CRC calculated over the
//! chunk name and the chunk data, using the reflected polynomial
//! `0xEDB88320` with the register initialized to all ones and
//! inverted at the end.
//!
//! The register form is exposed separately so that callers can
//! run one CRC over bytes living in different buffers, the chunk
//! name and the chunk data are stored apart in this crate.

/// Generate the CRC lookup table at compile time
const fn make_crc_table() -> [u32; 256]
{
    let mut table = [0_u32; 256];
    let mut n = 0;

    while n < 256
    {
        let mut c = n as u32;
        let mut k = 0;

        while k < 8
        {
            if c & 1 != 0
            {
                c = 0xEDB88320 ^ (c >> 1);
            }
            else
            {
                c >>= 1;
            }
            k += 1;
        }
        table[n] = c;
        n += 1;
    }

    table
}

static CRC_TABLE: [u32; 256] = make_crc_table();

/// Update a running CRC register with the bytes in `data`
///
/// The register is not inverted on entry or on exit, a caller
/// calculating a full CRC should pass `u32::MAX` as the initial
/// value and invert the result.
pub fn calc_crc_with_bytes(data: &[u8], initial: u32) -> u32
{
    let mut c = initial;

    for byte in data
    {
        c = CRC_TABLE[((c ^ u32::from(*byte)) & 0xFF) as usize] ^ (c >> 8);
    }

    c
}

/// Calculate the CRC of the bytes in `data`
pub fn calc_crc(data: &[u8]) -> u32
{
    !calc_crc_with_bytes(data, u32::MAX)
}

#[test]
fn crc_empty()
{
    assert_eq!(calc_crc(&[]), 0x00000000);
}

#[test]
fn crc_check_value()
{
    // reference check value for CRC-32/ISO-HDLC
    assert_eq!(calc_crc(b"123456789"), 0xCBF43926);
}

#[test]
fn crc_iend()
{
    // the CRC every encoder writes for an empty IEND chunk
    assert_eq!(calc_crc(b"IEND"), 0xAE426082);
}

#[test]
fn crc_chained_matches_one_shot()
{
    let data = b"IHDRabcdefgh";

    let crc = calc_crc_with_bytes(&data[..4], u32::MAX);
    let crc = !calc_crc_with_bytes(&data[4..], crc);

    assert_eq!(crc, calc_crc(data));
}
