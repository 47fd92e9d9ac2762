//! A png re-encoder
//!
//! This crate reads a PNG image, fully decodes its pixel data and then
//! writes an equivalent image back out, re-filtered with a single fixed
//! scanline filter and re-compressed from scratch. Chunks that do not
//! carry pixel data are preserved byte for byte.
//!
//! # Features
//! - Chunk level access to the PNG container, with CRC confirmation
//! - Scanline reconstruction and re-filtering for all five standard filters
//! - Bounded size IDAT re-chunking
//!
//! # Usage
//! Add the library to `Cargo.toml`
//!
//! ```toml
//! repng-core = "0.1"
//! ```
//!
//! Then re-encode a file in memory:
//!
//! ```no_run
//! use repng_core::PngRecoder;
//!
//! let data = std::fs::read("in.png").unwrap();
//!
//! let out = PngRecoder::new(&data).recode().unwrap();
//!
//! std::fs::write("out.png", out).unwrap();
//! ```
//!
//! The re-filter choice, compression level and maximum IDAT payload size
//! are configurable through [`RecodeOptions`]:
//!
//! ```no_run
//! use repng_core::{FilterMethod, PngRecoder, RecodeOptions};
//!
//! let data = std::fs::read("in.png").unwrap();
//!
//! let options = RecodeOptions::default()
//!     .set_filter(FilterMethod::Sub)
//!     .set_level(9);
//!
//! let out = PngRecoder::new_with_options(&data, options).recode().unwrap();
//! ```
//!
//! # Alternatives
//! - [png](https://crates.io/crates/png) crate, a full decoder/encoder pair
pub use chunk::{chunk_idat, ChunkChain, PngChunk};
pub use decoder::PngRecoder;
pub use enums::{FilterMethod, InterlaceMethod, PngChunkType, PngColor};
pub use headers::PngInfo;
pub use options::RecodeOptions;

pub mod bytestream;
mod chunk;
mod constants;
mod crc;
mod decoder;
mod encoder;
mod enums;
pub mod error;
mod filters;
mod headers;
mod options;
mod zlib;
