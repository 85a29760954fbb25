//! Image preparation before upload.

mod compressor;

pub use compressor::ImageCompressor;
