//! Source image normalization: decode, flatten alpha, crop square, resample.

pub(crate) mod decode;
