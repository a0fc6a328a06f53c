//! Per-pixel operations on prepared frames: blurs, confidence masks and flow-guided blending.

pub(crate) mod blend;
pub(crate) mod blur;
pub(crate) mod consistency;
