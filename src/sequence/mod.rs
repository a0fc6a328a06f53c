//! Loop scheduling and frame emission.

/// Hold/transition frame budgets for one group.
pub mod schedule;
/// State machine that drives flow, blending and the sink.
pub mod sequencer;
