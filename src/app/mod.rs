// TeleSift - app/mod.rs
//
// Application layer: descriptor loading, log sources, record sinks and the
// end-to-end pipeline.
// Dependencies: core layer.
// Must NOT depend on: platform specifics.

pub mod descriptor_mgr;
pub mod pipeline;
pub mod sink;
pub mod source;
