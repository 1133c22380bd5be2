// TeleSift - core/mod.rs
//
// Core extraction engine.
// Dependencies: standard library, regex, serde, encoding_rs, csv/serde_json
// for table serialisation.
// Must NOT depend on: platform, app, or any network/filesystem I/O directly.

pub mod assemble;
pub mod decode;
pub mod demux;
pub mod descriptor;
pub mod export;
pub mod extract;
pub mod header;
pub mod mapper;
pub mod model;
