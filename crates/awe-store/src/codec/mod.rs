//! Wire codecs for the awe command protocol.

pub mod json;

pub use json::{decode_command, decode_initial_state, encode_snapshot};
