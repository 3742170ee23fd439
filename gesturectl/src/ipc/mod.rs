//! Line-oriented s-expression protocol: frames and commands in, frame
//! results and host events out.

pub mod event_sink;
pub mod protocol;
pub mod sexp;

pub use event_sink::SexpSink;
pub use protocol::{Message, Session};
