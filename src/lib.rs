//! FsaKit - Finite-State Automaton Model and Simulator
//! Build, simulate and persist automata in a line-oriented text format
//!
//! ```
//! use fsakit::{parse_fsa, to_text};
//!
//! let source = "\
//! state s0 0 0
//! state s1 40 0
//! transition s0 a s1
//! initial s0
//! final s1
//! ";
//!
//! let mut fsa = parse_fsa(source).unwrap();
//! fsa.reset();
//! fsa.step(Some("a"));
//! let current: Vec<&str> = fsa.current_states().map(|s| s.name()).collect();
//! assert_eq!(current, ["s1"]);
//! assert_eq!(to_text(&fsa), source);
//! ```

pub mod config;
pub mod error;
pub mod fsm;
pub mod parser;

pub use config::AutomatonConfig;
pub use error::{FsaError, FsaResult};
pub use fsm::*;
pub use parser::{
    parse_fsa, parse_fsa_with, read_file, read_fsa, read_str, to_text, write_file, write_fsa,
    CodecError, CodecResult,
};
