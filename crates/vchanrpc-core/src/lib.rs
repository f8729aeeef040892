#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

#[macro_use]
mod macros;

mod as_any;
mod cursor;
mod decode;

pub use self::as_any::*;
pub use self::cursor::*;
pub use self::decode::*;
