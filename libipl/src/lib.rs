pub mod error;

pub mod dol;
pub mod framing;
pub mod pipeline;
pub mod scramble;
pub mod uf2;

pub use pipeline::{decode, encode, Decoded, Encoded};
