pub mod frame;

pub use frame::{decode, encode, FRAME_LEN};
