pub mod crc32;
pub mod define;
pub mod errors;
pub mod pat;
pub mod pes;
pub mod pmt;
pub mod ps;
pub mod timestamp;
pub mod utils;

pub trait Unmarshal<T1, T2> {
    fn unmarshal(reader: T1) -> T2
    where
        Self: Sized;
}

pub trait Marshal<T> {
    fn marshal(&self) -> T;
}
