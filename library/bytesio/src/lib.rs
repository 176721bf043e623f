extern crate byteorder;
extern crate bytes;
extern crate failure;

pub mod bits_errors;
pub mod bits_reader;
pub mod bytes_errors;
pub mod bytes_reader;
pub mod bytes_writer;
