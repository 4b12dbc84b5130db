use std::io::{Read, Write};

pub const ALIGNMENT: usize = 4;

/// Opaque data is padded with zero bytes to the next 4-byte boundary.
fn pad_len(src_len: usize) -> usize {
    (ALIGNMENT - src_len % ALIGNMENT) % ALIGNMENT
}

pub fn read_padding(src_len: usize, src: &mut impl Read) -> std::io::Result<()> {
    let mut padding_buffer: [u8; ALIGNMENT] = Default::default();
    src.read_exact(&mut padding_buffer[..pad_len(src_len)])
}

pub fn write_padding(src_len: usize, dest: &mut impl Write) -> std::io::Result<()> {
    let padding_buffer: [u8; ALIGNMENT] = Default::default();
    dest.write_all(&padding_buffer[..pad_len(src_len)])
}

pub fn invalid_data(m: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, m)
}
