#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick a bounded sequence of reads.
    while idx < data.len() && idx < 1024 {
        let op = data[idx];
        idx += 1;
        let width = (op >> 2) % 32 + 1;

        match op % 4 {
            0 => {
                let _ = reader.read_bit();
            }
            1 => {
                let _ = reader.read_bits(width);
            }
            2 => {
                let _ = reader.read_signed_bits(width);
            }
            _ => {
                if reader.align_to_byte().is_ok() {
                    let _ = reader.remaining_bytes();
                }
            }
        }
    }
});
