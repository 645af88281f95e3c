#![no_main]
use libfuzzer_sys::fuzz_target;
use zx0::config::{BLOCK_FLAG_FIRST, BLOCK_FLAG_LAST};
use zx0::{Compressor, Config};

// A decoder for exactly the commands `zx0::emit` can write, duplicated
// here (rather than shared with the integration tests) since this is a
// separate Cargo package. See `tests/common/mod.rs` for the same logic
// with the grounding notes.

struct BitReader<'a> {
    data: &'a [u8],
    len: usize,
    cur_byte: Option<usize>,
    bit_shift: i8,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader { data, len: 0, cur_byte: None, bit_shift: 0 }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let b = *self.data.get(self.len)?;
        self.len += 1;
        Some(b)
    }

    fn read_bit(&mut self) -> Option<u8> {
        if self.bit_shift == 0 {
            let idx = self.len;
            if idx >= self.data.len() {
                return None;
            }
            self.len += 1;
            self.cur_byte = Some(idx);
            self.bit_shift = 7;
        } else {
            self.bit_shift -= 1;
        }
        let idx = self.cur_byte?;
        Some((self.data[idx] >> self.bit_shift) & 1)
    }
}

fn read_gamma(reader: &mut BitReader, inverted: bool, first_bit: &mut Option<u8>) -> Option<u32> {
    let mut value: u32 = 1;
    loop {
        let zero_bit = match first_bit.take() {
            Some(b) => b,
            None => reader.read_bit()?,
        };
        if zero_bit == 1 {
            break;
        }
        let raw = reader.read_bit()?;
        let data_bit = if inverted { 1 - raw } else { raw };
        value = (value << 1) | data_bit as u32;
    }
    Some(value)
}

fn read_offset(reader: &mut BitReader, is_inverted: bool) -> Option<Option<(u32, u32)>> {
    let high = read_gamma(reader, is_inverted, &mut None)?;
    if high == 256 {
        return Some(None);
    }
    let raw_byte = reader.read_byte()?;
    let low7 = 127u32 - (raw_byte >> 1) as u32;
    let offset = ((high - 1) << 7) + low7 + 1;
    let mut first_bit = Some(raw_byte & 1);
    let length = read_gamma(reader, false, &mut first_bit)? + 1;
    Some(Some((offset, length)))
}

fn decode(data: &[u8], is_inverted: bool) -> Option<Vec<u8>> {
    let mut reader = BitReader::new(data);
    let mut out = Vec::new();
    let mut rep_offset: u32 = 0;

    let initial_len = read_gamma(&mut reader, false, &mut None)?;
    for _ in 0..initial_len {
        out.push(reader.read_byte()?);
    }

    loop {
        let lit_flag = reader.read_bit()?;
        let match_bit = if lit_flag == 0 {
            let lits = read_gamma(&mut reader, false, &mut None)?;
            for _ in 0..lits {
                out.push(reader.read_byte()?);
            }
            reader.read_bit()?
        } else {
            lit_flag
        };

        let length = if match_bit == 0 {
            read_gamma(&mut reader, false, &mut None)?
        } else {
            match read_offset(&mut reader, is_inverted)? {
                None => break,
                Some((offset, length)) => {
                    rep_offset = offset;
                    length
                }
            }
        };

        let start = out.len().checked_sub(rep_offset as usize)?;
        for k in 0..length as usize {
            out.push(*out.get(start + k)?);
        }
    }

    Some(out)
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut compressor = Compressor::new(Config::default()).unwrap();
    let mut out = Vec::new();
    let mut rep_offset = 1u32;
    let result = compressor.compress_block(
        data,
        0,
        data.len(),
        &mut out,
        &mut rep_offset,
        BLOCK_FLAG_FIRST | BLOCK_FLAG_LAST,
    );
    let Ok(result) = result else { return };
    assert_eq!(result.final_literals, 0, "a last block must never defer literals");

    let decoded = decode(&out, false).expect("well-formed compressor output must decode");
    assert_eq!(decoded, data, "compress/decode round trip mismatch");
});
