use bitstream::{BitReader, BitWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Bit(bool),
    Bits { bits: u8, value: u64 },
    Signed { bits: u8, value: i64 },
    Align,
}

fn mask_value(bits: u8, value: u64) -> u64 {
    if bits >= 64 {
        value
    } else {
        let mask = (1u64 << bits) - 1;
        value & mask
    }
}

fn clamp_signed(bits: u8, value: i64) -> i64 {
    if bits >= 64 {
        return value;
    }
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;
    value.clamp(min, max)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::Bit),
        (1u8..=64, any::<u64>()).prop_map(|(bits, value)| Op::Bits {
            bits,
            value: mask_value(bits, value),
        }),
        (1u8..=64, any::<i64>()).prop_map(|(bits, value)| Op::Signed {
            bits,
            value: clamp_signed(bits, value),
        }),
        Just(Op::Align),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = BitWriter::new();

        for op in &ops {
            match op {
                Op::Bit(b) => writer.write_bit(*b),
                Op::Bits { bits, value } => writer.write_bits(*value, *bits).unwrap(),
                Op::Signed { bits, value } => writer.write_signed_bits(*value, *bits).unwrap(),
                Op::Align => writer.align_to_byte(),
            }
        }

        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);

        for op in &ops {
            match op {
                Op::Bit(b) => {
                    prop_assert_eq!(reader.read_bit().unwrap(), *b);
                }
                Op::Bits { bits, value } => {
                    prop_assert_eq!(reader.read_bits(*bits).unwrap(), *value);
                }
                Op::Signed { bits, value } => {
                    prop_assert_eq!(reader.read_signed_bits(*bits).unwrap(), *value);
                }
                Op::Align => {
                    reader.align_to_byte().unwrap();
                }
            }
        }
        prop_assert!(reader.bits_remaining() < 8);
    }
}
