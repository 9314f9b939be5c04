#![no_main]

use codec::{decode_sync, RegionChangeMessage, SyncKind};
use libfuzzer_sys::fuzz_target;
use wire::{decode_frame, Limits};

fuzz_target!(|data: &[u8]| {
    let limits = Limits::default();
    let mut offset = 0;
    while offset < data.len() {
        let Ok((frame, used)) = decode_frame(&data[offset..], codec::frame_kind, &limits) else {
            return;
        };
        offset += used;
        if SyncKind::from_opcode(frame.opcode).is_some() {
            let _ = decode_sync(&frame, &limits);
        } else {
            let _ = RegionChangeMessage::decode(&frame);
        }
    }
});
