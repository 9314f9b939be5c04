//! Decoding dumped frames into readable reports.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use codec::{
    decode_sync, BlockData, DecodedBlocks, DecodedSync, MovementSegment, RegionChangeMessage,
    SyncKind,
};
use serde::Serialize;
use wire::{decode_frames, FrameRef, Limits};

/// Everything decoded from one buffer of frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub total_bytes: usize,
    pub frames: Vec<FrameReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub opcode: u8,
    pub payload_len: usize,
    pub body: FrameBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameBody {
    RegionChange { chunk_x: u16, chunk_y: u16 },
    Sync(SyncReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub kind: SyncKind,
    pub own: Option<EntryReport>,
    pub local_count: usize,
    pub removed: usize,
    pub entries: Vec<EntryReport>,
    pub additions: Vec<AdditionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub movement: String,
    pub blocks: Option<BlocksReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdditionReport {
    pub index: u16,
    pub dx: i8,
    pub dy: i8,
    pub blocks: Option<BlocksReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlocksReport {
    pub mask: u16,
    pub blocks: Vec<String>,
}

/// Decodes every frame in `bytes`.
pub fn inspect_frames(bytes: &[u8], limits: &Limits) -> Result<InspectReport> {
    let frames = decode_frames(bytes, codec::frame_kind, limits).context("split frames")?;
    let frames = frames
        .iter()
        .map(|frame| inspect_frame(frame, limits))
        .collect::<Result<Vec<_>>>()?;
    Ok(InspectReport {
        total_bytes: bytes.len(),
        frames,
    })
}

fn inspect_frame(frame: &FrameRef<'_>, limits: &Limits) -> Result<FrameReport> {
    let body = match SyncKind::from_opcode(frame.opcode) {
        Some(_) => {
            let sync = decode_sync(frame, limits)
                .with_context(|| format!("decode sync frame {}", frame.opcode))?;
            FrameBody::Sync(sync_report(&sync))
        }
        None => {
            let region = RegionChangeMessage::decode(frame)
                .with_context(|| format!("decode frame {}", frame.opcode))?;
            FrameBody::RegionChange {
                chunk_x: region.chunk_x,
                chunk_y: region.chunk_y,
            }
        }
    };
    Ok(FrameReport {
        opcode: frame.opcode,
        payload_len: frame.payload.len(),
        body,
    })
}

fn sync_report(sync: &DecodedSync) -> SyncReport {
    let entry = |segment: &MovementSegment, blocks: Option<&DecodedBlocks>| EntryReport {
        movement: describe_movement(segment),
        blocks: blocks.map(blocks_report),
    };
    SyncReport {
        kind: sync.kind,
        own: sync
            .own
            .as_ref()
            .map(|own| entry(&own.segment, own.blocks.as_ref())),
        local_count: sync.local_count(),
        removed: sync.removed(),
        entries: sync
            .entries
            .iter()
            .map(|e| entry(&e.segment, e.blocks.as_ref()))
            .collect(),
        additions: sync
            .additions
            .iter()
            .map(|addition| AdditionReport {
                index: addition.index,
                dx: addition.dx,
                dy: addition.dy,
                blocks: addition.blocks.as_ref().map(blocks_report),
            })
            .collect(),
    }
}

fn blocks_report(blocks: &DecodedBlocks) -> BlocksReport {
    BlocksReport {
        mask: blocks.mask,
        blocks: blocks.blocks.iter().map(describe_block).collect(),
    }
}

fn describe_movement(segment: &MovementSegment) -> String {
    match segment {
        MovementSegment::Teleport {
            plane,
            frame_unchanged,
            local_x,
            local_y,
            ..
        } => format!(
            "teleport to ({local_x}, {local_y}, {plane}){}",
            if *frame_unchanged { "" } else { " new frame" }
        ),
        MovementSegment::Run { walk, run, .. } => format!("run {walk:?} {run:?}"),
        MovementSegment::Walk { direction, .. } => format!("walk {direction:?}"),
        MovementSegment::Stationary { pending: true } => "update".to_string(),
        MovementSegment::Stationary { pending: false } => "idle".to_string(),
        MovementSegment::Drop => "drop".to_string(),
    }
}

fn describe_block(block: &BlockData) -> String {
    match block {
        BlockData::PlayerAppearance(appearance) => format!(
            "appearance {} (combat {})",
            appearance.name, appearance.combat_level
        ),
        BlockData::NpcAppearance { definition, size } => {
            format!("npc appearance {definition} size {size}")
        }
        other => format!("{other:?}"),
    }
}

/// Human-readable rendering of a report.
#[must_use]
pub fn format_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} bytes, {} frames", report.total_bytes, report.frames.len());
    for frame in &report.frames {
        let _ = writeln!(
            out,
            "opcode {} ({} payload bytes)",
            frame.opcode, frame.payload_len
        );
        match &frame.body {
            FrameBody::RegionChange { chunk_x, chunk_y } => {
                let _ = writeln!(out, "  region change to chunk ({chunk_x}, {chunk_y})");
            }
            FrameBody::Sync(sync) => {
                let _ = writeln!(
                    out,
                    "  {:?}: {} local, {} removed, {} added",
                    sync.kind,
                    sync.local_count,
                    sync.removed,
                    sync.additions.len()
                );
                if let Some(own) = &sync.own {
                    let _ = writeln!(out, "  self: {}", own.movement);
                    write_blocks(&mut out, own.blocks.as_ref());
                }
                for (n, entry) in sync.entries.iter().enumerate() {
                    let _ = writeln!(out, "  entry {n}: {}", entry.movement);
                    write_blocks(&mut out, entry.blocks.as_ref());
                }
                for addition in &sync.additions {
                    let _ = writeln!(
                        out,
                        "  add #{} at ({:+}, {:+})",
                        addition.index, addition.dx, addition.dy
                    );
                    write_blocks(&mut out, addition.blocks.as_ref());
                }
            }
        }
    }
    out
}

fn write_blocks(out: &mut String, blocks: Option<&BlocksReport>) {
    let Some(blocks) = blocks else {
        return;
    };
    let _ = writeln!(out, "    mask 0x{:04x}", blocks.mask);
    for block in &blocks.blocks {
        let _ = writeln!(out, "    {block}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NPC_ADD: [u8; 14] = [
        65, 0, 11, 0x00, 0x00, 0x3F, 0x87, 0xFF, 0xC0, 0x40, 0x02, 0x81, 0x00, 1,
    ];
    const REGION: [u8; 5] = [73, 0x01, 0x12, 0x01, 0x92];

    #[test]
    fn inspects_region_change_and_npc_sync() {
        let mut bytes = REGION.to_vec();
        bytes.extend_from_slice(&NPC_ADD);
        let report = inspect_frames(&bytes, &Limits::default()).unwrap();
        assert_eq!(report.total_bytes, 19);
        assert_eq!(report.frames.len(), 2);
        assert_eq!(
            report.frames[0].body,
            FrameBody::RegionChange {
                chunk_x: 402,
                chunk_y: 402
            }
        );

        let FrameBody::Sync(sync) = &report.frames[1].body else {
            panic!("expected sync frame");
        };
        assert_eq!(sync.kind, SyncKind::Npcs);
        assert_eq!(sync.local_count, 0);
        assert_eq!(sync.additions.len(), 1);
        let addition = &sync.additions[0];
        assert_eq!((addition.dx, addition.dy), (3, -2));
        let blocks = addition.blocks.as_ref().unwrap();
        assert_eq!(blocks.mask, 0x200);
        assert_eq!(blocks.blocks, vec!["npc appearance 1 size 1".to_string()]);

        let pretty = format_pretty(&report);
        assert!(pretty.contains("region change to chunk (402, 402)"));
        assert!(pretty.contains("add #1 at (+3, -2)"));
    }

    #[test]
    fn truncated_input_is_an_error() {
        assert!(inspect_frames(&NPC_ADD[..8], &Limits::default()).is_err());
    }

    #[test]
    fn report_serializes() {
        let report = inspect_frames(&REGION, &Limits::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["frames"][0]["body"]["type"], "region_change");
    }
}
