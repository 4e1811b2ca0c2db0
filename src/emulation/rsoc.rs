// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! REPORT SUPPORTED OPERATION CODES (SPC-4 6.34).
//!
//! Walks the static command table, re-evaluating each descriptor's gate
//! against the live device and session state, and renders either the
//! all-commands list or the one-command format with patched usage bits.

use log::debug;

use crate::device::CommandContext;
use crate::emulation::capped;
use crate::opcode::{CommandTimeouts, OpcodeDescriptor, Support, SUPPORTED_OPCODES};
use crate::sense::SenseReason;
use crate::CmdOutput;

fn encode_command_timeouts_descriptor(
    buf: &mut [u8],
    ctdp: bool,
    timeouts: Option<CommandTimeouts>,
) -> usize {
    if !ctdp {
        return 0;
    }

    let t = timeouts.unwrap_or(CommandTimeouts {
        specific: 0,
        nominal: 0,
        recommended: 0,
    });
    buf[0..2].copy_from_slice(&0xa_u16.to_be_bytes());
    buf[3] = t.specific;
    buf[4..8].copy_from_slice(&t.nominal.to_be_bytes());
    buf[8..12].copy_from_slice(&t.recommended.to_be_bytes());

    12
}

fn encode_command_descriptor(buf: &mut [u8], ctdp: bool, descr: &OpcodeDescriptor) -> usize {
    buf[0] = descr.opcode;
    buf[2..4].copy_from_slice(&descr.service_action.unwrap_or(0).to_be_bytes());
    buf[5] = (u8::from(ctdp) << 1) | u8::from(descr.service_action.is_some());
    buf[6..8].copy_from_slice(&descr.cdb_size.to_be_bytes());

    8 + encode_command_timeouts_descriptor(&mut buf[8..], ctdp, descr.timeouts)
}

fn encode_one_command_descriptor(
    buf: &mut [u8],
    ctdp: bool,
    descr: Option<&OpcodeDescriptor>,
    ctx: &CommandContext,
) -> usize {
    let Some(descr) = descr else {
        buf[1] = (u8::from(ctdp) << 7) | Support::NotSupported as u8;
        return 2;
    };

    buf[1] = (u8::from(ctdp) << 7) | descr.support as u8;
    buf[2..4].copy_from_slice(&descr.cdb_size.to_be_bytes());
    let bits = descr.patched_usage_bits(ctx.dev);
    buf[4..4 + bits.len()].copy_from_slice(&bits);

    let cdb_size = usize::from(descr.cdb_size);
    4 + cdb_size
        + encode_command_timeouts_descriptor(&mut buf[4 + cdb_size..], ctdp, descr.timeouts)
}

/// Find the descriptor for a one-command request, honoring the
/// reporting-options rules for service actions.
fn get_descr(
    cdb: &[u8],
    opts: u8,
    ctx: &CommandContext,
) -> Result<Option<&'static OpcodeDescriptor>, SenseReason> {
    let requested_opcode = cdb[3];
    let requested_sa = u16::from_be_bytes([cdb[4], cdb[5]]);

    for descr in SUPPORTED_OPCODES {
        if descr.opcode != requested_opcode {
            continue;
        }

        match opts {
            0x1 => {
                // An operation code with service actions must be asked
                // for with reporting options 2 or 3.
                if descr.service_action.is_some() {
                    return Err(SenseReason::InvalidCdbField);
                }
                if descr.is_enabled(ctx) {
                    return Ok(Some(descr));
                }
            }
            0x2 => {
                if descr.service_action.is_none() {
                    // No service actions implemented for this operation
                    // code.
                    return Err(SenseReason::InvalidCdbField);
                }
                if descr.service_action == Some(requested_sa) && descr.is_enabled(ctx) {
                    return Ok(Some(descr));
                }
            }
            _ => {
                if descr.service_action.unwrap_or(0) == requested_sa && descr.is_enabled(ctx) {
                    return Ok(Some(descr));
                }
            }
        }
    }

    Ok(None)
}

pub(crate) fn report_supported_opcodes(
    cdb: &[u8],
    ctx: &CommandContext,
) -> Result<CmdOutput, SenseReason> {
    if !ctx.dev.emulate_rsoc {
        return Err(SenseReason::UnsupportedOpcode);
    }

    let rctd = cdb[2] >> 7 != 0;
    let opts = cdb[2] & 0x7;
    // REPORTING OPTIONS values above 011b are reserved.
    if opts > 3 {
        debug!("REPORT SUPPORTED OPERATION CODES with reserved REPORTING OPTIONS {opts:#x}");
        return Err(SenseReason::InvalidCdbField);
    }

    let per_descr = 8 + usize::from(rctd) * 12;
    let buf = if opts == 0 {
        let mut buf = vec![0_u8; 4 + per_descr * SUPPORTED_OPCODES.len()];
        let mut length = 4;
        for descr in SUPPORTED_OPCODES {
            if !descr.is_enabled(ctx) {
                continue;
            }
            length += encode_command_descriptor(&mut buf[length..], rctd, descr);
        }
        // COMMAND DATA LENGTH counts the descriptors only.
        let data_len = (length - 4) as u32;
        buf[0..4].copy_from_slice(&data_len.to_be_bytes());
        buf.truncate(length);
        buf
    } else {
        let descr = get_descr(cdb, opts, ctx)?;
        let max = descr.map_or(2, |d| 4 + usize::from(d.cdb_size) + usize::from(rctd) * 12);
        let mut buf = vec![0_u8; max];
        let length = encode_one_command_descriptor(&mut buf, rctd, descr, ctx);
        buf.truncate(length);
        buf
    };

    Ok(capped(buf, ctx))
}
