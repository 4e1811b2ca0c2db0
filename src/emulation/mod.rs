// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! Execution of the emulated device-server commands.
//!
//! Every emulator builds its complete response first and lets
//! [`capped`] truncate it to the transfer length; the pre-truncation
//! length is preserved in [`CmdOutput::full_length`] so the transport
//! can report residuals.

pub mod inquiry;
pub mod mode;
pub mod rsoc;

use crate::command::EmulatedOp;
use crate::device::CommandContext;
use crate::sense::{self, SenseReason};
use crate::CmdOutput;

/// Run one emulated command.
///
/// `cdb` is the same CDB that was parsed; `data_out` is the parameter
/// data for MODE SELECT and empty for everything else.
pub fn execute(
    op: &EmulatedOp,
    cdb: &[u8],
    ctx: &CommandContext,
    data_out: &[u8],
) -> Result<CmdOutput, SenseReason> {
    match op {
        EmulatedOp::TestUnitReady => Ok(CmdOutput::ok()),
        EmulatedOp::RequestSense => request_sense(cdb, ctx),
        EmulatedOp::Inquiry => inquiry::inquiry(cdb, ctx),
        EmulatedOp::ModeSense { ten } => mode::mode_sense(cdb, ctx, *ten),
        EmulatedOp::ModeSelect { ten } => {
            mode::mode_select(cdb, ctx, *ten, data_out).map(|()| CmdOutput::ok())
        }
        EmulatedOp::ReportLuns => Ok(report_luns(ctx)),
        EmulatedOp::ReportSupportedOpCodes => rsoc::report_supported_opcodes(cdb, ctx),
    }
}

/// Truncate a fully built response to the transfer length.
pub(crate) fn capped(mut buf: Vec<u8>, ctx: &CommandContext) -> CmdOutput {
    let full_length = buf.len();
    buf.truncate(ctx.data_length);
    CmdOutput {
        data: buf,
        full_length,
    }
}

fn request_sense(cdb: &[u8], ctx: &CommandContext) -> Result<CmdOutput, SenseReason> {
    // DESC bit: descriptor-format sense on request is not emulated; the
    // format follows the device instead.
    if cdb[1] & 0x01 != 0 {
        log::error!("REQUEST SENSE descriptor-format emulation not supported");
        return Err(SenseReason::InvalidCdbField);
    }

    let ua = ctx.sess.and_then(|sess| sess.clear_unit_attention());
    let buf = sense::request_sense_data(ua, ctx.dev.sense_desc_format());
    Ok(capped(buf, ctx))
}

/// Flat LUN encoding of SAM-5 4.7: 16-bit chunks low to high, each
/// big-endian within the pair.
fn encode_lun(lun: u64) -> [u8; 8] {
    let mut out = [0_u8; 8];
    let mut rest = lun;
    for chunk in out.chunks_exact_mut(2) {
        chunk[0] = (rest >> 8) as u8;
        chunk[1] = rest as u8;
        rest >>= 16;
    }
    out
}

fn report_luns(ctx: &CommandContext) -> CmdOutput {
    // No session means the command arrived through an administrative
    // passthrough path; only virtual LUN 0 is reported then.
    let mut luns = ctx.sess.map_or_else(Vec::new, |sess| sess.lun_snapshot());
    if luns.is_empty() {
        luns.push(0);
    }

    let mut buf = vec![0_u8; 8 + luns.len() * 8];
    // LUN LIST LENGTH counts every accessible LUN even when the
    // allocation length cuts the list short (SPC-4 6.33).
    let list_len = u32::try_from(luns.len() * 8).unwrap_or(u32::MAX);
    buf[0..4].copy_from_slice(&list_len.to_be_bytes());
    for (i, lun) in luns.iter().enumerate() {
        let at = 8 + i * 8;
        buf[at..at + 8].copy_from_slice(&encode_lun(*lun));
    }

    capped(buf, ctx)
}
