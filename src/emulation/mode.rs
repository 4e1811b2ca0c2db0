// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! MODE SENSE (6/10) and MODE SELECT (6/10).
//!
//! Mode pages are generated by one emulator per page; MODE SELECT has no
//! settable fields and validates the initiator's parameter data by
//! rendering the current values and comparing.

use log::{error, warn};

use crate::device::{CommandContext, DeviceType, UaInterlock};
use crate::emulation::capped;
use crate::sense::SenseReason;
use crate::CmdOutput;

const MODE_PAGE_BUF: usize = 512;

type PageEmulator = fn(&CommandContext, u8, &mut [u8]) -> usize;

/// (page, subpage, emulator), ascending page order.
static MODE_PAGES: &[(u8, u8, PageEmulator)] = &[
    (0x01, 0x00, rwrecovery),
    (0x08, 0x00, caching),
    (0x0a, 0x00, control),
    (0x1c, 0x00, informational_exceptions),
];

fn rwrecovery(_ctx: &CommandContext, _pc: u8, p: &mut [u8]) -> usize {
    p[0] = 0x01;
    p[1] = 0x0a;

    // No changeable values for now
    12
}

fn caching(ctx: &CommandContext, pc: u8, p: &mut [u8]) -> usize {
    p[0] = 0x08;
    p[1] = 0x12;

    // No changeable values for now
    if pc == 1 {
        return 20;
    }

    if ctx.dev.check_wce() {
        p[2] = 0x04; // Write Cache Enable
    }
    p[12] = 0x20; // Disabled Read Ahead

    20
}

fn control(ctx: &CommandContext, pc: u8, p: &mut [u8]) -> usize {
    let dev = ctx.dev;

    p[0] = 0x0a;
    p[1] = 0x0a;

    // No changeable values for now
    if pc == 1 {
        return 12;
    }

    // GLTSD: no implicit save of log parameters
    p[2] = 1 << 1;
    if dev.sense_desc_format() {
        // D_SENSE: descriptor-format sense data for 64-bit sectors
        p[2] |= 1 << 2;
    }

    // QUEUE ALGORITHM MODIFIER (SPC-4 7.4.7 table 368): 0h restricted
    // reordering, 1h unrestricted.
    p[3] = if dev.emulate_rest_reord { 0x00 } else { 0x10 };

    // UN_INTLCK_CTRL (SPC-4 7.4.6)
    p[4] = match dev.ua_interlock {
        UaInterlock::EstablishUa => 0x30,
        UaInterlock::NoClear => 0x20,
        UaInterlock::Clear => 0x00,
    };

    // TAS: aborted tasks are completed with TASK ABORTED status
    p[5] = if dev.emulate_tas { 0x40 } else { 0x00 };

    // ATO: application tag fields are owned by the application client
    // when protection information is passed through.
    if ctx.protection_active() {
        p[5] |= 0x80;
    }

    // BUSY TIMEOUT PERIOD: unlimited
    p[8] = 0xff;
    p[9] = 0xff;
    // EXTENDED SELF-TEST COMPLETION TIME
    p[11] = 30;

    12
}

fn informational_exceptions(_ctx: &CommandContext, _pc: u8, p: &mut [u8]) -> usize {
    p[0] = 0x1c;
    p[1] = 0x0a;

    // No changeable values for now
    12
}

fn write_protect(byte: &mut u8) {
    // The WP bit in the device-specific parameter is common to all the
    // device types we emulate.
    *byte |= 0x80;
}

fn dpofua(byte: &mut u8, dev_type: DeviceType) {
    if dev_type == DeviceType::Disk {
        *byte |= 0x10;
    }
}

fn blockdesc(buf: &mut [u8], blocks: u64, block_size: u32) -> usize {
    buf[0] = 8;
    let capped_blocks = u32::try_from(blocks).unwrap_or(u32::MAX);
    buf[1..5].copy_from_slice(&capped_blocks.to_be_bytes());
    buf[5..9].copy_from_slice(&block_size.to_be_bytes());
    9
}

fn long_blockdesc(buf: &mut [u8], blocks: u64, block_size: u32) -> usize {
    if blocks <= u64::from(u32::MAX) {
        return blockdesc(&mut buf[3..], blocks, block_size) + 3;
    }

    buf[0] = 1; // LONGLBA
    buf[3] = 16;
    buf[4..12].copy_from_slice(&blocks.to_be_bytes());
    buf[16..20].copy_from_slice(&block_size.to_be_bytes());
    20
}

pub(crate) fn mode_sense(
    cdb: &[u8],
    ctx: &CommandContext,
    ten: bool,
) -> Result<CmdOutput, SenseReason> {
    let dev = ctx.dev;
    let dbd = cdb[1] & 0x08 != 0;
    let llba = ten && cdb[1] & 0x10 != 0;
    let pc = cdb[2] >> 6;
    let page = cdb[2] & 0x3f;
    let subpage = cdb[3];

    let mut buf = vec![0_u8; MODE_PAGE_BUF];

    // Skip over MODE DATA LENGTH and MEDIUM TYPE to the
    // DEVICE-SPECIFIC PARAMETER byte.
    let mut length = if ten { 3 } else { 2 };

    if ctx.lun.read_only {
        write_protect(&mut buf[length]);
    }
    // SBC only allows enabling FUA and DPO together; DPO is a hint, so
    // a no-op implementation is valid.
    if dev.check_fua() {
        dpofua(&mut buf[length], dev.dev_type);
    }
    length += 1;

    // Block descriptors are only included for disk (SBC) devices; other
    // command sets use a different format.
    if !dbd && dev.dev_type == DeviceType::Disk {
        let blocks = dev.blocks;
        let block_size = dev.block_size;
        if ten {
            if llba {
                length += long_blockdesc(&mut buf[length..], blocks, block_size);
            } else {
                length += 3;
                length += blockdesc(&mut buf[length..], blocks, block_size);
            }
        } else {
            length += blockdesc(&mut buf[length..], blocks, block_size);
        }
    } else {
        // header only
        length += if ten { 4 } else { 1 };
    }

    if page == 0x3f {
        if subpage != 0x00 && subpage != 0xff {
            warn!("MODE SENSE: invalid subpage code {subpage:#04x}");
            return Err(SenseReason::InvalidCdbField);
        }

        for (_, page_subpage, emulate) in MODE_PAGES {
            // All subpage-zero pages for subpage==0, all subpages for
            // subpage==0xff (the only two values allowed above).
            if *page_subpage & !subpage == 0 {
                let ret = emulate(ctx, pc, &mut buf[length..]);
                if !ten && length + ret >= 255 {
                    break;
                }
                length += ret;
            }
        }
        return Ok(finish_mode_sense(buf, length, ten, ctx));
    }

    for (table_page, table_subpage, emulate) in MODE_PAGES {
        if *table_page == page && *table_subpage == subpage {
            length += emulate(ctx, pc, &mut buf[length..]);
            return Ok(finish_mode_sense(buf, length, ten, ctx));
        }
    }

    // Obsolete page 03h "format parameters" is probed by some
    // initiators; do not log it.
    if page != 0x03 {
        error!("MODE SENSE: unimplemented page/subpage {page:#04x}/{subpage:#04x}");
    }
    Err(SenseReason::UnknownModePage)
}

fn finish_mode_sense(mut buf: Vec<u8>, length: usize, ten: bool, ctx: &CommandContext) -> CmdOutput {
    // MODE DATA LENGTH does not count its own field.
    if ten {
        let len = (length - 2) as u16;
        buf[0..2].copy_from_slice(&len.to_be_bytes());
    } else {
        buf[0] = (length - 1) as u8;
    }
    buf.truncate(length);
    capped(buf, ctx)
}

pub(crate) fn mode_select(
    cdb: &[u8],
    ctx: &CommandContext,
    ten: bool,
    data: &[u8],
) -> Result<(), SenseReason> {
    let off = if ten { 8 } else { 4 };
    let pf = cdb[1] & 0x10 != 0;

    if data.is_empty() {
        return Ok(());
    }
    if data.len() < off + 2 {
        return Err(SenseReason::ParameterListLengthError);
    }
    if !pf {
        return Err(SenseReason::InvalidCdbField);
    }

    let page = data[off] & 0x3f;
    let subpage = if data[off] & 0x40 != 0 {
        data[off + 1]
    } else {
        0
    };

    for (table_page, table_subpage, emulate) in MODE_PAGES {
        if *table_page == page && *table_subpage == subpage {
            // Render the current values and require the initiator's
            // parameter data to match; nothing is settable.
            let mut tbuf = vec![0_u8; MODE_PAGE_BUF];
            let length = emulate(ctx, 0, &mut tbuf);

            if data.len() < off + length {
                return Err(SenseReason::ParameterListLengthError);
            }
            if data[off..off + length] != tbuf[..length] {
                return Err(SenseReason::InvalidParameterList);
            }
            return Ok(());
        }
    }

    Err(SenseReason::UnknownModePage)
}
