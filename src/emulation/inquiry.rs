// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! Standard INQUIRY data and the EVPD pages.
//!
//! Pages are generated into a zeroed scratch buffer at their SPC-4 byte
//! offsets and the response is cut to the page's own length before
//! allocation-length truncation, so short reads see exactly the prefix
//! an initiator would get from real hardware.

use log::{debug, error, warn};

use crate::device::{
    CommandContext, Device, ProtectType, ProtocolId, INQUIRY_MODEL_LEN, INQUIRY_REVISION_LEN,
    INQUIRY_VENDOR_LEN,
};
use crate::device::DeviceType;
use crate::emulation::capped;
use crate::sense::SenseReason;
use crate::CmdOutput;

/// Scratch size for INQUIRY responses; no page comes near it.
const INQUIRY_BUF: usize = 1024;

const VERSION_DESCRIPTOR_SAM5: u16 = 0x00a0;
const VERSION_DESCRIPTOR_SPC4: u16 = 0x0460;
const VERSION_DESCRIPTOR_SBC3: u16 = 0x04c0;
const VERSION_DESCRIPTOR_FCP4: u16 = 0x0a40;
const VERSION_DESCRIPTOR_ISCSI: u16 = 0x0960;
const VERSION_DESCRIPTOR_SAS3: u16 = 0x0c60;
const VERSION_DESCRIPTOR_SBP3: u16 = 0x0980;
const VERSION_DESCRIPTOR_SRP: u16 = 0x0940;

/// Pages advertised by the supported-pages page, in ascending order.
const EVPD_PAGES: [u8; 8] = [0x00, 0x80, 0x83, 0x86, 0xb0, 0xb1, 0xb2, 0xb3];

fn be16_at(buf: &mut [u8], at: usize, val: u16) {
    buf[at..at + 2].copy_from_slice(&val.to_be_bytes());
}

fn be32_at(buf: &mut [u8], at: usize, val: u32) {
    buf[at..at + 4].copy_from_slice(&val.to_be_bytes());
}

fn be64_at(buf: &mut [u8], at: usize, val: u64) {
    buf[at..at + 8].copy_from_slice(&val.to_be_bytes());
}

fn transport_version_descriptor(proto_id: ProtocolId) -> u16 {
    match proto_id {
        ProtocolId::Fcp => VERSION_DESCRIPTOR_FCP4,
        ProtocolId::Iscsi => VERSION_DESCRIPTOR_ISCSI,
        ProtocolId::Sas => VERSION_DESCRIPTOR_SAS3,
        ProtocolId::Sbp => VERSION_DESCRIPTOR_SBP3,
        ProtocolId::Srp => VERSION_DESCRIPTOR_SRP,
        ProtocolId::Spi => {
            warn!("no VERSION DESCRIPTOR for transport protocol {proto_id:?}");
            0
        }
    }
}

/// SCCS and the TPGS field, per the LUN's port group access type.
fn fill_alua_data(ctx: &CommandContext, byte5: &mut u8) {
    *byte5 = 0x80;
    if let Some(group) = ctx.lun.alua_group() {
        *byte5 |= group.access_type.bits();
    }
}

fn ascii_field(buf: &mut [u8], value: &str, field_len: usize) {
    // Left-aligned, space-padded (SPC-4 4.4.1).
    buf[..field_len].fill(0x20);
    let len = value.len().min(field_len);
    buf[..len].copy_from_slice(&value.as_bytes()[..len]);
}

pub(crate) fn std_inquiry(ctx: &CommandContext, buf: &mut [u8]) {
    let dev = ctx.dev;

    if dev.dev_type == DeviceType::Tape {
        // RMB, removable medium
        buf[1] = 0x80;
    }

    buf[2] = 0x06; // SPC-4
    // NORMACA and HISUP = 0, RESPONSE DATA FORMAT = 2
    buf[3] = 2;

    fill_alua_data(ctx, &mut buf[5]);

    if dev.emulate_3pc {
        buf[5] |= 0x8;
    }
    // PROTECT, when DIF is enabled on the device (or forced on the
    // session) and the fabric passes protection information through.
    if ctx.protection_active() {
        buf[5] |= 0x1;
    }

    // MULTIP, when the device is exported through more than one port
    if dev.export_count > 1 {
        buf[6] |= 0x10;
    }

    buf[7] = 0x2; // CmdQue=1

    ascii_field(&mut buf[8..], &dev.vendor, INQUIRY_VENDOR_LEN);
    ascii_field(&mut buf[16..], &dev.model, INQUIRY_MODEL_LEN);
    ascii_field(&mut buf[32..], &dev.revision, INQUIRY_REVISION_LEN);

    be16_at(buf, 58, VERSION_DESCRIPTOR_SAM5);
    be16_at(buf, 60, transport_version_descriptor(ctx.port.proto_id));
    be16_at(buf, 62, VERSION_DESCRIPTOR_SPC4);
    if dev.dev_type == DeviceType::Disk {
        be16_at(buf, 64, VERSION_DESCRIPTOR_SBC3);
    }

    buf[4] = 91; // additional length
}

/// Supported VPD pages (page 0x00).
///
/// Pages are only advertised once a unit serial has been configured,
/// because the NAA designator depends on it.
fn evpd_00(ctx: &CommandContext, buf: &mut [u8]) {
    if ctx.dev.unit_serial.is_some() {
        buf[3] = EVPD_PAGES.len() as u8;
        buf[4..4 + EVPD_PAGES.len()].copy_from_slice(&EVPD_PAGES);
    }
}

/// Unit serial number (page 0x80).
fn evpd_80(ctx: &CommandContext, buf: &mut [u8]) {
    if let Some(serial) = &ctx.dev.unit_serial {
        let bytes = serial.as_bytes();
        // PAGE LENGTH is one byte and counts the NUL terminator
        let len = bytes.len().min(254);
        buf[4..4 + len].copy_from_slice(&bytes[..len]);
        buf[3] = (len + 1) as u8;
    }
}

/// Generate the 16-byte NAA IEEE Registered Extended designator from the
/// IEEE company id and the hex digits of the configured unit serial.
pub fn gen_naa_6h_vendor_specific(dev: &Device, buf: &mut [u8]) {
    let company_id = dev.company_id;
    let mut off = 0;

    buf[off] = 0x6 << 4;
    buf[off] |= ((company_id >> 20) & 0xf) as u8;
    off += 1;
    buf[off] = ((company_id >> 12) & 0xff) as u8;
    off += 1;
    buf[off] = ((company_id >> 4) & 0xff) as u8;
    off += 1;
    buf[off] = ((company_id & 0xf) << 4) as u8;

    // Up to 36 bits of VENDOR SPECIFIC IDENTIFIER plus the 64-bit
    // extension, filled nibble-wise from the serial's hex digits.
    let serial = dev.unit_serial.as_deref().unwrap_or("");
    let end = off + 13;
    let mut high = false;
    for c in serial.chars() {
        if off >= end {
            break;
        }
        let Some(val) = c.to_digit(16) else {
            continue;
        };
        if high {
            buf[off] = (val << 4) as u8;
            high = false;
        } else {
            buf[off] |= val as u8;
            off += 1;
            high = true;
        }
    }
}

/// Device identification (page 0x83).
fn evpd_83(ctx: &CommandContext, buf: &mut [u8]) {
    let dev = ctx.dev;
    let port = ctx.port;
    let mut off = 4;
    let mut len: u16 = 0;

    // NAA IEEE Registered Extended designator, only available once a
    // unit serial has been configured.
    if dev.unit_serial.is_some() {
        buf[off] = 0x1; // CODE SET == binary
        off += 1;
        buf[off] = 0x3; // ASSOCIATION == logical unit, NAA type
        off += 2;
        buf[off] = 0x10; // designator length
        off += 1;
        gen_naa_6h_vendor_specific(dev, &mut buf[off..]);
        len = 20;
        off = usize::from(len) + 4;
    }

    // T10 vendor identification
    let mut id_len = 8;
    if let Some(serial) = &dev.unit_serial {
        let vendor_id = format!("{}:{}", dev.model, serial);
        let bytes = vendor_id.as_bytes();
        // DESIGNATOR LENGTH is one byte; keep the vendor id, the NUL and
        // the 8-byte vendor field within it
        let vendor_id_len = bytes.len().min(246);
        buf[off + 12..off + 12 + vendor_id_len].copy_from_slice(&bytes[..vendor_id_len]);
        id_len += vendor_id_len;
    }
    buf[off] = 0x2; // CODE SET == ASCII
    buf[off + 1] = 0x1; // T10 vendor id
    ascii_field(&mut buf[off + 4..], &dev.vendor, INQUIRY_VENDOR_LEN);
    id_len += 1; // NUL terminator
    buf[off + 3] = id_len as u8;
    len += (id_len + 4) as u16;
    off += id_len + 4;

    // Relative target port identifier
    let proto = (port.proto_id as u8) << 4;
    buf[off] = proto | 0x1; // CODE SET == binary
    off += 1;
    // PIV=1, ASSOCIATION == target port, relative target port id
    buf[off] = 0x80 | 0x10 | 0x4;
    off += 2;
    buf[off] = 4; // designator length
    off += 3; // skip the obsolete field
    be16_at(buf, off, ctx.lun.rtpi);
    off += 2;
    len += 8;

    // Target port group identifier
    if let Some(group) = ctx.lun.alua_group() {
        buf[off] = proto | 0x1;
        off += 1;
        buf[off] = 0x80 | 0x10 | 0x5;
        off += 2;
        buf[off] = 4;
        off += 3;
        be16_at(buf, off, group.id);
        off += 2;
        len += 8;
    }

    // Logical unit group identifier
    if let Some(lu_gp_id) = dev.lu_group_snapshot() {
        buf[off] = 0x1;
        off += 1;
        buf[off] = 0x6;
        off += 2;
        buf[off] = 4;
        off += 3;
        be16_at(buf, off, lu_gp_id);
        off += 2;
        len += 8;
    }

    // SCSI name string, target port association. For iSCSI this reads
    // "<iqn>,t,0x<tpgt>".
    buf[off] = proto | 0x3; // CODE SET == UTF-8
    off += 1;
    buf[off] = 0x80 | 0x10 | 0x8;
    off += 3;
    let name = format!("{},t,0x{:04x}", port.wwn, port.tag);
    let name_len = scsi_name_string(&mut buf[off..], &name);
    buf[off - 1] = name_len as u8;
    off += name_len;
    len += (name_len + 4) as u16;

    // SCSI name string, target device association
    buf[off] = proto | 0x3;
    off += 1;
    buf[off] = 0x80 | 0x20 | 0x8;
    off += 3;
    let target_len = scsi_name_string(&mut buf[off..], &port.wwn);
    buf[off - 1] = target_len as u8;
    len += (target_len + 4) as u16;

    be16_at(buf, 2, len);
}

/// Write a null-terminated, null-padded SCSI NAME STRING field and
/// return the padded length: a multiple of four that fits the one-byte
/// DESIGNATOR LENGTH field.
fn scsi_name_string(buf: &mut [u8], name: &str) -> usize {
    let bytes = name.as_bytes();
    let len = bytes.len().min(251);
    buf[..len].copy_from_slice(&bytes[..len]);
    let mut field_len = len + 1; // NUL terminator
    field_len += field_len.wrapping_neg() & 3;
    field_len
}

/// Extended INQUIRY data (page 0x86).
fn evpd_86(ctx: &CommandContext, buf: &mut [u8]) {
    let dev = ctx.dev;

    buf[3] = 0x3c;

    let prot_pass = ctx.sess.is_some_and(|sess| {
        sess.prot_ops.intersects(
            crate::device::ProtOps::DIN_PASS | crate::device::ProtOps::DOUT_PASS,
        )
    });
    let sess_prot = ctx.sess.map_or(ProtectType::None, |sess| sess.prot_type);

    // GRD_CHK and REF_CHK for type 1 protection, GRD_CHK only for
    // type 3.
    if prot_pass {
        if dev.pi_prot_type == ProtectType::Type1 || sess_prot == ProtectType::Type1 {
            buf[4] = 0x5;
        } else if dev.pi_prot_type == ProtectType::Type3 || sess_prot == ProtectType::Type3 {
            buf[4] = 0x4;
        }
    }

    // SPT: the logical unit supports type 1 and type 3 protection
    if dev.dev_type == DeviceType::Disk
        && prot_pass
        && (dev.pi_prot_type != ProtectType::None || sess_prot != ProtectType::None)
    {
        buf[4] |= 0x3 << 3;
    }

    // HEADSUP, ORDSUP, SIMPSUP
    buf[5] = 0x07;

    // V_SUP when write cache is in effect
    if dev.check_wce() {
        buf[6] = 0x01;
    }

    // R_SUP when a referral map is present
    if dev.lba_map_snapshot().is_some() {
        buf[8] = 0x10;
    }
}

/// Block limits (page 0xb0).
fn evpd_b0(ctx: &CommandContext, buf: &mut [u8]) {
    let dev = ctx.dev;
    let have_tp = dev.emulate_tpu || dev.emulate_tpws;

    buf[0] = dev.dev_type as u8;
    buf[3] = if have_tp { 0x3c } else { 0x10 };

    // WSNZ
    buf[4] = 0x01;
    // MAXIMUM COMPARE AND WRITE LENGTH
    if dev.emulate_caw {
        buf[5] = 0x01;
    }

    // OPTIMAL TRANSFER LENGTH GRANULARITY
    match dev.io_min {
        Some(min) if min != 0 => be16_at(buf, 6, (min / dev.block_size) as u16),
        _ => be16_at(buf, 6, 1),
    }

    // MAXIMUM TRANSFER LENGTH: fabric scatter-gather limit, assuming
    // one page per entry, capped by the backend's own limit.
    let mut mtl = 0;
    if ctx.port.max_data_sg_nents != 0 {
        mtl = ctx.port.max_data_sg_nents * 4096 / dev.block_size;
    }
    let io_max_blocks =
        (u64::from(dev.hw_max_sectors) * u64::from(dev.hw_block_size) / u64::from(dev.block_size))
            as u32;
    let mtl = match (mtl, io_max_blocks) {
        (0, b) => b,
        (a, 0) => a,
        (a, b) => a.min(b),
    };
    be32_at(buf, 8, mtl);

    // OPTIMAL TRANSFER LENGTH
    match dev.io_opt {
        Some(opt) if opt != 0 => be32_at(buf, 12, opt / dev.block_size),
        _ => be32_at(buf, 12, dev.optimal_sectors),
    }

    if have_tp {
        be32_at(buf, 20, dev.max_unmap_lba_count);
        be32_at(buf, 24, dev.max_unmap_block_desc_count);
        be32_at(buf, 28, dev.unmap_granularity);
        be32_at(buf, 32, dev.unmap_granularity_alignment);
        if dev.unmap_granularity_alignment != 0 {
            // UGAVALID
            buf[32] |= 0x80;
        }
    }

    be64_at(buf, 36, dev.max_write_same_len);
}

/// Block device characteristics (page 0xb1).
fn evpd_b1(ctx: &CommandContext, buf: &mut [u8]) {
    buf[0] = ctx.dev.dev_type as u8;
    buf[3] = 0x3c;
    buf[5] = u8::from(ctx.dev.is_nonrot);
}

/// Logical block provisioning (page 0xb2).
fn evpd_b2(ctx: &CommandContext, buf: &mut [u8]) {
    let dev = ctx.dev;

    buf[0] = dev.dev_type as u8;
    // Hardcoded page length for DP=0
    be16_at(buf, 2, 0x0004);
    // THRESHOLD EXPONENT: thin-provisioning thresholds not implemented
    buf[4] = 0x00;

    if dev.emulate_tpu {
        buf[5] = 0x80;
    }
    if dev.emulate_tpws {
        buf[5] |= 0x40 | 0x20;
    }
    // LBPRZ: unmapped blocks read back as zeroes
    if (dev.emulate_tpu || dev.emulate_tpws) && dev.unmap_zeroes_data {
        buf[5] |= 0x04;
    }
}

/// Referrals (page 0xb3).
fn evpd_b3(ctx: &CommandContext, buf: &mut [u8]) {
    let dev = ctx.dev;

    buf[0] = dev.dev_type as u8;
    buf[3] = 0x0c;
    let map = dev.lba_map_snapshot();
    be32_at(buf, 8, map.map_or(0, |m| m.segment_size));
    be32_at(buf, 12, map.map_or(0, |m| m.segment_multiplier));
}

pub(crate) fn inquiry(cdb: &[u8], ctx: &CommandContext) -> Result<CmdOutput, SenseReason> {
    let mut buf = vec![0_u8; INQUIRY_BUF];
    buf[0] = ctx.dev.dev_type as u8;

    let len;
    if cdb[1] & 0x1 == 0 {
        if cdb[2] != 0 {
            error!("INQUIRY with EVPD==0 but PAGE CODE={:#04x}", cdb[2]);
            return Err(SenseReason::InvalidCdbField);
        }
        std_inquiry(ctx, &mut buf);
        len = usize::from(buf[4]) + 5;
    } else {
        buf[1] = cdb[2];
        match cdb[2] {
            0x00 => evpd_00(ctx, &mut buf),
            0x80 => evpd_80(ctx, &mut buf),
            0x83 => evpd_83(ctx, &mut buf),
            0x86 => evpd_86(ctx, &mut buf),
            0xb0 => evpd_b0(ctx, &mut buf),
            0xb1 => evpd_b1(ctx, &mut buf),
            0xb2 => evpd_b2(ctx, &mut buf),
            0xb3 => evpd_b3(ctx, &mut buf),
            page => {
                debug!("unknown VPD code {page:#04x}");
                return Err(SenseReason::InvalidCdbField);
            }
        }
        len = usize::from(u16::from_be_bytes([buf[2], buf[3]])) + 4;
    }

    buf.truncate(len);
    Ok(capped(buf, ctx))
}
