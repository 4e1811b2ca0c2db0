// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! The static command table: one descriptor per supported opcode or
//! (opcode, service action) pair, carrying the CDB usage-bits template
//! REPORT SUPPORTED OPERATION CODES hands back to initiators.
//!
//! Descriptors whose availability depends on live device or session
//! state carry a [`Gate`]; gates are re-evaluated against the command's
//! context on every request, never cached. Descriptors for commands
//! whose DPO/FUA bits are only honored when FUA is actually supported
//! carry a [`UsagePatch`] that fixes the template up per device.

use crate::device::CommandContext;
use crate::device::Device;

// SPC/SBC operation codes.
pub const TEST_UNIT_READY: u8 = 0x00;
pub const REQUEST_SENSE: u8 = 0x03;
pub const READ_6: u8 = 0x08;
pub const WRITE_6: u8 = 0x0a;
pub const INQUIRY: u8 = 0x12;
pub const MODE_SELECT: u8 = 0x15;
pub const RESERVE: u8 = 0x16;
pub const RELEASE: u8 = 0x17;
pub const MODE_SENSE: u8 = 0x1a;
pub const START_STOP: u8 = 0x1b;
pub const RECEIVE_DIAGNOSTIC: u8 = 0x1c;
pub const SEND_DIAGNOSTIC: u8 = 0x1d;
pub const READ_CAPACITY: u8 = 0x25;
pub const READ_10: u8 = 0x28;
pub const WRITE_10: u8 = 0x2a;
pub const WRITE_VERIFY: u8 = 0x2e;
pub const VERIFY: u8 = 0x2f;
pub const SYNCHRONIZE_CACHE: u8 = 0x35;
pub const WRITE_BUFFER: u8 = 0x3b;
pub const WRITE_SAME: u8 = 0x41;
pub const UNMAP: u8 = 0x42;
pub const LOG_SELECT: u8 = 0x4c;
pub const LOG_SENSE: u8 = 0x4d;
pub const MODE_SELECT_10: u8 = 0x55;
pub const RESERVE_10: u8 = 0x56;
pub const RELEASE_10: u8 = 0x57;
pub const MODE_SENSE_10: u8 = 0x5a;
pub const PERSISTENT_RESERVE_IN: u8 = 0x5e;
pub const PERSISTENT_RESERVE_OUT: u8 = 0x5f;
pub const VARIABLE_LENGTH_CMD: u8 = 0x7f;
pub const EXTENDED_COPY: u8 = 0x83;
pub const RECEIVE_COPY_RESULTS: u8 = 0x84;
pub const READ_16: u8 = 0x88;
pub const COMPARE_AND_WRITE: u8 = 0x89;
pub const WRITE_16: u8 = 0x8a;
pub const READ_ATTRIBUTE: u8 = 0x8c;
pub const WRITE_ATTRIBUTE: u8 = 0x8d;
pub const WRITE_VERIFY_16: u8 = 0x8e;
pub const VERIFY_16: u8 = 0x8f;
pub const SYNCHRONIZE_CACHE_16: u8 = 0x91;
pub const WRITE_SAME_16: u8 = 0x93;
pub const SERVICE_ACTION_IN_16: u8 = 0x9e;
pub const REPORT_LUNS: u8 = 0xa0;
pub const SECURITY_PROTOCOL_IN: u8 = 0xa2;
pub const MAINTENANCE_IN: u8 = 0xa3;
pub const MAINTENANCE_OUT: u8 = 0xa4;
pub const READ_12: u8 = 0xa8;
pub const WRITE_12: u8 = 0xaa;
pub const SECURITY_PROTOCOL_OUT: u8 = 0xb5;

// Service actions.
pub const SAI_READ_CAPACITY_16: u8 = 0x10;
pub const SAI_REPORT_REFERRALS: u8 = 0x13;
pub const MI_REPORT_TARGET_PGS: u8 = 0x0a;
pub const MI_REPORT_SUPPORTED_OPERATION_CODES: u8 = 0x0c;
pub const MO_SET_TARGET_PGS: u8 = 0x0a;
pub const WRITE_SAME_32: u8 = 0x0d;
pub const EXTENDED_COPY_LID1: u8 = 0x00;
pub const RCR_SA_OPERATING_PARAMETERS: u8 = 0x03;

pub const PRI_READ_KEYS: u8 = 0x00;
pub const PRI_READ_RESERVATION: u8 = 0x01;
pub const PRI_REPORT_CAPABILITIES: u8 = 0x02;
pub const PRI_READ_FULL_STATUS: u8 = 0x03;

pub const PRO_REGISTER: u8 = 0x00;
pub const PRO_RESERVE: u8 = 0x01;
pub const PRO_RELEASE: u8 = 0x02;
pub const PRO_CLEAR: u8 = 0x03;
pub const PRO_PREEMPT: u8 = 0x04;
pub const PRO_PREEMPT_AND_ABORT: u8 = 0x05;
pub const PRO_REGISTER_AND_IGNORE_EXISTING_KEY: u8 = 0x06;
pub const PRO_REGISTER_AND_MOVE: u8 = 0x07;
pub const PRO_REPLACE_LOST_RESERVATION: u8 = 0x08;

/// Usage mask for the CONTROL byte: only NACA is meaningful.
pub const SCSI_CONTROL_MASK: u8 = 0x04;
/// Usage mask for GROUP NUMBER fields.
pub const SCSI_GROUP_NUMBER_MASK: u8 = 0x3f;

/// Support level reported in the one-command descriptor format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Support {
    NotSupported = 1,
    Full = 3,
}

/// Availability predicate evaluated against live device/session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Always,
    /// Persistent-reservation emulation, with the carve-outs backend
    /// PR passthrough imposes.
    PrEmulation,
    /// Backend can satisfy WRITE SAME, directly or via unmap.
    WriteSame,
    CompareAndWrite,
    Unmap,
    /// A referral LBA map is configured.
    Referrals,
    Rsoc,
    /// LUN belongs to a target port group in explicit-ALUA mode.
    ExplicitAlua,
    ThirdPartyCopy,
}

/// Per-device correction of the usage-bits template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsagePatch {
    None,
    /// DPO/FUA bits in byte 1 of 10/12/16-byte medium-access CDBs.
    DpoFua,
    /// DPO/FUA bits in byte 10 of the WRITE SAME (32) CDB.
    DpoFua32,
}

/// Optional command-timeouts values emitted when CTDP is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTimeouts {
    pub specific: u8,
    pub nominal: u32,
    pub recommended: u32,
}

/// One entry of the command table.
///
/// The usage-bits template always has exactly `cdb_size` bytes and opens
/// with the opcode (and service action, where the CDB carries one).
#[derive(Debug)]
pub struct OpcodeDescriptor {
    pub opcode: u8,
    pub service_action: Option<u16>,
    pub cdb_size: u16,
    pub usage_bits: &'static [u8],
    pub support: Support,
    pub gate: Gate,
    pub usage_patch: UsagePatch,
    pub timeouts: Option<CommandTimeouts>,
}

impl OpcodeDescriptor {
    const fn new(opcode: u8, usage_bits: &'static [u8]) -> Self {
        Self {
            opcode,
            service_action: None,
            cdb_size: usage_bits.len() as u16,
            usage_bits,
            support: Support::Full,
            gate: Gate::Always,
            usage_patch: UsagePatch::None,
            timeouts: None,
        }
    }

    const fn with_sa(opcode: u8, service_action: u16, usage_bits: &'static [u8]) -> Self {
        let mut d = Self::new(opcode, usage_bits);
        d.service_action = Some(service_action);
        d
    }

    const fn gated(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    const fn patched(mut self, patch: UsagePatch) -> Self {
        self.usage_patch = patch;
        self
    }

    /// Re-evaluate this descriptor's availability for one command.
    pub fn is_enabled(&self, ctx: &CommandContext) -> bool {
        let dev = ctx.dev;
        match self.gate {
            Gate::Always => true,
            Gate::PrEmulation => self.pr_enabled(dev),
            Gate::WriteSame => {
                (dev.emulate_tpws && dev.backend_unmap) || dev.backend_write_same
            }
            Gate::CompareAndWrite => dev.emulate_caw,
            Gate::Unmap => dev.backend_unmap && dev.emulate_tpu,
            Gate::Referrals => dev.lba_map_snapshot().is_some(),
            Gate::Rsoc => dev.emulate_rsoc,
            Gate::ExplicitAlua => ctx
                .lun
                .alua_group()
                .is_some_and(|gp| gp.access_type.contains(crate::device::AluaAccessType::EXPLICIT)),
            Gate::ThirdPartyCopy => dev.emulate_3pc,
        }
    }

    fn pr_enabled(&self, dev: &Device) -> bool {
        if !dev.emulate_pr {
            return false;
        }
        if !dev.passthrough_pgr {
            return true;
        }
        // Backend pr_ops have no access to ports and I_T nexuses, and do
        // not cover SPC-2 reservations at all.
        match (self.opcode, self.service_action) {
            (RESERVE | RESERVE_10 | RELEASE | RELEASE_10, _) => false,
            (PERSISTENT_RESERVE_OUT, Some(sa))
                if sa == PRO_REGISTER_AND_MOVE as u16
                    || sa == PRO_REPLACE_LOST_RESERVATION as u16 =>
            {
                false
            }
            (PERSISTENT_RESERVE_IN, Some(sa)) if sa == PRI_READ_FULL_STATUS as u16 => false,
            _ => true,
        }
    }

    /// The usage-bits template with per-device corrections applied.
    pub fn patched_usage_bits(&self, dev: &Device) -> Vec<u8> {
        let mut bits = self.usage_bits.to_vec();
        match self.usage_patch {
            UsagePatch::None => {}
            UsagePatch::DpoFua => set_dpofua(&mut bits[1], dev),
            UsagePatch::DpoFua32 => set_dpofua(&mut bits[10], dev),
        }
        bits
    }
}

fn set_dpofua(byte: &mut u8, dev: &Device) {
    if dev.check_fua() {
        *byte |= 0x18;
    } else {
        *byte &= !0x18;
    }
}

/// Every command this target knows about, in reporting order.
#[rustfmt::skip]
pub static SUPPORTED_OPCODES: &[OpcodeDescriptor] = &[
    OpcodeDescriptor::new(READ_6,
        &[READ_6, 0x1f, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(READ_10,
        &[READ_10, 0xf8, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .patched(UsagePatch::DpoFua),
    OpcodeDescriptor::new(READ_12,
        &[READ_12, 0xf8, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, SCSI_CONTROL_MASK])
        .patched(UsagePatch::DpoFua),
    OpcodeDescriptor::new(READ_16,
        &[READ_16, 0xf8, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, SCSI_CONTROL_MASK])
        .patched(UsagePatch::DpoFua),
    OpcodeDescriptor::new(WRITE_6,
        &[WRITE_6, 0x1f, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(WRITE_10,
        &[WRITE_10, 0xf8, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .patched(UsagePatch::DpoFua),
    OpcodeDescriptor::new(WRITE_VERIFY,
        &[WRITE_VERIFY, 0xf0, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .patched(UsagePatch::DpoFua),
    OpcodeDescriptor::new(WRITE_12,
        &[WRITE_12, 0xf8, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, SCSI_CONTROL_MASK])
        .patched(UsagePatch::DpoFua),
    OpcodeDescriptor::new(WRITE_16,
        &[WRITE_16, 0xf8, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, SCSI_CONTROL_MASK])
        .patched(UsagePatch::DpoFua),
    OpcodeDescriptor::new(WRITE_VERIFY_16,
        &[WRITE_VERIFY_16, 0xf0, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, SCSI_CONTROL_MASK])
        .patched(UsagePatch::DpoFua),
    OpcodeDescriptor::with_sa(VARIABLE_LENGTH_CMD, WRITE_SAME_32 as u16,
        &[VARIABLE_LENGTH_CMD, SCSI_CONTROL_MASK, 0x00, 0x00,
          0x00, 0x00, SCSI_GROUP_NUMBER_MASK, 0x18,
          0x00, WRITE_SAME_32, 0xe8, 0x00,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0x00, 0x00, 0x00, 0x00,
          0x00, 0x00, 0x00, 0x00,
          0xff, 0xff, 0xff, 0xff])
        .gated(Gate::WriteSame)
        .patched(UsagePatch::DpoFua32),
    OpcodeDescriptor::new(COMPARE_AND_WRITE,
        &[COMPARE_AND_WRITE, 0x18, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, 0x00, 0x00,
          0x00, 0xff, SCSI_GROUP_NUMBER_MASK, SCSI_CONTROL_MASK])
        .gated(Gate::CompareAndWrite)
        .patched(UsagePatch::DpoFua),
    OpcodeDescriptor::new(READ_CAPACITY,
        &[READ_CAPACITY, 0x00, 0xff, 0xff,
          0xff, 0xff, 0x00, 0x00,
          0x01, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::with_sa(SERVICE_ACTION_IN_16, SAI_READ_CAPACITY_16 as u16,
        &[SERVICE_ACTION_IN_16, SAI_READ_CAPACITY_16, 0x00, 0x00,
          0x00, 0x00, 0x00, 0x00,
          0x00, 0x00, 0xff, 0xff,
          0xff, 0xff, 0x00, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::with_sa(SERVICE_ACTION_IN_16, SAI_REPORT_REFERRALS as u16,
        &[SERVICE_ACTION_IN_16, SAI_REPORT_REFERRALS, 0x00, 0x00,
          0x00, 0x00, 0x00, 0x00,
          0x00, 0x00, 0xff, 0xff,
          0xff, 0xff, 0x00, SCSI_CONTROL_MASK])
        .gated(Gate::Referrals),
    OpcodeDescriptor::new(SYNCHRONIZE_CACHE,
        &[SYNCHRONIZE_CACHE, 0x02, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(SYNCHRONIZE_CACHE_16,
        &[SYNCHRONIZE_CACHE_16, 0x02, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(UNMAP,
        &[UNMAP, 0x00, 0x00, 0x00,
          0x00, 0x00, SCSI_GROUP_NUMBER_MASK, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::Unmap),
    OpcodeDescriptor::new(WRITE_SAME,
        &[WRITE_SAME, 0xe8, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::WriteSame),
    OpcodeDescriptor::new(WRITE_SAME_16,
        &[WRITE_SAME_16, 0xe8, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, SCSI_CONTROL_MASK])
        .gated(Gate::WriteSame),
    OpcodeDescriptor::new(VERIFY,
        &[VERIFY, 0x00, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(VERIFY_16,
        &[VERIFY_16, 0x00, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, SCSI_GROUP_NUMBER_MASK, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(START_STOP,
        &[START_STOP, 0x01, 0x00, 0x00,
          0x01, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(MODE_SELECT,
        &[MODE_SELECT, 0x10, 0x00, 0x00,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(MODE_SELECT_10,
        &[MODE_SELECT_10, 0x10, 0x00, 0x00,
          0x00, 0x00, 0x00, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(MODE_SENSE,
        &[MODE_SENSE, 0x08, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(MODE_SENSE_10,
        &[MODE_SENSE_10, 0x18, 0xff, 0xff,
          0x00, 0x00, 0x00, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_IN, PRI_READ_KEYS as u16,
        &[PERSISTENT_RESERVE_IN, PRI_READ_KEYS, 0x00, 0x00,
          0x00, 0x00, 0x00, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_IN, PRI_READ_RESERVATION as u16,
        &[PERSISTENT_RESERVE_IN, PRI_READ_RESERVATION, 0x00, 0x00,
          0x00, 0x00, 0x00, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_IN, PRI_REPORT_CAPABILITIES as u16,
        &[PERSISTENT_RESERVE_IN, PRI_REPORT_CAPABILITIES, 0x00, 0x00,
          0x00, 0x00, 0x00, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_IN, PRI_READ_FULL_STATUS as u16,
        &[PERSISTENT_RESERVE_IN, PRI_READ_FULL_STATUS, 0x00, 0x00,
          0x00, 0x00, 0x00, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_OUT, PRO_REGISTER as u16,
        &[PERSISTENT_RESERVE_OUT, PRO_REGISTER, 0xff, 0x00,
          0x00, 0xff, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_OUT, PRO_RESERVE as u16,
        &[PERSISTENT_RESERVE_OUT, PRO_RESERVE, 0xff, 0x00,
          0x00, 0xff, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_OUT, PRO_RELEASE as u16,
        &[PERSISTENT_RESERVE_OUT, PRO_RELEASE, 0xff, 0x00,
          0x00, 0xff, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_OUT, PRO_CLEAR as u16,
        &[PERSISTENT_RESERVE_OUT, PRO_CLEAR, 0xff, 0x00,
          0x00, 0xff, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_OUT, PRO_PREEMPT as u16,
        &[PERSISTENT_RESERVE_OUT, PRO_PREEMPT, 0xff, 0x00,
          0x00, 0xff, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_OUT, PRO_PREEMPT_AND_ABORT as u16,
        &[PERSISTENT_RESERVE_OUT, PRO_PREEMPT_AND_ABORT, 0xff, 0x00,
          0x00, 0xff, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_OUT, PRO_REGISTER_AND_IGNORE_EXISTING_KEY as u16,
        &[PERSISTENT_RESERVE_OUT, PRO_REGISTER_AND_IGNORE_EXISTING_KEY, 0xff, 0x00,
          0x00, 0xff, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::with_sa(PERSISTENT_RESERVE_OUT, PRO_REGISTER_AND_MOVE as u16,
        &[PERSISTENT_RESERVE_OUT, PRO_REGISTER_AND_MOVE, 0xff, 0x00,
          0x00, 0xff, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::new(RELEASE,
        &[RELEASE, 0x00, 0x00, 0x00,
          0x00, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::new(RELEASE_10,
        &[RELEASE_10, 0x00, 0x00, 0x00,
          0x00, 0x00, 0x00, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::new(RESERVE,
        &[RESERVE, 0x00, 0x00, 0x00,
          0x00, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::new(RESERVE_10,
        &[RESERVE_10, 0x00, 0x00, 0x00,
          0x00, 0x00, 0x00, 0xff,
          0xff, SCSI_CONTROL_MASK])
        .gated(Gate::PrEmulation),
    OpcodeDescriptor::new(REQUEST_SENSE,
        &[REQUEST_SENSE, 0x00, 0x00, 0x00,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(INQUIRY,
        &[INQUIRY, 0x01, 0xff, 0xff,
          0xff, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::with_sa(EXTENDED_COPY, EXTENDED_COPY_LID1 as u16,
        &[EXTENDED_COPY, 0x00, 0x00, 0x00,
          0x00, 0x00, 0x00, 0x00,
          0x00, 0x00, 0xff, 0xff,
          0xff, 0xff, 0x00, SCSI_CONTROL_MASK])
        .gated(Gate::ThirdPartyCopy),
    OpcodeDescriptor::with_sa(RECEIVE_COPY_RESULTS, RCR_SA_OPERATING_PARAMETERS as u16,
        &[RECEIVE_COPY_RESULTS, RCR_SA_OPERATING_PARAMETERS, 0x00, 0x00,
          0x00, 0x00, 0x00, 0x00,
          0x00, 0x00, 0xff, 0xff,
          0xff, 0xff, 0x00, SCSI_CONTROL_MASK])
        .gated(Gate::ThirdPartyCopy),
    OpcodeDescriptor::new(REPORT_LUNS,
        &[REPORT_LUNS, 0x00, 0xff, 0x00,
          0x00, 0x00, 0xff, 0xff,
          0xff, 0xff, 0x00, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::new(TEST_UNIT_READY,
        &[TEST_UNIT_READY, 0x00, 0x00, 0x00,
          0x00, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::with_sa(MAINTENANCE_IN, MI_REPORT_TARGET_PGS as u16,
        &[MAINTENANCE_IN, 0xe0 | MI_REPORT_TARGET_PGS, 0x00, 0x00,
          0x00, 0x00, 0xff, 0xff,
          0xff, 0xff, 0x00, SCSI_CONTROL_MASK]),
    OpcodeDescriptor::with_sa(MAINTENANCE_IN, MI_REPORT_SUPPORTED_OPERATION_CODES as u16,
        &[MAINTENANCE_IN, MI_REPORT_SUPPORTED_OPERATION_CODES, 0x87, 0xff,
          0xff, 0xff, 0xff, 0xff,
          0xff, 0xff, 0x00, SCSI_CONTROL_MASK])
        .gated(Gate::Rsoc),
    OpcodeDescriptor::with_sa(MAINTENANCE_OUT, MO_SET_TARGET_PGS as u16,
        &[MAINTENANCE_OUT, MO_SET_TARGET_PGS, 0x00, 0x00,
          0x00, 0x00, 0xff, 0xff,
          0xff, 0xff, 0x00, SCSI_CONTROL_MASK])
        .gated(Gate::ExplicitAlua),
];

/// CDB length implied by an opcode's command group.
pub const fn cdb_group_size(opcode: u8) -> usize {
    // Group code is the top three bits of the opcode.
    const GROUP_SIZES: [usize; 8] = [6, 10, 10, 12, 16, 12, 10, 10];
    GROUP_SIZES[(opcode >> 5) as usize]
}
