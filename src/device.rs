// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! Read-only views of the collaborators a command executes against: the
//! backing device, the LUN it was addressed through, the target port, and
//! the initiator session.
//!
//! The emulation layer only ever queries these. The two pieces of state
//! that administrative reconfiguration can swap underneath a running
//! command (ALUA target-port-group membership, LU-group membership) sit
//! behind `RwLock`s and are read exactly once per command as owned
//! copies. The single mutation the layer performs anywhere is clearing
//! the unit-attention latch on [`Session`] from REQUEST SENSE.

use std::sync::{Mutex, RwLock};

use bitflags::bitflags;
use num_enum::TryFromPrimitive;

pub const INQUIRY_VENDOR_LEN: usize = 8;
pub const INQUIRY_MODEL_LEN: usize = 16;
pub const INQUIRY_REVISION_LEN: usize = 4;

/// SCSI peripheral device type, as reported in INQUIRY byte 0.
#[derive(PartialEq, Eq, TryFromPrimitive, Debug, Copy, Clone)]
#[repr(u8)]
pub enum DeviceType {
    Disk = 0x00,
    Tape = 0x01,
    Processor = 0x03,
    Rom = 0x05,
    Enclosure = 0x0d,
}

/// T10-PI protection type configured on a device or negotiated by a
/// session.
#[derive(PartialEq, Eq, TryFromPrimitive, Debug, Copy, Clone, Default)]
#[repr(u8)]
pub enum ProtectType {
    #[default]
    None = 0,
    Type1 = 1,
    Type2 = 2,
    Type3 = 3,
}

bitflags! {
    /// Protection operations the fabric supports for a session.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ProtOps: u8 {
        const DIN_INSERT = 0x01;
        const DOUT_INSERT = 0x02;
        const DIN_STRIP = 0x04;
        const DOUT_STRIP = 0x08;
        const DIN_PASS = 0x10;
        const DOUT_PASS = 0x20;
    }
}

bitflags! {
    /// ALUA access type bits of a target port group, in the encoding of
    /// the INQUIRY TPGS field (byte 5 bits 4-5).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AluaAccessType: u8 {
        const IMPLICIT = 0x10;
        const EXPLICIT = 0x20;
    }
}

/// Snapshot of a target port group taken once per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluaGroup {
    pub id: u16,
    pub access_type: AluaAccessType,
}

/// SCSI transport protocol identifier of the fabric (SPC-4 7.5.1).
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
#[repr(u8)]
pub enum ProtocolId {
    Fcp = 0x0,
    Spi = 0x1,
    Sbp = 0x3,
    Srp = 0x4,
    Iscsi = 0x5,
    Sas = 0x6,
}

/// Referral/LBA-map state: presence of a map enables the Referrals VPD
/// page content and the REPORT REFERRALS opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LbaMap {
    pub segment_size: u32,
    pub segment_multiplier: u32,
}

/// Unit-attention interlocks control mode (control mode page byte 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UaInterlock {
    #[default]
    Clear,
    NoClear,
    EstablishUa,
}

/// Capability snapshot of the addressed backing device.
///
/// Valid for the duration of one command; the emulation layer never
/// writes to it. Fields mirror what the backend and configuration layer
/// expose, not what SPC mandates: the page emulators translate.
#[derive(Debug)]
pub struct Device {
    pub dev_type: DeviceType,

    // T10 WWN identity
    pub vendor: String,
    pub model: String,
    pub revision: String,
    /// Configured unit serial. `None` means no VPD unit serial has been
    /// set yet, which suppresses the NAA designator and all EVPD page
    /// advertisement.
    pub unit_serial: Option<String>,
    /// IEEE OUI used for the NAA Registered Extended designator.
    pub company_id: u32,

    // Geometry
    pub block_size: u32,
    pub hw_block_size: u32,
    pub blocks: u64,
    pub hw_max_sectors: u32,
    pub optimal_sectors: u32,
    pub io_min: Option<u32>,
    pub io_opt: Option<u32>,
    pub is_nonrot: bool,

    // Feature emulation switches
    pub emulate_3pc: bool,
    pub emulate_caw: bool,
    pub emulate_pr: bool,
    pub emulate_rsoc: bool,
    pub emulate_tpu: bool,
    pub emulate_tpws: bool,
    pub emulate_tas: bool,
    pub emulate_rest_reord: bool,
    pub emulate_write_cache: bool,
    pub emulate_fua_write: bool,
    pub ua_interlock: UaInterlock,
    pub pi_prot_type: ProtectType,

    // Backend capabilities
    /// The backend handles persistent reservations itself; the SPC-2
    /// RESERVE/RELEASE opcodes and a few PR service actions are not
    /// available in that mode.
    pub passthrough_pgr: bool,
    pub backend_write_cache: bool,
    pub backend_unmap: bool,
    pub backend_write_same: bool,

    // Thin-provisioning limits for the Block Limits VPD page
    pub max_unmap_lba_count: u32,
    pub max_unmap_block_desc_count: u32,
    pub unmap_granularity: u32,
    pub unmap_granularity_alignment: u32,
    pub unmap_zeroes_data: bool,
    pub max_write_same_len: u64,

    /// Number of fabric ports this device is exported through.
    pub export_count: u32,

    /// Referral map, swappable by administrative action.
    pub lba_map: RwLock<Option<LbaMap>>,
    /// LU group membership, swappable by administrative action.
    pub lu_group: RwLock<Option<u16>>,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            dev_type: DeviceType::Disk,
            vendor: "LIO-ORG".to_owned(),
            model: "EMULATED-DISK".to_owned(),
            revision: "4.0".to_owned(),
            unit_serial: None,
            company_id: 0x001405,
            block_size: 512,
            hw_block_size: 512,
            blocks: 0,
            hw_max_sectors: 128,
            optimal_sectors: 128,
            io_min: None,
            io_opt: None,
            is_nonrot: false,
            emulate_3pc: true,
            emulate_caw: true,
            emulate_pr: true,
            emulate_rsoc: true,
            emulate_tpu: false,
            emulate_tpws: false,
            emulate_tas: true,
            emulate_rest_reord: false,
            emulate_write_cache: false,
            emulate_fua_write: true,
            ua_interlock: UaInterlock::Clear,
            pi_prot_type: ProtectType::None,
            passthrough_pgr: false,
            backend_write_cache: false,
            backend_unmap: false,
            backend_write_same: false,
            max_unmap_lba_count: 0,
            max_unmap_block_desc_count: 0,
            unmap_granularity: 0,
            unmap_granularity_alignment: 0,
            unmap_zeroes_data: false,
            max_write_same_len: 0,
            export_count: 1,
            lba_map: RwLock::new(None),
            lu_group: RwLock::new(None),
        }
    }
}

impl Device {
    /// Whether write-cache is in effect, either emulated or reported by
    /// the backend.
    pub fn check_wce(&self) -> bool {
        self.emulate_write_cache || self.backend_write_cache
    }

    /// Whether the DPO/FUA bits are honored on medium-access commands.
    pub fn check_fua(&self) -> bool {
        self.emulate_fua_write && self.check_wce()
    }

    /// Descriptor-format sense is used once LBAs stop fitting in the
    /// 32-bit information field of fixed-format sense.
    pub fn sense_desc_format(&self) -> bool {
        self.blocks > u64::from(u32::MAX)
    }

    /// Snapshot the referral map once for the running command.
    pub fn lba_map_snapshot(&self) -> Option<LbaMap> {
        *self.lba_map.read().unwrap()
    }

    pub fn lu_group_snapshot(&self) -> Option<u16> {
        *self.lu_group.read().unwrap()
    }
}

/// The logical unit a command was addressed through.
#[derive(Debug)]
pub struct Lun {
    /// Relative target port identifier of the exporting port.
    pub rtpi: u16,
    pub read_only: bool,
    /// ALUA target-port-group membership; reassignable by administrative
    /// reconfiguration while commands are in flight.
    pub tg_pt_gp: RwLock<Option<AluaGroup>>,
}

impl Lun {
    pub fn new(rtpi: u16) -> Self {
        Self {
            rtpi,
            read_only: false,
            tg_pt_gp: RwLock::new(None),
        }
    }

    /// One atomic read of the group membership for the whole command.
    pub fn alua_group(&self) -> Option<AluaGroup> {
        *self.tg_pt_gp.read().unwrap()
    }
}

/// Fabric-side identity of the target port the command arrived on.
#[derive(Debug)]
pub struct TargetPort {
    pub proto_id: ProtocolId,
    /// Fabric WWN of the portal group, e.g. an iSCSI IQN.
    pub wwn: String,
    /// Portal group tag.
    pub tag: u16,
    /// Fabric scatter-gather entry limit, zero for unlimited. Bounds the
    /// MAXIMUM TRANSFER LENGTH reported in the Block Limits VPD page.
    pub max_data_sg_nents: u32,
}

impl TargetPort {
    pub fn new(proto_id: ProtocolId, wwn: &str, tag: u16) -> Self {
        Self {
            proto_id,
            wwn: wwn.to_owned(),
            tag,
            max_data_sg_nents: 0,
        }
    }
}

/// Initiator session state consulted during command execution.
#[derive(Debug, Default)]
pub struct Session {
    /// Protection operations the fabric negotiated for this session.
    pub prot_ops: ProtOps,
    /// Protection type forced on unprotected devices for this session.
    pub prot_type: ProtectType,
    /// LUNs visible to this session; mutated by ACL changes while
    /// commands run, so readers take a point-in-time copy.
    pub luns: RwLock<Vec<u64>>,
    /// Latched unit attention (asc, ascq), reported and cleared by the
    /// next REQUEST SENSE.
    pub unit_attention: Mutex<Option<(u8, u8)>>,
}

impl Session {
    pub fn lun_snapshot(&self) -> Vec<u64> {
        self.luns.read().unwrap().clone()
    }

    /// Take and clear the pending unit attention, if any.
    pub fn clear_unit_attention(&self) -> Option<(u8, u8)> {
        self.unit_attention.lock().unwrap().take()
    }

    /// Whether T10-PI protection is in effect for commands on this
    /// session against the given device.
    pub fn protection_active(&self, dev: &Device) -> bool {
        self.prot_ops
            .intersects(ProtOps::DIN_PASS | ProtOps::DOUT_PASS)
            && (dev.pi_prot_type != ProtectType::None || self.prot_type != ProtectType::None)
    }

    /// The protection type governing this session's view of the device.
    pub fn effective_prot_type(&self, dev: &Device) -> ProtectType {
        if dev.pi_prot_type != ProtectType::None {
            dev.pi_prot_type
        } else {
            self.prot_type
        }
    }
}

/// Everything a single command's execution may consult.
///
/// `sess` is `None` for administrative passthrough commands that arrive
/// outside any fabric session; REPORT LUNS then reports only LUN 0 and
/// protection is treated as off.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub dev: &'a Device,
    pub lun: &'a Lun,
    pub port: &'a TargetPort,
    pub sess: Option<&'a Session>,
    /// Transport-level expected data transfer length for this command.
    pub data_length: usize,
}

impl CommandContext<'_> {
    pub fn protection_active(&self) -> bool {
        self.sess.is_some_and(|s| s.protection_active(self.dev))
    }

    pub fn effective_prot_type(&self) -> ProtectType {
        self.sess
            .map_or(ProtectType::None, |s| s.effective_prot_type(self.dev))
    }
}
