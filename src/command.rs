// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! CDB dispatch: map an incoming CDB to its expected transfer length, a
//! task-attribute hint, and a handler.
//!
//! Only commands addressed to the device server as a whole are accepted
//! here; medium-access commands belong to the device-type layer and come
//! back as [`CmdError::Sense`] with an unsupported-opcode sense.

use log::warn;

use crate::device::{Device, DeviceType};
use crate::opcode;
use crate::sense::SenseReason;
use crate::{CmdError, TaskAttr};

/// A command this crate executes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulatedOp {
    TestUnitReady,
    RequestSense,
    Inquiry,
    ModeSense { ten: bool },
    ModeSelect { ten: bool },
    ReportLuns,
    ReportSupportedOpCodes,
}

/// A command this layer sizes and routes but does not execute.
///
/// The caller owns the collaborator that implements each of these; a
/// transport may also fail them outright if it has no such collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalOp {
    LogSelect,
    LogSense,
    PersistentReserveIn,
    PersistentReserveOut,
    Release { ten: bool },
    Reserve { ten: bool },
    SecurityProtocolIn,
    SecurityProtocolOut,
    ExtendedCopy,
    ReceiveCopyResults,
    ReadAttribute,
    WriteAttribute,
    ReceiveDiagnostic,
    SendDiagnostic,
    WriteBuffer,
    ReportTargetPortGroups,
    SetTargetPortGroups,
    /// MAINTENANCE IN with a service action nobody emulates, or the
    /// multimedia SEND KEY alias on ROM devices.
    MaintenanceIn,
    MaintenanceOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpcHandler {
    Emulated(EmulatedOp),
    External(ExternalOp),
}

/// The outcome of parsing a CDB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCdb {
    /// Expected data transfer length, taken from the CDB's allocation
    /// length or parameter list length field.
    pub size: u32,
    pub task_attr: TaskAttr,
    pub handler: SpcHandler,
}

impl ParsedCdb {
    fn simple(size: u32, handler: SpcHandler) -> Self {
        Self {
            size,
            task_attr: TaskAttr::Simple,
            handler,
        }
    }
}

fn be16(cdb: &[u8], at: usize) -> u32 {
    u32::from(u16::from_be_bytes([cdb[at], cdb[at + 1]]))
}

fn be24(cdb: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([0, cdb[at], cdb[at + 1], cdb[at + 2]])
}

fn be32(cdb: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([cdb[at], cdb[at + 1], cdb[at + 2], cdb[at + 3]])
}

/// Parse a device-server CDB.
///
/// `data_length` is the transport's expected transfer length; the SPC-2
/// RESERVE/RELEASE 6-byte forms carry no length field, so the fabric's
/// value is passed through for them.
pub fn parse_cdb(cdb: &[u8], dev: &Device, data_length: u32) -> Result<ParsedCdb, CmdError> {
    use opcode::*;

    let op = *cdb.first().ok_or(CmdError::CdbTooShort)?;
    if cdb.len() < cdb_group_size(op) {
        return Err(CmdError::CdbTooShort);
    }

    // Reservation opcodes are refused up front when reservations are
    // not emulated, or (for SPC-2 reservations) when the backend owns
    // persistent reservations itself.
    match op {
        RESERVE | RESERVE_10 | RELEASE | RELEASE_10 => {
            if !dev.emulate_pr || dev.passthrough_pgr {
                return Err(SenseReason::UnsupportedOpcode.into());
            }
        }
        PERSISTENT_RESERVE_IN | PERSISTENT_RESERVE_OUT => {
            if !dev.emulate_pr {
                return Err(SenseReason::UnsupportedOpcode.into());
            }
        }
        _ => {}
    }

    let parsed = match op {
        MODE_SELECT => ParsedCdb::simple(
            u32::from(cdb[4]),
            SpcHandler::Emulated(EmulatedOp::ModeSelect { ten: false }),
        ),
        MODE_SELECT_10 => ParsedCdb::simple(
            be16(cdb, 7),
            SpcHandler::Emulated(EmulatedOp::ModeSelect { ten: true }),
        ),
        MODE_SENSE => ParsedCdb::simple(
            u32::from(cdb[4]),
            SpcHandler::Emulated(EmulatedOp::ModeSense { ten: false }),
        ),
        MODE_SENSE_10 => ParsedCdb::simple(
            be16(cdb, 7),
            SpcHandler::Emulated(EmulatedOp::ModeSense { ten: true }),
        ),
        LOG_SELECT => ParsedCdb::simple(be16(cdb, 7), SpcHandler::External(ExternalOp::LogSelect)),
        LOG_SENSE => ParsedCdb::simple(be16(cdb, 7), SpcHandler::External(ExternalOp::LogSense)),
        PERSISTENT_RESERVE_IN => ParsedCdb::simple(
            be16(cdb, 7),
            SpcHandler::External(ExternalOp::PersistentReserveIn),
        ),
        PERSISTENT_RESERVE_OUT => ParsedCdb::simple(
            be32(cdb, 5),
            SpcHandler::External(ExternalOp::PersistentReserveOut),
        ),
        RELEASE => ParsedCdb::simple(
            data_length,
            SpcHandler::External(ExternalOp::Release { ten: false }),
        ),
        RELEASE_10 => ParsedCdb::simple(
            be16(cdb, 7),
            SpcHandler::External(ExternalOp::Release { ten: true }),
        ),
        // The SPC-2 RESERVE CDB carries no length field; trust the
        // fabric's expected transfer length.
        RESERVE => ParsedCdb::simple(
            data_length,
            SpcHandler::External(ExternalOp::Reserve { ten: false }),
        ),
        RESERVE_10 => ParsedCdb::simple(
            be16(cdb, 7),
            SpcHandler::External(ExternalOp::Reserve { ten: true }),
        ),
        REQUEST_SENSE => ParsedCdb::simple(
            u32::from(cdb[4]),
            SpcHandler::Emulated(EmulatedOp::RequestSense),
        ),
        // Implicit HEAD OF QUEUE processing for INQUIRY (SPC-4 5.3).
        INQUIRY => ParsedCdb {
            size: be16(cdb, 3),
            task_attr: TaskAttr::HeadOfQueue,
            handler: SpcHandler::Emulated(EmulatedOp::Inquiry),
        },
        SECURITY_PROTOCOL_IN => ParsedCdb::simple(
            be32(cdb, 6),
            SpcHandler::External(ExternalOp::SecurityProtocolIn),
        ),
        SECURITY_PROTOCOL_OUT => ParsedCdb::simple(
            be32(cdb, 6),
            SpcHandler::External(ExternalOp::SecurityProtocolOut),
        ),
        EXTENDED_COPY => {
            ParsedCdb::simple(be32(cdb, 10), SpcHandler::External(ExternalOp::ExtendedCopy))
        }
        RECEIVE_COPY_RESULTS => ParsedCdb::simple(
            be32(cdb, 10),
            SpcHandler::External(ExternalOp::ReceiveCopyResults),
        ),
        READ_ATTRIBUTE => {
            ParsedCdb::simple(be32(cdb, 10), SpcHandler::External(ExternalOp::ReadAttribute))
        }
        WRITE_ATTRIBUTE => ParsedCdb::simple(
            be32(cdb, 10),
            SpcHandler::External(ExternalOp::WriteAttribute),
        ),
        RECEIVE_DIAGNOSTIC => ParsedCdb::simple(
            be16(cdb, 3),
            SpcHandler::External(ExternalOp::ReceiveDiagnostic),
        ),
        SEND_DIAGNOSTIC => {
            ParsedCdb::simple(be16(cdb, 3), SpcHandler::External(ExternalOp::SendDiagnostic))
        }
        WRITE_BUFFER => {
            ParsedCdb::simple(be24(cdb, 6), SpcHandler::External(ExternalOp::WriteBuffer))
        }
        // Implicit HEAD OF QUEUE processing for REPORT LUNS (SPC-4 5.3).
        REPORT_LUNS => ParsedCdb {
            size: be32(cdb, 6),
            task_attr: TaskAttr::HeadOfQueue,
            handler: SpcHandler::Emulated(EmulatedOp::ReportLuns),
        },
        TEST_UNIT_READY => ParsedCdb::simple(0, SpcHandler::Emulated(EmulatedOp::TestUnitReady)),
        MAINTENANCE_IN => {
            if dev.dev_type == DeviceType::Rom {
                // GPCMD SEND KEY alias from the multimedia command set.
                ParsedCdb::simple(be16(cdb, 8), SpcHandler::External(ExternalOp::MaintenanceIn))
            } else {
                let handler = match cdb[1] & 0x1f {
                    MI_REPORT_TARGET_PGS => {
                        SpcHandler::External(ExternalOp::ReportTargetPortGroups)
                    }
                    MI_REPORT_SUPPORTED_OPERATION_CODES => {
                        SpcHandler::Emulated(EmulatedOp::ReportSupportedOpCodes)
                    }
                    _ => SpcHandler::External(ExternalOp::MaintenanceIn),
                };
                ParsedCdb::simple(be32(cdb, 6), handler)
            }
        }
        MAINTENANCE_OUT => {
            if dev.dev_type == DeviceType::Rom {
                ParsedCdb::simple(be16(cdb, 8), SpcHandler::External(ExternalOp::MaintenanceOut))
            } else {
                let handler = if cdb[1] == MO_SET_TARGET_PGS {
                    SpcHandler::External(ExternalOp::SetTargetPortGroups)
                } else {
                    SpcHandler::External(ExternalOp::MaintenanceOut)
                };
                ParsedCdb::simple(be32(cdb, 6), handler)
            }
        }
        _ => {
            warn!("unsupported device-server opcode {op:#04x}");
            return Err(SenseReason::UnsupportedOpcode.into());
        }
    };

    Ok(parsed)
}
