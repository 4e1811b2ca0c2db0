// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! Transport-independent emulation of the SCSI Primary Commands (SPC-4)
//! device-server behavior of a SCSI target.
//!
//! The crate does two things for the surrounding command pipeline:
//!
//! 1. [`command::parse_cdb`] maps an incoming CDB to the expected
//!    parameter/transfer length, a task-attribute scheduling hint, and a
//!    handler. Handlers split into [`command::EmulatedOp`]s this crate
//!    executes itself and [`command::ExternalOp`]s (persistent
//!    reservations, ALUA port-group commands, EXTENDED COPY, ...) the
//!    caller routes to its own collaborators.
//! 2. [`emulation::execute`] runs an emulated handler against a
//!    [`device::CommandContext`] and produces the response bytes, or a
//!    structured [`sense::SenseReason`] for a CHECK CONDITION.
//!
//! Everything operates on already-resident CDB and device-state data;
//! nothing here blocks, spawns, or owns shared state beyond the narrow
//! unit-attention latch on [`device::Session`].

pub mod command;
pub mod device;
pub mod emulation;
pub mod opcode;
pub mod sense;
#[cfg(test)]
mod tests;

use sense::SenseReason;

/// Task-attribute hint attached to a parsed command.
///
/// INQUIRY and REPORT LUNS get implicit head-of-queue processing (SPC-4
/// 5.3). This is advice for the outer queue, not an ordering guarantee
/// enforced here.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TaskAttr {
    Simple,
    HeadOfQueue,
}

/// The result of executing an emulated command.
#[derive(Debug, PartialEq, Eq)]
pub struct CmdOutput {
    /// Response bytes, already capped at the CDB's allocation length.
    pub data: Vec<u8>,
    /// Full length of the response before allocation-length truncation,
    /// for residual accounting by the transport.
    pub full_length: usize,
}

impl CmdOutput {
    pub(crate) const fn ok() -> Self {
        Self {
            data: Vec::new(),
            full_length: 0,
        }
    }
}

/// A transport-level error encountered while handling a SCSI command.
///
/// Anything the initiator should see as a CHECK CONDITION is a
/// [`SenseReason`] instead; this type is only for faults the transport
/// itself has to deal with.
#[derive(Debug, thiserror::Error)]
pub enum CmdError {
    /// The provided CDB is too short for its operation code.
    #[error("CDB too short for its operation code")]
    CdbTooShort,
    /// The command fails at the SCSI level with the given sense reason.
    #[error(transparent)]
    Sense(#[from] SenseReason),
}
