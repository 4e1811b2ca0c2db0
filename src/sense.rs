// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! Structured sense reporting. Every command failure this crate produces
//! is one of the [`SenseReason`] values below; the transport renders it
//! into fixed-format sense data with [`SenseReason::to_fixed_sense`].

use thiserror::Error;

pub const NO_SENSE: u8 = 0x0;
pub const NOT_READY: u8 = 0x2;
pub const ILLEGAL_REQUEST: u8 = 0x5;
pub const UNIT_ATTENTION: u8 = 0x6;

/// A (sense key, additional sense code, qualifier) triple.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct SenseTriple(pub u8, pub u8, pub u8);

impl SenseTriple {
    pub fn to_fixed_sense(self) -> Vec<u8> {
        vec![
            0x70,   // response code (fixed, current); valid bit (0)
            0x0,    // reserved
            self.0, // sk; various upper bits 0
            0x0, 0x0, 0x0, 0x0, // information
            0xa, // add'l sense length
            0x0, 0x0, 0x0, 0x0,    // cmd-specific information
            self.1, // asc
            self.2, // ascq
            0x0,    // field-replaceable unit code
            0x0, 0x0, 0x0, // sense-key-specific information
        ]
    }

    /// Descriptor-format (SPC-4 4.5.2) rendering, header only. Used for
    /// REQUEST SENSE once device LBAs no longer fit the fixed format's
    /// 32-bit information field.
    pub fn to_descriptor_sense(self) -> Vec<u8> {
        vec![
            0x72,   // response code (descriptor, current)
            self.0, // sk
            self.1, // asc
            self.2, // ascq
            0x0, 0x0, 0x0, // reserved
            0x0, // add'l sense length
        ]
    }
}

pub const NO_ADDITIONAL_SENSE_INFORMATION: SenseTriple = SenseTriple(NO_SENSE, 0, 0);

/// Reason a command was failed by the device server.
///
/// The variants are the sense conditions the SPC emulation layer can
/// raise on its own; collaborator-owned failures (reservation conflicts,
/// ALUA transitions) never originate here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SenseReason {
    #[error("unsupported SCSI opcode")]
    UnsupportedOpcode,
    #[error("invalid field in CDB")]
    InvalidCdbField,
    #[error("invalid field in parameter list")]
    InvalidParameterList,
    #[error("parameter list length error")]
    ParameterListLengthError,
    #[error("unknown mode page")]
    UnknownModePage,
    #[error("logical unit communication failure")]
    LogicalUnitCommunicationFailure,
}

impl SenseReason {
    pub const fn sense(self) -> SenseTriple {
        match self {
            Self::UnsupportedOpcode => SenseTriple(ILLEGAL_REQUEST, 0x20, 0x0),
            Self::InvalidCdbField => SenseTriple(ILLEGAL_REQUEST, 0x24, 0x0),
            Self::InvalidParameterList => SenseTriple(ILLEGAL_REQUEST, 0x26, 0x0),
            Self::ParameterListLengthError => SenseTriple(ILLEGAL_REQUEST, 0x1a, 0x0),
            // INVALID FIELD IN CDB, same as the page/subpage being one we
            // never heard of.
            Self::UnknownModePage => SenseTriple(ILLEGAL_REQUEST, 0x24, 0x0),
            Self::LogicalUnitCommunicationFailure => SenseTriple(NOT_READY, 0x08, 0x0),
        }
    }

    pub fn to_fixed_sense(self) -> Vec<u8> {
        self.sense().to_fixed_sense()
    }
}

/// Build the sense buffer REQUEST SENSE returns: a latched unit
/// attention if one is pending, NO SENSE otherwise.
pub fn request_sense_data(ua: Option<(u8, u8)>, desc_format: bool) -> Vec<u8> {
    let triple = match ua {
        Some((asc, ascq)) => SenseTriple(UNIT_ATTENTION, asc, ascq),
        None => NO_ADDITIONAL_SENSE_INFORMATION,
    };
    if desc_format {
        triple.to_descriptor_sense()
    } else {
        triple.to_fixed_sense()
    }
}
