// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

#![cfg(test)]

mod generic;
mod report_supported_operation_codes;

use crate::command::{self, SpcHandler};
use crate::device::{CommandContext, Device, Lun, ProtocolId, Session, TargetPort};
use crate::emulation;
use crate::sense::SenseReason;
use crate::{CmdError, CmdOutput};

/// One device behind one iSCSI port, the way most tests want it.
pub(crate) struct TestTarget {
    pub dev: Device,
    pub lun: Lun,
    pub port: TargetPort,
    pub sess: Session,
}

impl TestTarget {
    pub fn new() -> Self {
        let dev = Device {
            blocks: 8192,
            ..Device::default()
        };
        Self {
            dev,
            lun: Lun::new(1),
            port: TargetPort::new(ProtocolId::Iscsi, "iqn.2016-06.test:tgt", 1),
            sess: Session::default(),
        }
    }

    pub fn ctx(&self, data_length: usize) -> CommandContext {
        CommandContext {
            dev: &self.dev,
            lun: &self.lun,
            port: &self.port,
            sess: Some(&self.sess),
            data_length,
        }
    }
}

pub(crate) fn execute(
    target: &TestTarget,
    cdb: &[u8],
    data_out: &[u8],
) -> Result<CmdOutput, CmdError> {
    let parsed = command::parse_cdb(cdb, &target.dev, 0)?;
    let SpcHandler::Emulated(op) = parsed.handler else {
        panic!("expected an emulated handler for opcode {:#04x}", cdb[0]);
    };
    let ctx = target.ctx(parsed.size as usize);
    Ok(emulation::execute(&op, cdb, &ctx, data_out)?)
}

pub(crate) fn do_command_in(target: &TestTarget, cdb: &[u8], expected_data_in: &[u8]) {
    let out = execute(target, cdb, &[]).unwrap();
    assert_eq!(out.data, expected_data_in);
}

pub(crate) fn do_command_out(target: &TestTarget, cdb: &[u8], data_out: &[u8]) {
    let out = execute(target, cdb, data_out).unwrap();
    assert_eq!(out, CmdOutput::ok());
}

pub(crate) fn do_command_fail(target: &TestTarget, cdb: &[u8], expected: SenseReason) {
    do_command_fail_out(target, cdb, &[], expected);
}

pub(crate) fn do_command_fail_out(
    target: &TestTarget,
    cdb: &[u8],
    data_out: &[u8],
    expected: SenseReason,
) {
    match execute(target, cdb, data_out) {
        Err(CmdError::Sense(reason)) => assert_eq!(reason, expected),
        other => panic!("expected sense {expected:?}, got {other:?}"),
    }
}
