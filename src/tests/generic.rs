// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

//! Dispatch behavior shared between commands.

use assert_matches::assert_matches;

use super::{do_command_fail, do_command_in, TestTarget};
use crate::command::{parse_cdb, EmulatedOp, ExternalOp, SpcHandler};
use crate::sense::SenseReason;
use crate::{CmdError, TaskAttr};

#[test]
fn test_invalid_opcode() {
    let target = TestTarget::new();

    do_command_fail(
        &target,
        &[
            0xff, // vendor specific, unused by us
            0, 0, 0, 0, 0, 0, 0, 0, 0,
        ],
        SenseReason::UnsupportedOpcode,
    );
}

#[test]
fn test_short_cdb() {
    let target = TestTarget::new();

    // INQUIRY is a 6-byte CDB
    let res = parse_cdb(&[0x12, 0, 0], &target.dev, 0);
    assert_matches!(res, Err(CmdError::CdbTooShort));

    let res = parse_cdb(&[], &target.dev, 0);
    assert_matches!(res, Err(CmdError::CdbTooShort));
}

#[test]
fn test_test_unit_ready() {
    let target = TestTarget::new();

    do_command_in(
        &target,
        &[
            0x00, // TEST UNIT READY
            0, 0, 0, 0, 0,
        ],
        &[],
    );
}

#[test]
fn test_head_of_queue_hints() {
    let target = TestTarget::new();

    let inquiry = parse_cdb(&[0x12, 0, 0, 1, 0, 0], &target.dev, 0).unwrap();
    assert_eq!(inquiry.task_attr, TaskAttr::HeadOfQueue);

    let report_luns = parse_cdb(
        &[0xa0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0],
        &target.dev,
        0,
    )
    .unwrap();
    assert_eq!(report_luns.task_attr, TaskAttr::HeadOfQueue);

    let mode_sense = parse_cdb(&[0x1a, 0, 0x08, 0, 255, 0], &target.dev, 0).unwrap();
    assert_eq!(mode_sense.task_attr, TaskAttr::Simple);
}

#[test]
fn test_reservation_opcodes_gated_on_pr_emulation() {
    let mut target = TestTarget::new();
    target.dev.emulate_pr = false;

    for cdb in [
        &[0x16_u8, 0, 0, 0, 0, 0][..],    // RESERVE (6)
        &[0x17, 0, 0, 0, 0, 0][..],       // RELEASE (6)
        &[0x5e, 0, 0, 0, 0, 0, 0, 0, 0, 0][..], // PERSISTENT RESERVE IN
        &[0x5f, 0, 0, 0, 0, 0, 0, 0, 0, 0][..], // PERSISTENT RESERVE OUT
    ] {
        let res = parse_cdb(cdb, &target.dev, 0);
        assert_matches!(
            res,
            Err(CmdError::Sense(SenseReason::UnsupportedOpcode)),
            "opcode {:#04x}",
            cdb[0]
        );
    }
}

#[test]
fn test_spc2_reservations_gated_on_pr_passthrough() {
    let mut target = TestTarget::new();
    target.dev.passthrough_pgr = true;

    // SPC-2 reservations cannot be passed through to backend pr_ops.
    let res = parse_cdb(&[0x16, 0, 0, 0, 0, 0], &target.dev, 0);
    assert_matches!(res, Err(CmdError::Sense(SenseReason::UnsupportedOpcode)));

    // SPC-3 persistent reservations still route to the collaborator.
    let res = parse_cdb(&[0x5e, 0, 0, 0, 0, 0, 0, 0, 0, 0], &target.dev, 0).unwrap();
    assert_eq!(
        res.handler,
        SpcHandler::External(ExternalOp::PersistentReserveIn)
    );
}

#[test]
fn test_external_op_sizing() {
    let target = TestTarget::new();

    // LOG SENSE: allocation length is bytes 7-8
    let parsed = parse_cdb(&[0x4d, 0, 0, 0, 0, 0, 0, 0x12, 0x34, 0], &target.dev, 0).unwrap();
    assert_eq!(parsed.handler, SpcHandler::External(ExternalOp::LogSense));
    assert_eq!(parsed.size, 0x1234);

    // WRITE BUFFER: parameter list length is 24 bits at bytes 6-8
    let parsed = parse_cdb(
        &[0x3b, 0, 0, 0, 0, 0, 0x01, 0x02, 0x03, 0],
        &target.dev,
        0,
    )
    .unwrap();
    assert_eq!(parsed.handler, SpcHandler::External(ExternalOp::WriteBuffer));
    assert_eq!(parsed.size, 0x0001_0203);

    // EXTENDED COPY: parameter list length at bytes 10-13
    let parsed = parse_cdb(
        &[0x83, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10, 0, 0, 0],
        &target.dev,
        0,
    )
    .unwrap();
    assert_eq!(parsed.handler, SpcHandler::External(ExternalOp::ExtendedCopy));
    assert_eq!(parsed.size, 0x1000);

    // SPC-2 RESERVE (6) carries no length field; the fabric-provided
    // expected length is used.
    let parsed = parse_cdb(&[0x16, 0, 0, 0, 0, 0], &target.dev, 512).unwrap();
    assert_eq!(
        parsed.handler,
        SpcHandler::External(ExternalOp::Reserve { ten: false })
    );
    assert_eq!(parsed.size, 512);
}

#[test]
fn test_maintenance_in_routing() {
    let target = TestTarget::new();

    let parsed = parse_cdb(
        &[0xa3, 0x0a, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0],
        &target.dev,
        0,
    )
    .unwrap();
    assert_eq!(
        parsed.handler,
        SpcHandler::External(ExternalOp::ReportTargetPortGroups)
    );

    let parsed = parse_cdb(
        &[0xa3, 0x0c, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0],
        &target.dev,
        0,
    )
    .unwrap();
    assert_eq!(
        parsed.handler,
        SpcHandler::Emulated(EmulatedOp::ReportSupportedOpCodes)
    );

    // unhandled service action still gets sized and routed out
    let parsed = parse_cdb(
        &[0xa3, 0x1f, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0],
        &target.dev,
        0,
    )
    .unwrap();
    assert_eq!(parsed.handler, SpcHandler::External(ExternalOp::MaintenanceIn));
}

#[test]
fn test_request_sense_no_sense() {
    let target = TestTarget::new();

    do_command_in(
        &target,
        &[
            0x03, // REQUEST SENSE
            0,    // fixed format
            0, 0, 252, // allocation length
            0,   // control
        ],
        &[
            0x70, 0, 0, // no sense
            0, 0, 0, 0, // information
            0xa, // additional sense length
            0, 0, 0, 0, // command-specific information
            0, 0, // asc, ascq
            0, 0, 0, 0, // fru, sense-key-specific
        ],
    );
}

#[test]
fn test_request_sense_desc_bit_rejected() {
    let target = TestTarget::new();

    do_command_fail(
        &target,
        &[
            0x03, // REQUEST SENSE
            0x01, // DESC
            0, 0, 252, 0,
        ],
        SenseReason::InvalidCdbField,
    );
}

#[test]
fn test_request_sense_reports_and_clears_unit_attention() {
    let target = TestTarget::new();
    // POWER ON, RESET, OR BUS DEVICE RESET OCCURRED
    *target.sess.unit_attention.lock().unwrap() = Some((0x29, 0x00));

    do_command_in(
        &target,
        &[0x03, 0, 0, 0, 252, 0],
        &[
            0x70, 0, 0x06, // unit attention
            0, 0, 0, 0, // information
            0xa, // additional sense length
            0, 0, 0, 0, // command-specific information
            0x29, 0x00, // asc, ascq
            0, 0, 0, 0,
        ],
    );

    // the latch is cleared by the first REQUEST SENSE
    do_command_in(
        &target,
        &[0x03, 0, 0, 0, 252, 0],
        &[
            0x70, 0, 0, 0, 0, 0, 0, 0xa, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ],
    );
}

#[test]
fn test_request_sense_truncated_by_allocation_length() {
    let target = TestTarget::new();

    do_command_in(
        &target,
        &[0x03, 0, 0, 0, 8, 0],
        &[0x70, 0, 0, 0, 0, 0, 0, 0xa],
    );
}

#[test]
fn test_request_sense_descriptor_format_device() {
    let mut target = TestTarget::new();
    // past 32-bit LBAs, sense switches to descriptor format
    target.dev.blocks = 1 << 33;

    do_command_in(
        &target,
        &[0x03, 0, 0, 0, 252, 0],
        &[
            0x72, 0, 0, 0, // no sense
            0, 0, 0, // reserved
            0, // additional sense length
        ],
    );
}
