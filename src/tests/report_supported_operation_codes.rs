// SPDX-License-Identifier: Apache-2.0 or BSD-3-Clause

use super::{do_command_fail, do_command_in, TestTarget};
use crate::device::{AluaAccessType, AluaGroup};
use crate::sense::SenseReason;

#[test]
fn test_all_commands() {
    let target = TestTarget::new();

    // Thin-provisioning, write-same, referrals and explicit-ALUA
    // commands are gated off on the default device.
    #[rustfmt::skip]
    do_command_in(
        &target,
        &[
            0xa3, 0x0c, // REPORT SUPPORTED OPERATION CODES
            0,    // reporting options: all commands, no timeout descs
            0, 0, 0, // opcode/SA (ignored)
            0, 0, 4, 0, // allocation length: 1024
            0, // reserved
            0, // control
        ],
        &[
            0, 0, 0x01, 0x70, // command data length: 46 * 8
            // OC, res, SA (u16), res, flags, cdb len (u16)
            0x08, 0, 0, 0,    0, 0, 0, 6,  // READ (6)
            0x28, 0, 0, 0,    0, 0, 0, 10, // READ (10)
            0xa8, 0, 0, 0,    0, 0, 0, 12, // READ (12)
            0x88, 0, 0, 0,    0, 0, 0, 16, // READ (16)
            0x0a, 0, 0, 0,    0, 0, 0, 6,  // WRITE (6)
            0x2a, 0, 0, 0,    0, 0, 0, 10, // WRITE (10)
            0x2e, 0, 0, 0,    0, 0, 0, 10, // WRITE AND VERIFY (10)
            0xaa, 0, 0, 0,    0, 0, 0, 12, // WRITE (12)
            0x8a, 0, 0, 0,    0, 0, 0, 16, // WRITE (16)
            0x8e, 0, 0, 0,    0, 0, 0, 16, // WRITE AND VERIFY (16)
            0x89, 0, 0, 0,    0, 0, 0, 16, // COMPARE AND WRITE
            0x25, 0, 0, 0,    0, 0, 0, 10, // READ CAPACITY (10)
            0x9e, 0, 0, 0x10, 0, 1, 0, 16, // READ CAPACITY (16)
            0x35, 0, 0, 0,    0, 0, 0, 10, // SYNCHRONIZE CACHE (10)
            0x91, 0, 0, 0,    0, 0, 0, 16, // SYNCHRONIZE CACHE (16)
            0x2f, 0, 0, 0,    0, 0, 0, 10, // VERIFY (10)
            0x8f, 0, 0, 0,    0, 0, 0, 16, // VERIFY (16)
            0x1b, 0, 0, 0,    0, 0, 0, 6,  // START STOP UNIT
            0x15, 0, 0, 0,    0, 0, 0, 6,  // MODE SELECT (6)
            0x55, 0, 0, 0,    0, 0, 0, 10, // MODE SELECT (10)
            0x1a, 0, 0, 0,    0, 0, 0, 6,  // MODE SENSE (6)
            0x5a, 0, 0, 0,    0, 0, 0, 10, // MODE SENSE (10)
            0x5e, 0, 0, 0x00, 0, 1, 0, 10, // PR IN, READ KEYS
            0x5e, 0, 0, 0x01, 0, 1, 0, 10, // PR IN, READ RESERVATION
            0x5e, 0, 0, 0x02, 0, 1, 0, 10, // PR IN, REPORT CAPABILITIES
            0x5e, 0, 0, 0x03, 0, 1, 0, 10, // PR IN, READ FULL STATUS
            0x5f, 0, 0, 0x00, 0, 1, 0, 10, // PR OUT, REGISTER
            0x5f, 0, 0, 0x01, 0, 1, 0, 10, // PR OUT, RESERVE
            0x5f, 0, 0, 0x02, 0, 1, 0, 10, // PR OUT, RELEASE
            0x5f, 0, 0, 0x03, 0, 1, 0, 10, // PR OUT, CLEAR
            0x5f, 0, 0, 0x04, 0, 1, 0, 10, // PR OUT, PREEMPT
            0x5f, 0, 0, 0x05, 0, 1, 0, 10, // PR OUT, PREEMPT AND ABORT
            0x5f, 0, 0, 0x06, 0, 1, 0, 10, // PR OUT, REGISTER AND IGNORE
            0x5f, 0, 0, 0x07, 0, 1, 0, 10, // PR OUT, REGISTER AND MOVE
            0x17, 0, 0, 0,    0, 0, 0, 6,  // RELEASE (6)
            0x57, 0, 0, 0,    0, 0, 0, 10, // RELEASE (10)
            0x16, 0, 0, 0,    0, 0, 0, 6,  // RESERVE (6)
            0x56, 0, 0, 0,    0, 0, 0, 10, // RESERVE (10)
            0x03, 0, 0, 0,    0, 0, 0, 6,  // REQUEST SENSE
            0x12, 0, 0, 0,    0, 0, 0, 6,  // INQUIRY
            0x83, 0, 0, 0x00, 0, 1, 0, 16, // EXTENDED COPY (LID1)
            0x84, 0, 0, 0x03, 0, 1, 0, 16, // RECEIVE COPY RESULTS
            0xa0, 0, 0, 0,    0, 0, 0, 12, // REPORT LUNS
            0x00, 0, 0, 0,    0, 0, 0, 6,  // TEST UNIT READY
            0xa3, 0, 0, 0x0a, 0, 1, 0, 12, // REPORT TARGET PORT GROUPS
            0xa3, 0, 0, 0x0c, 0, 1, 0, 12, // REPORT SUPPORTED OPERATION CODES
        ],
    );
}

#[test]
fn test_all_commands_truncated() {
    let target = TestTarget::new();

    let out = super::execute(
        &target,
        &[0xa3, 0x0c, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0],
        &[],
    )
    .unwrap();
    assert_eq!(out.data, &[0, 0, 0x01, 0x70]);
    assert_eq!(out.full_length, 4 + 46 * 8);
}

#[test]
fn test_one_command() {
    let target = TestTarget::new();

    do_command_in(
        &target,
        &[
            0xa3, 0x0c, // REPORT SUPPORTED OPERATION CODES
            0b001, // reporting options: one command
            0x00, // opcode: TEST UNIT READY
            0, 0, // SA (ignored)
            0, 0, 1, 0, // allocation length: 256
            0, 0,
        ],
        &[
            0, 0b11, // CTDP off, supported
            0, 6, // cdb size
            0x00, 0, 0, 0, 0, 0x04, // usage bits
        ],
    );
}

#[test]
fn test_one_command_with_timeout_descriptor() {
    let target = TestTarget::new();

    do_command_in(
        &target,
        &[0xa3, 0x0c, 0x81, 0x00, 0, 0, 0, 0, 1, 0, 0, 0],
        &[
            0, 0x83, // CTDP, supported
            0, 6, // cdb size
            0x00, 0, 0, 0, 0, 0x04, // usage bits
            0, 0x0a, // timeouts descriptor length
            0, 0, // reserved, command specific
            0, 0, 0, 0, // nominal
            0, 0, 0, 0, // recommended
        ],
    );
}

#[test]
fn test_one_command_unknown_opcode() {
    let target = TestTarget::new();

    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b001, 0xee, 0, 0, 0, 0, 1, 0, 0, 0],
        &[0, 1], // not supported
    );
}

#[test]
fn test_one_command_gated_off_reports_unsupported() {
    let mut target = TestTarget::new();
    target.dev.emulate_caw = false;

    // COMPARE AND WRITE exists in the table but its gate is off
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b001, 0x89, 0, 0, 0, 0, 1, 0, 0, 0],
        &[0, 1],
    );

    // UNMAP is gated off on the default device
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b001, 0x42, 0, 0, 0, 0, 1, 0, 0, 0],
        &[0, 1],
    );
}

#[test]
fn test_one_command_with_service_actions_rejected() {
    let target = TestTarget::new();

    // SERVICE ACTION IN (16) has service actions; reporting option 001b
    // is not allowed for it
    do_command_fail(
        &target,
        &[0xa3, 0x0c, 0b001, 0x9e, 0, 0, 0, 0, 1, 0, 0, 0],
        SenseReason::InvalidCdbField,
    );
}

#[test]
fn test_one_service_action_without_service_actions_rejected() {
    let target = TestTarget::new();

    // TEST UNIT READY implements no service actions; reporting option
    // 010b is not allowed for it
    do_command_fail(
        &target,
        &[0xa3, 0x0c, 0b010, 0x00, 0, 0, 0, 0, 1, 0, 0, 0],
        SenseReason::InvalidCdbField,
    );
}

#[test]
fn test_one_service_action() {
    let target = TestTarget::new();

    do_command_in(
        &target,
        &[
            0xa3, 0x0c, 0b010, // one service action
            0x9e, // SERVICE ACTION IN (16)
            0x00, 0x10, // READ CAPACITY (16)
            0, 0, 1, 0, 0, 0,
        ],
        &[
            0, 0b11, 0, 16, // supported, cdb size
            0x9e, 0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0, 0x04,
        ],
    );
}

#[test]
fn test_reporting_option_three_matches_either_way() {
    let target = TestTarget::new();

    // 011b works for commands without service actions too (the
    // requested service action is simply zero)
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b011, 0x00, 0, 0, 0, 0, 1, 0, 0, 0],
        &[0, 0b11, 0, 6, 0x00, 0, 0, 0, 0, 0x04],
    );
}

#[test]
fn test_reserved_reporting_option() {
    let target = TestTarget::new();

    do_command_fail(
        &target,
        &[0xa3, 0x0c, 0b100, 0x00, 0, 0, 0, 0, 1, 0, 0, 0],
        SenseReason::InvalidCdbField,
    );
}

#[test]
fn test_rsoc_switch_off() {
    let mut target = TestTarget::new();
    target.dev.emulate_rsoc = false;

    do_command_fail(
        &target,
        &[0xa3, 0x0c, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0],
        SenseReason::UnsupportedOpcode,
    );
}

#[test]
fn test_dpofua_usage_bits_follow_fua_support() {
    let mut target = TestTarget::new();

    // FUA not honored: DPO/FUA bits masked out of READ (10) byte 1
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b001, 0x28, 0, 0, 0, 0, 1, 0, 0, 0],
        &[
            0, 0b11, 0, 10, // supported, cdb size
            0x28, 0xe0, 0xff, 0xff, 0xff, 0xff, 0x3f, 0xff, 0xff, 0x04,
        ],
    );

    target.dev.emulate_write_cache = true;
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b001, 0x28, 0, 0, 0, 0, 1, 0, 0, 0],
        &[
            0, 0b11, 0, 10, // supported, cdb size
            0x28, 0xf8, 0xff, 0xff, 0xff, 0xff, 0x3f, 0xff, 0xff, 0x04,
        ],
    );
}

#[test]
fn test_write_same_gate() {
    let mut target = TestTarget::new();

    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b001, 0x41, 0, 0, 0, 0, 1, 0, 0, 0],
        &[0, 1],
    );

    target.dev.backend_write_same = true;
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b001, 0x41, 0, 0, 0, 0, 1, 0, 0, 0],
        &[
            0, 0b11, 0, 10, // supported, cdb size
            0x41, 0xe8, 0xff, 0xff, 0xff, 0xff, 0x3f, 0xff, 0xff, 0x04,
        ],
    );
}

#[test]
fn test_set_target_port_groups_needs_explicit_alua() {
    let target = TestTarget::new();

    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b010, 0xa4, 0x00, 0x0a, 0, 0, 1, 0, 0, 0],
        &[0, 1],
    );

    *target.lun.tg_pt_gp.write().unwrap() = Some(AluaGroup {
        id: 1,
        access_type: AluaAccessType::IMPLICIT | AluaAccessType::EXPLICIT,
    });
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b010, 0xa4, 0x00, 0x0a, 0, 0, 1, 0, 0, 0],
        &[
            0, 0b11, 0, 12, // supported, cdb size
            0xa4, 0x0a, 0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0, 0x04,
        ],
    );
}

#[test]
fn test_pr_passthrough_hides_spc2_reservations() {
    let mut target = TestTarget::new();
    target.dev.passthrough_pgr = true;

    // RESERVE (6) is not available through backend pr_ops
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b001, 0x16, 0, 0, 0, 0, 1, 0, 0, 0],
        &[0, 1],
    );

    // neither is PR IN READ FULL STATUS
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b010, 0x5e, 0x00, 0x03, 0, 0, 1, 0, 0, 0],
        &[0, 1],
    );

    // but PR IN READ KEYS still is
    do_command_in(
        &target,
        &[0xa3, 0x0c, 0b010, 0x5e, 0x00, 0x00, 0, 0, 1, 0, 0, 0],
        &[
            0, 0b11, 0, 10, // supported, cdb size
            0x5e, 0x00, 0, 0, 0, 0, 0, 0xff, 0xff, 0x04,
        ],
    );
}
