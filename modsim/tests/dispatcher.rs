//! Wire-level behavior of the dispatcher driven through the public API

use std::time::{Duration, Instant};

use modsim::device::*;
use modsim::server::*;
use modsim::{crc16, UnitId};

const READ_HOLDING_10: &[u8] = &[
    0x0A, // unit id
    0x03, // function code
    0x00, 0x0A, // starting address
    0x00, 0x01, // qty of registers
    0xA5, 0x73, // crc
];

const READ_HOLDING_10_RESPONSE: &[u8] = &[
    0x0A, // unit id
    0x03, // function code
    0x02, // byte count
    0x00, 0x7A, // value
    0x9C, 0x66, // crc
];

const WRITE_SINGLE_REGISTER: &[u8] = &[0x0A, 0x06, 0x00, 0x10, 0x12, 0x34, 0x84, 0x03];

const WRITE_MULTIPLE_REGISTERS: &[u8] = &[
    0x0A, // unit id
    0x10, // function code
    0x00, 0x00, // starting address
    0x00, 0x02, // qty of registers
    0x04, // byte count
    0x12, 0x34, 0x56, 0x78, // values
    0xAD, 0xBF, // crc
];

fn holding(location: u16, mode: ValueMode, min: u16, max: u16) -> RegisterDescriptor {
    RegisterDescriptor::new(location, RegisterKind::Holding, mode, min, max)
}

fn boiler() -> Dispatcher {
    Dispatcher::new(vec![Device::new(
        UnitId::new(10),
        "boiler",
        vec![holding(10, ValueMode::Fixed, 0, 122)],
    )])
}

fn owned(reply: Reply<'_>) -> Option<Vec<u8>> {
    reply.response().map(<[u8]>::to_vec)
}

#[test]
fn crc_matches_canonical_vector() {
    let crc = crc16(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]);
    assert_eq!(crc.to_le_bytes(), [0xC5, 0xCD]);
}

#[test]
fn short_buffers_are_left_alone() {
    for len in 0..8 {
        let mut dispatcher = boiler();
        dispatcher.feed(&READ_HOLDING_10[..len]);
        assert_eq!(dispatcher.poll_once(), Reply::NoFullPackage);
        assert_eq!(dispatcher.buffered_len(), len);
    }
}

#[test]
fn frames_for_other_slaves_are_ignored() {
    let mut request = READ_HOLDING_10.to_vec();
    request[0] = 0x0B;
    let mut dispatcher = boiler();
    dispatcher.feed(&request);
    assert_eq!(dispatcher.poll_once(), Reply::NoSlaveMatch);
    assert_eq!(dispatcher.poll_once(), Reply::NoFullPackage);
}

#[test]
fn leading_zeros_are_skipped_before_address_matching() {
    let mut dispatcher = boiler();
    dispatcher.feed(&[0x00, 0x00, 0x00]);
    dispatcher.feed(READ_HOLDING_10);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(READ_HOLDING_10_RESPONSE)
    );
}

#[test]
fn corrupted_frames_are_not_answered() {
    for index in [6, 7] {
        let mut request = READ_HOLDING_10.to_vec();
        request[index] ^= 0x01;
        let mut dispatcher = boiler();
        dispatcher.feed(&request);
        assert_eq!(dispatcher.poll_once(), Reply::IncorrectCrc);
    }
}

#[test]
fn reads_fixed_holding_register() {
    let mut dispatcher = boiler();
    dispatcher.feed(READ_HOLDING_10);
    let response = owned(dispatcher.poll_once()).unwrap();
    assert_eq!(response, READ_HOLDING_10_RESPONSE);

    let (data, crc) = response.split_at(response.len() - 2);
    assert_eq!(crc, crc16(data).to_le_bytes());
}

#[test]
fn partially_configured_range_is_an_exception() {
    let mut dispatcher = boiler();
    dispatcher.feed(&[0x0A, 0x03, 0x00, 0x0A, 0x00, 0x02, 0xE5, 0x72]);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(&[0x0A, 0x83, 0x02, 0xB1, 0x33])
    );
}

#[test]
fn zero_quantity_is_illegal_data_value() {
    let mut dispatcher = boiler();
    dispatcher.feed(&[0x0A, 0x03, 0x00, 0x0A, 0x00, 0x00, 0x64, 0xB3]);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(&[0x0A, 0x83, 0x03, 0x70, 0xF3])
    );
}

#[test]
fn random_registers_cover_their_range() {
    let mut dispatcher = Dispatcher::new(vec![Device::new(
        UnitId::new(10),
        "noisy",
        vec![holding(10, ValueMode::Random, 1, 2)],
    )]);

    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..100 {
        dispatcher.feed(READ_HOLDING_10);
        let response = owned(dispatcher.poll_once()).unwrap();
        let value = u16::from_be_bytes([response[3], response[4]]);
        assert!(value == 1 || value == 2, "unexpected value: {value}");
        seen.insert(value);
    }
    assert_eq!(seen.len(), 2);
}

#[test]
fn write_single_register_is_echoed_with_original_crc() {
    let mut dispatcher = boiler();
    dispatcher.feed(WRITE_SINGLE_REGISTER);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(WRITE_SINGLE_REGISTER)
    );
}

#[test]
fn coils_are_packed_most_significant_bit_first() {
    let values = [1, 0, 1, 1, 0, 0, 0, 0, 1, 1];
    let coils = (0..).zip(values).map(|(location, value)| {
        RegisterDescriptor::new(location, RegisterKind::Coil, ValueMode::Fixed, 0, value)
    });
    let mut dispatcher = Dispatcher::new(vec![Device::new(
        UnitId::new(1),
        "relays",
        coils.collect(),
    )]);

    dispatcher.feed(&[0x01, 0x01, 0x00, 0x00, 0x00, 0x0A, 0xBC, 0x0D]);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(&[0x01, 0x01, 0x02, 0xB0, 0xC0, 0xCC, 0x6C])
    );
}

#[test]
fn back_to_back_frames_need_one_poll_each() {
    let mut dispatcher = boiler();
    let mut data = READ_HOLDING_10.to_vec();
    data.extend_from_slice(WRITE_SINGLE_REGISTER);
    dispatcher.feed(&data);

    assert_eq!(
        owned(dispatcher.poll_once()),
        Some(READ_HOLDING_10_RESPONSE.to_vec())
    );
    assert_eq!(
        owned(dispatcher.poll_once()),
        Some(WRITE_SINGLE_REGISTER.to_vec())
    );
    assert_eq!(dispatcher.poll_once(), Reply::NoFullPackage);
}

#[test]
fn frames_split_across_feeds_are_assembled() {
    let mut dispatcher = boiler();
    for byte in &READ_HOLDING_10[..7] {
        dispatcher.feed(&[*byte]);
        assert_eq!(dispatcher.poll_once(), Reply::NoFullPackage);
    }
    dispatcher.feed(&READ_HOLDING_10[7..]);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(READ_HOLDING_10_RESPONSE)
    );
}

#[test]
fn multi_write_is_assembled_then_refused() {
    let mut dispatcher = boiler();
    dispatcher.feed(&WRITE_MULTIPLE_REGISTERS[..9]);
    assert_eq!(dispatcher.poll_once(), Reply::NoFullPackage);
    dispatcher.feed(&WRITE_MULTIPLE_REGISTERS[9..]);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(&[0x0A, 0x90, 0x01, 0xFC, 0x02])
    );
    assert_eq!(dispatcher.buffered_len(), 0);
}

#[test]
fn truncated_multi_write_expires_and_parsing_resumes() {
    let mut dispatcher = boiler().with_frame_timeout(Duration::from_millis(50));
    let start = Instant::now();

    dispatcher.feed(&WRITE_MULTIPLE_REGISTERS[..8]);
    assert_eq!(dispatcher.poll_at(start), Reply::NoFullPackage);
    assert_eq!(
        dispatcher.poll_at(start + Duration::from_millis(10)),
        Reply::NoFullPackage
    );
    assert_eq!(dispatcher.buffered_len(), 8);

    assert_eq!(
        dispatcher.poll_at(start + Duration::from_millis(60)),
        Reply::NoFullPackage
    );
    assert_eq!(dispatcher.buffered_len(), 0);

    dispatcher.feed(READ_HOLDING_10);
    assert_eq!(
        dispatcher.poll_at(start + Duration::from_millis(70)),
        Reply::PackageOk(READ_HOLDING_10_RESPONSE)
    );
}

#[test]
fn unknown_function_is_illegal_function() {
    let mut dispatcher = boiler();
    dispatcher.feed(&[0x0A, 0x2B, 0x0E, 0x01, 0x00, 0x00, 0x77, 0x9F]);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(&[0x0A, 0xAB, 0x01, 0xEF, 0x32])
    );
}

fn field_unit() -> Dispatcher {
    Dispatcher::new(vec![Device::new(
        UnitId::new(7),
        "field unit",
        vec![
            RegisterDescriptor::new(0, RegisterKind::InputDiscrete, ValueMode::Fixed, 0, 1),
            RegisterDescriptor::new(1, RegisterKind::InputDiscrete, ValueMode::Fixed, 0, 0),
            RegisterDescriptor::new(2, RegisterKind::InputDiscrete, ValueMode::Fixed, 0, 1),
            RegisterDescriptor::new(20, RegisterKind::Input, ValueMode::Fixed, 0, 0x1234),
            RegisterDescriptor::new(21, RegisterKind::Input, ValueMode::ExternalRead, 0, 0),
        ],
    )])
}

#[test]
fn write_single_coil_is_echoed_with_original_crc() {
    let request = [0x07, 0x05, 0x00, 0x01, 0xFF, 0x00, 0xDD, 0x9C];
    let mut dispatcher = field_unit();
    dispatcher.feed(&request);
    assert_eq!(dispatcher.poll_once(), Reply::PackageOk(&request));
}

#[test]
fn reads_discrete_inputs() {
    let mut dispatcher = field_unit();
    dispatcher.feed(&[0x07, 0x02, 0x00, 0x00, 0x00, 0x03, 0x38, 0x6D]);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(&[
            0x07, // unit id
            0x02, // function code
            0x01, // byte count
            0xA0, // packed inputs
            0xA1, 0x78, // crc
        ])
    );
}

#[test]
fn reads_input_registers_including_external_values() {
    let mut dispatcher = field_unit();
    dispatcher.feed(&[0x07, 0x04, 0x00, 0x14, 0x00, 0x02, 0x31, 0xA9]);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(&[
            0x07, // unit id
            0x04, // function code
            0x04, // byte count
            0x12, 0x34, // fixed value
            0x00, 0x0B, // placeholder value
            0x98, 0xF5, // crc
        ])
    );
}

#[test]
fn register_count_above_protocol_limit_is_illegal_data_value() {
    let mut dispatcher = field_unit();
    // 126 registers would still fit the byte count but exceeds the read limit
    dispatcher.feed(&[0x07, 0x04, 0x00, 0x14, 0x00, 0x7E, 0x30, 0x48]);
    assert_eq!(
        dispatcher.poll_once(),
        Reply::PackageOk(&[0x07, 0x84, 0x03, 0xE3, 0x00])
    );
}
