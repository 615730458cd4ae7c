//! Channel, port and channel group services against the simulated backend.

use dio_port::{
    det, ChannelGroup, ChannelId, DioConfig, DioController, Direction, Error, ErrorKind, Level,
    PinConfig, PortId, PortLayout, RecordingReporter, SimulatedPorts,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn compat() -> DioController<SimulatedPorts, RecordingReporter> {
    init_logging();
    DioController::with_reporter(
        SimulatedPorts::default(),
        DioConfig::compatibility(),
        RecordingReporter::default(),
    )
}

fn strict() -> DioController<SimulatedPorts, RecordingReporter> {
    init_logging();
    DioController::with_reporter(
        SimulatedPorts::default(),
        DioConfig::strict(),
        RecordingReporter::default(),
    )
}

/// Configures a channel as a push-pull output so its level reads back on the input register.
fn make_output(dio: &mut DioController<SimulatedPorts, RecordingReporter>, channel: u16) {
    let rc = dio.layout().resolve(ChannelId(channel)).unwrap();
    let pin = PinConfig::new(rc.port, u16::from(rc.bit)).with_direction(Direction::Output);
    dio.deploy_pin(&pin, Default::default()).unwrap();
    dio.registers_mut().reset_stats();
}

#[test]
fn test_write_channel_45_sets_only_pc13() {
    let mut dio = strict();
    dio.write_channel(ChannelId(45), Level::High).unwrap();

    assert_eq!(dio.registers().output(PortId::C), 0x2000);
    for port in [PortId::A, PortId::B, PortId::D] {
        assert_eq!(dio.registers().output(port), 0, "{port} was touched");
    }
    assert_eq!(dio.registers().stats().output_writes, 1);
}

#[test]
fn test_write_then_read_round_trip() {
    let mut dio = strict();
    for channel in [0u16, 15, 16, 45, 63] {
        make_output(&mut dio, channel);
        for level in [Level::High, Level::Low, Level::High] {
            dio.write_channel(ChannelId(channel), level).unwrap();
            assert_eq!(dio.read_channel(ChannelId(channel)).unwrap(), level);
        }
    }
}

#[test]
fn test_read_channel_input_pin() {
    let mut dio = strict();
    dio.registers_mut().drive_input(PortId::B, 0x0100, 0x0100);
    assert_eq!(dio.read_channel(ChannelId(24)).unwrap(), Level::High);
    assert_eq!(dio.read_channel(ChannelId(25)).unwrap(), Level::Low);
}

#[test]
fn test_flip_channel_is_involution() {
    let mut dio = strict();
    make_output(&mut dio, 45);
    dio.write_channel(ChannelId(45), Level::Low).unwrap();

    assert_eq!(dio.flip_channel(ChannelId(45)).unwrap(), Level::High);
    assert_eq!(dio.read_channel(ChannelId(45)).unwrap(), Level::High);
    assert_eq!(dio.flip_channel(ChannelId(45)).unwrap(), Level::Low);
    assert_eq!(dio.read_channel(ChannelId(45)).unwrap(), Level::Low);
    assert_eq!(dio.registers().output(PortId::C), 0);
}

#[test]
fn test_invalid_channel_is_silent_in_compat_mode() {
    let mut dio = compat();
    assert_eq!(dio.read_channel(ChannelId(64)), Ok(Level::Low));
    assert_eq!(dio.write_channel(ChannelId(64), Level::High), Ok(()));
    assert_eq!(dio.flip_channel(ChannelId(200)), Ok(Level::Low));
    assert_eq!(dio.registers().stats().hardware_writes(), 0);
    assert!(dio.reporter().reports.is_empty());
}

#[test]
fn test_invalid_channel_errors_in_strict_mode() {
    let mut dio = strict();
    let err = dio.write_channel(ChannelId(64), Level::High).unwrap_err();
    assert_eq!(
        err,
        Error::ChannelOutOfRange {
            channel: 64,
            channel_count: 64
        }
    );
    assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
    assert!(dio.read_channel(ChannelId(64)).is_err());
    assert!(dio.flip_channel(ChannelId(64)).is_err());
    assert_eq!(dio.registers().stats().hardware_writes(), 0);
}

#[test]
fn test_port_read_write() {
    let mut dio = strict();
    dio.write_port(PortId::D, 0xBEEF).unwrap();
    assert_eq!(dio.read_port(PortId::D).unwrap(), 0xBEEF);
    assert_eq!(dio.registers().output(PortId::A), 0);

    dio.registers_mut().drive_input(PortId::A, 0xFFFF, 0x00F0);
    assert_eq!(dio.read_port_input(PortId::A).unwrap(), 0x00F0);
}

#[test]
fn test_read_port_invalid_reports_dev_error() {
    let mut dio = compat();
    assert_eq!(dio.read_port(PortId(4)), Ok(0));
    assert_eq!(dio.reporter().reports.len(), 1);
    let report = dio.reporter().reports[0];
    assert_eq!(report.module_id, det::MODULE_ID);
    assert_eq!(report.instance_id, det::INSTANCE_ID);
    assert_eq!(report.api_id, det::API_READ_PORT);
    assert_eq!(report.error_id, det::E_PARAM_INVALID_PORT_ID);
}

#[test]
fn test_read_port_invalid_without_dev_error_detect() {
    init_logging();
    let mut dio = DioController::with_reporter(
        SimulatedPorts::default(),
        DioConfig::compatibility().with_dev_error_detect(false),
        RecordingReporter::default(),
    );
    assert_eq!(dio.read_port(PortId(9)), Ok(0));
    assert!(dio.reporter().reports.is_empty());
}

#[test]
fn test_other_invalid_port_paths_do_not_report() {
    let mut dio = compat();
    assert_eq!(dio.write_port(PortId(4), 0xFFFF), Ok(()));
    assert_eq!(dio.masked_write_port(PortId(4), 0xFFFF, 0x00FF), Ok(()));
    assert_eq!(dio.read_port_input(PortId(4)), Ok(0));
    let group = ChannelGroup::from_raw_parts(PortId(7), 0x000F, 0);
    assert_eq!(dio.read_channel_group(&group), Ok(0));
    assert_eq!(dio.write_channel_group(&group, 0x3), Ok(()));

    assert!(dio.reporter().reports.is_empty());
    assert_eq!(dio.registers().stats().hardware_writes(), 0);
}

#[test]
fn test_read_port_invalid_strict_still_reports() {
    let mut dio = strict();
    assert_eq!(
        dio.read_port(PortId(4)),
        Err(Error::InvalidPort {
            port: 4,
            port_count: 4
        })
    );
    assert_eq!(dio.reporter().reports.len(), 1);
}

#[test]
fn test_group_write_reference_scenario() {
    let mut dio = strict();
    dio.registers_mut().preset_output(PortId::B, 0x1234);
    let group = ChannelGroup::new(PortId::B, 0x0F00).unwrap();
    assert_eq!(group.offset(), 8);

    dio.write_channel_group(&group, 0x0A).unwrap();
    assert_eq!(dio.registers().output(PortId::B), 0x1A34);
    assert_eq!(dio.read_channel_group(&group).unwrap(), 0x0A);
}

#[test]
fn test_group_write_truncates_to_mask() {
    let mut dio = strict();
    dio.registers_mut().preset_output(PortId::A, 0x0000);
    let group = ChannelGroup::new(PortId::A, 0x0070).unwrap();
    // 0x1F does not fit in three bits; only the low three land in the group
    dio.write_channel_group(&group, 0x1F).unwrap();
    assert_eq!(dio.registers().output(PortId::A), 0x0070);
}

#[test]
fn test_group_read_write_idempotent() {
    let mut dio = strict();
    dio.registers_mut().preset_output(PortId::C, 0xA5C3);
    let group = ChannelGroup::new(PortId::C, 0x03C0).unwrap();
    let value = dio.read_channel_group(&group).unwrap();
    dio.write_channel_group(&group, value).unwrap();
    assert_eq!(dio.registers().output(PortId::C), 0xA5C3);
    assert_eq!(dio.registers().stats().output_writes, 0);
}

#[test]
fn test_invalid_group_descriptor() {
    let mut dio = strict();
    let bad = ChannelGroup::from_raw_parts(PortId::A, 0x0F00, 4);
    assert!(matches!(
        dio.write_channel_group(&bad, 1),
        Err(Error::InvalidChannelGroup { .. })
    ));
    assert!(dio.read_channel_group(&bad).is_err());

    let mut dio = compat();
    dio.registers_mut().preset_output(PortId::A, 0x0F00);
    assert_eq!(dio.read_channel_group(&bad), Ok(0));
    assert_eq!(dio.write_channel_group(&bad, 0), Ok(()));
    assert_eq!(dio.registers().output(PortId::A), 0x0F00);
}

#[test]
fn test_masked_write_port() {
    let mut dio = strict();
    dio.registers_mut().preset_output(PortId::A, 0xFF00);
    dio.masked_write_port(PortId::A, 0x0A5A, 0x0FF0).unwrap();
    // (0xFF00 & !0x0FF0) | (0x0A5A & 0x0FF0)
    assert_eq!(dio.registers().output(PortId::A), 0xF000 | 0x0A50);
}

#[test]
fn test_narrow_layout_addressing() {
    init_logging();
    let layout = PortLayout::new(2, 8).unwrap();
    let mut dio = DioController::with_config(
        SimulatedPorts::new(layout),
        DioConfig::strict().with_layout(layout),
    );
    dio.write_channel(ChannelId(9), Level::High).unwrap();
    assert_eq!(dio.registers().output(PortId::B), 0x0002);
    assert!(dio.write_channel(ChannelId(16), Level::High).is_err());
    assert!(dio.write_port(PortId::C, 0).is_err());
    assert!(dio
        .write_channel_group(&ChannelGroup::new(PortId::A, 0x0180).unwrap(), 1)
        .is_err());
}

#[test]
fn test_borrowed_backend_keeps_state() {
    init_logging();
    let mut sim = SimulatedPorts::default();
    {
        let mut dio = DioController::new(&mut sim);
        assert_eq!(dio.error_mode(), dio_port::ErrorMode::Compatibility);
        dio.write_port(PortId::A, 0x00FF).unwrap();
    }
    assert_eq!(sim.output(PortId::A), 0x00FF);

    let dio = DioController::new(sim);
    let sim = dio.into_registers();
    assert_eq!(sim.stats().output_writes, 1);
}
