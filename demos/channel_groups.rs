use dio_port::{
    ChannelGroup, DioConfig, DioController, Direction, PinConfig, PinMode, PortConfigurator,
    PortId, Result, SimulatedPorts,
};

// PB8-PB11 drive a 4-bit parallel bus, PA0 is a bidirectional strobe
static PINS: [PinConfig; 5] = [
    PinConfig::new(PortId::B, 8).with_direction(Direction::Output),
    PinConfig::new(PortId::B, 9).with_direction(Direction::Output),
    PinConfig::new(PortId::B, 10).with_direction(Direction::Output),
    PinConfig::new(PortId::B, 11).with_direction(Direction::Output),
    PinConfig::new(PortId::A, 0)
        .direction_changeable(true)
        .mode_changeable(true),
];

fn main() -> Result<()> {
    env_logger::init();

    let mut dio = DioController::with_config(SimulatedPorts::default(), DioConfig::strict());
    let mut port = PortConfigurator::new();
    port.init_all(&mut dio, Some(&PINS[..]))?;

    dio.write_port(PortId::B, 0x1234)?;
    let bus = ChannelGroup::new(PortId::B, 0x0F00)?;
    println!("Bus group: mask=0x{:04X}, offset={}", bus.mask(), bus.offset());

    for value in [0x0A, 0x05, 0x0F, 0x00] {
        dio.write_channel_group(&bus, value)?;
        println!(
            "  wrote 0x{:X}: bus reads 0x{:X}, GPIOB=0x{:04X}",
            value,
            dio.read_channel_group(&bus)?,
            dio.read_port(PortId::B)?
        );
    }

    println!("Masked write: only bits 0-3 of GPIOB");
    dio.masked_write_port(PortId::B, 0xFFFF, 0x000F)?;
    println!("  GPIOB=0x{:04X}", dio.read_port(PortId::B)?);

    println!("Switching strobe PA0 to output, then to analog");
    port.set_pin_direction(&mut dio, 4, Direction::Output)?;
    port.set_pin_mode(&mut dio, 4, PinMode::Analog)?;
    println!(
        "  PA0 mode: {:?}",
        dio.registers().pin_mode(PortId::A, 0)
    );

    // Buses configured with a fixed direction can be re-asserted at any time
    port.refresh_port_direction(&mut dio)?;
    Ok(())
}
