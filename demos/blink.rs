use dio_port::{
    ChannelId, DioController, Level, PinConfig, PortConfigurator, PortId, Result, SimulatedPorts,
};
use std::{thread, time::Duration};

// Select pin PC13 (on-board LED of common STM32F103 boards)
const BLINK_CHANNEL: u16 = 45;

static PINS: [PinConfig; 1] = [PinConfig::new(PortId::C, BLINK_CHANNEL).output(Level::High)];

fn main() -> Result<()> {
    env_logger::init();

    let mut dio = DioController::new(SimulatedPorts::default());
    let mut port = PortConfigurator::new();
    println!("Deploying pin configuration...");
    port.init_all(&mut dio, Some(&PINS[..]))?;

    let led = ChannelId(BLINK_CHANNEL);
    let resolved = dio.layout().try_resolve(led)?;
    println!(
        "Blinking {} ({} pin {})...",
        led, resolved.port, resolved.bit
    );
    for _ in 0..10 {
        let level = dio.flip_channel(led)?;
        println!(
            "  {:?} (ODR {}=0x{:04X})",
            level,
            resolved.port,
            dio.read_port(resolved.port)?
        );
        thread::sleep(Duration::from_millis(250));
    }

    let stats = dio.registers().stats();
    println!(
        "Done: {} output writes, {} configuration writes.",
        stats.output_writes, stats.configure_calls
    );
    Ok(())
}
