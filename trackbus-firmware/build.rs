//! Build script for trackbus-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates control_unit.toml and generates the board constants

use std::collections::HashSet;
use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use trackbus_core::{BitTiming, PinConfig, Pull, ReceiverConfig};

/// User GPIOs on the RP2040
const GPIO_COUNT: u8 = 30;

/// The start light has at most five lamps
const MAX_LAMPS: usize = 5;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FirmwareConfig {
    bus: BusSection,
    start_light: StartLightSection,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BusSection {
    pin: String,
    timing: BitTiming,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StartLightSection {
    lamps: Vec<String>,
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set by cargo"));

    setup_linker(&out_dir);

    let (receiver, lamps) = validate_config();
    fs::write(out_dir.join("board.rs"), generate_board(&receiver, &lamps))
        .expect("failed to write board.rs");
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("failed to create memory.x");
    f.write_all(memory_x).expect("failed to write memory.x");

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate control_unit.toml at compile time
fn validate_config() -> (ReceiverConfig, Vec<PinConfig>) {
    println!("cargo:rerun-if-changed=control_unit.toml");

    let config_path = Path::new("control_unit.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read control_unit.toml", &[e.to_string()]),
    };

    let config: FirmwareConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => fail(
            "Invalid control_unit.toml",
            &e.to_string().lines().map(str::to_owned).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    let mut used = HashSet::new();

    let bus_pin = check_pin("[bus] pin", &config.bus.pin, &mut used, &mut errors);

    if let Err(e) = config.bus.timing.validate() {
        errors.push(format!("[bus.timing] rejected: {:?}", e));
    }

    if config.start_light.lamps.is_empty() || config.start_light.lamps.len() > MAX_LAMPS {
        errors.push(format!("[start_light] needs 1 to {} lamps", MAX_LAMPS));
    }

    let mut lamps = Vec::new();
    for (i, lamp) in config.start_light.lamps.iter().enumerate() {
        let name = format!("[start_light] lamp {}", i + 1);
        if let Some(pin) = check_pin(&name, lamp, &mut used, &mut errors) {
            if pin.pull != Pull::None {
                errors.push(format!("{} is an output, drop the pull prefix", name));
            }
            lamps.push(pin);
        }
    }

    if !errors.is_empty() {
        fail("Invalid control_unit.toml", &errors);
    }

    let receiver = ReceiverConfig {
        pin: bus_pin.unwrap_or_default(),
        timing: config.bus.timing,
    };

    println!("cargo:warning=control_unit.toml validated successfully");
    (receiver, lamps)
}

/// Parse a pin string and check it against the chip and earlier pins
fn check_pin(
    name: &str,
    s: &str,
    used: &mut HashSet<u8>,
    errors: &mut Vec<String>,
) -> Option<PinConfig> {
    let Some(pin) = PinConfig::parse(s) else {
        errors.push(format!("{} '{}' is not a pin (e.g. \"!gpio2\")", name, s));
        return None;
    };

    if pin.pin >= GPIO_COUNT {
        errors.push(format!("{} gpio{} does not exist", name, pin.pin));
        return None;
    }

    if !used.insert(pin.pin) {
        errors.push(format!("{} gpio{} is already in use", name, pin.pin));
        return None;
    }

    Some(pin)
}

/// Emit the Rust constants for the validated board
fn generate_board(receiver: &ReceiverConfig, lamps: &[PinConfig]) -> String {
    let timing = &receiver.timing;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "// Generated from control_unit.toml by build.rs\n");

    let _ = writeln!(out, "/// Bus receiver configuration");
    let _ = writeln!(out, "pub const RECEIVER: ReceiverConfig = ReceiverConfig {{");
    let _ = writeln!(
        out,
        "    pin: PinConfig {{ pin: {}, inverted: {}, pull: Pull::{:?} }},",
        receiver.pin.pin, receiver.pin.inverted, receiver.pin.pull
    );
    let _ = writeln!(out, "    timing: BitTiming {{");
    let _ = writeln!(
        out,
        "        bit0: PulseWindow::new({}, {}),",
        timing.bit0.min_us, timing.bit0.max_us
    );
    let _ = writeln!(
        out,
        "        bit1: PulseWindow::new({}, {}),",
        timing.bit1.min_us, timing.bit1.max_us
    );
    let _ = writeln!(out, "        sync_min_us: {},", timing.sync_min_us);
    let _ = writeln!(out, "        word_bits: {},", timing.word_bits);
    let _ = writeln!(out, "    }},");
    let _ = writeln!(out, "}};\n");

    let _ = writeln!(out, "/// Number of start-light lamps");
    let _ = writeln!(out, "pub const LAMP_COUNT: usize = {};\n", lamps.len());

    let inverted: Vec<String> = lamps.iter().map(|l| l.inverted.to_string()).collect();
    let _ = writeln!(out, "/// Lamps driven active-low");
    let _ = writeln!(
        out,
        "pub const LAMP_INVERTED: [bool; LAMP_COUNT] = [{}];\n",
        inverted.join(", ")
    );

    let _ = writeln!(out, "/// GPIOs taken from the peripherals");
    let _ = writeln!(out, "pub struct BoardPins {{");
    let _ = writeln!(out, "    pub bus: Peri<'static, AnyPin>,");
    let _ = writeln!(out, "    pub lamps: [Peri<'static, AnyPin>; LAMP_COUNT],");
    let _ = writeln!(out, "}}\n");

    let lamp_pins: Vec<String> = lamps
        .iter()
        .map(|l| format!("p.PIN_{}.into::<AnyPin>()", l.pin))
        .collect();
    let _ = writeln!(out, "/// Split the configured pins out of the peripherals");
    let _ = writeln!(out, "pub fn split(p: Peripherals) -> BoardPins {{");
    let _ = writeln!(out, "    BoardPins {{");
    let _ = writeln!(
        out,
        "        bus: p.PIN_{}.into::<AnyPin>(),",
        receiver.pin.pin
    );
    let _ = writeln!(out, "        lamps: [{}],", lamp_pins.join(", "));
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");

    out
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
