use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use pocketboy_core::cpu::{CpuConfig, SubOperand};
use pocketboy_core::machine::{
    RunSummary, SERIAL_CONTROL_ADDR, SERIAL_DATA_ADDR, SERIAL_START_INTERNAL,
};
use pocketboy_core::memory::EventKind;
use pocketboy_core::{GameBoy, MachineConfig};
use typed_builder::TypedBuilder;

pub const USAGE: &str = "usage: pocketboy <rom> [--boot <file>] [--max-steps <n>] \
[--until <hex pc>] [--sub-register-b] [--no-ly-spoof] [--serial]";

/// What to run and how.
#[derive(Clone, Debug, PartialEq, Eq, TypedBuilder)]
pub struct RunOptions {
    #[builder(setter(into))]
    pub rom: PathBuf,
    #[builder(default, setter(strip_option, into))]
    pub boot_rom: Option<PathBuf>,
    #[builder(default, setter(strip_option))]
    pub max_steps: Option<u64>,
    #[builder(default, setter(strip_option))]
    pub until: Option<u16>,
    #[builder(default)]
    pub sub_register_b: bool,
    #[builder(default = true)]
    pub spoof_ly: bool,
    /// Echo bytes sent over the serial port to stdout.
    #[builder(default)]
    pub serial: bool,
}

impl RunOptions {
    /// Parse command-line arguments (without the program name).
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut rom = None;
        let mut boot_rom = None;
        let mut max_steps = None;
        let mut until = None;
        let mut sub_register_b = false;
        let mut spoof_ly = true;
        let mut serial = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--boot" => boot_rom = Some(PathBuf::from(value_of(&mut args, &arg)?)),
                "--max-steps" => {
                    let value = value_of(&mut args, &arg)?;
                    max_steps = Some(
                        value
                            .parse::<u64>()
                            .with_context(|| format!("invalid step count '{value}'"))?,
                    );
                }
                "--until" => until = Some(parse_address(&value_of(&mut args, &arg)?)?),
                "--sub-register-b" => sub_register_b = true,
                "--no-ly-spoof" => spoof_ly = false,
                "--serial" => serial = true,
                flag if flag.starts_with("--") => bail!("unknown option '{flag}'\n{USAGE}"),
                path if rom.is_none() => rom = Some(PathBuf::from(path)),
                extra => bail!("unexpected argument '{extra}'\n{USAGE}"),
            }
        }

        let Some(rom) = rom else {
            bail!("no ROM path provided\n{USAGE}");
        };
        Ok(Self {
            rom,
            boot_rom,
            max_steps,
            until,
            sub_register_b,
            spoof_ly,
            serial,
        })
    }

    fn machine_config(&self, boot_rom: Option<Vec<u8>>) -> MachineConfig {
        let sub_operand = if self.sub_register_b {
            SubOperand::RegisterB
        } else {
            SubOperand::Operand
        };
        let cpu = CpuConfig::builder()
            .sub_operand(sub_operand)
            .spoof_ly(self.spoof_ly)
            .build();
        MachineConfig {
            cpu,
            boot_rom,
            endpoint: self.until,
        }
    }
}

fn value_of(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("option '{flag}' needs a value"))
}

fn parse_address(text: &str) -> Result<u16> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16).with_context(|| format!("invalid address '{text}'"))
}

/// Result of a finished run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub final_pc: u16,
    /// Bytes sent over the serial port, in order.
    pub serial: Vec<u8>,
}

/// Load the ROM (and optional boot ROM) and run until a stop condition.
pub fn run(options: &RunOptions) -> Result<RunReport> {
    let rom = std::fs::read(&options.rom)
        .with_context(|| format!("failed to read ROM '{}'", options.rom.display()))?;
    let boot_rom = options
        .boot_rom
        .as_ref()
        .map(|path| {
            std::fs::read(path)
                .with_context(|| format!("failed to read boot ROM '{}'", path.display()))
        })
        .transpose()?;

    let mut gb = GameBoy::new(options.machine_config(boot_rom));
    gb.load_rom(&rom);

    let serial = Rc::new(RefCell::new(Vec::new()));
    {
        let serial = Rc::clone(&serial);
        let echo = options.serial;
        gb.add_listener(EventKind::WriteByte, move |event| {
            if event.address != SERIAL_CONTROL_ADDR || event.value8 != SERIAL_START_INTERNAL {
                return;
            }
            let byte = event.memory[SERIAL_DATA_ADDR as usize];
            serial.borrow_mut().push(byte);
            if echo {
                let mut stdout = std::io::stdout().lock();
                if let Err(err) = stdout.write_all(&[byte]).and_then(|()| stdout.flush()) {
                    log::warn!("failed to echo serial byte 0x{byte:02X}: {err}");
                }
            }
        });
    }

    let summary = gb.run(options.max_steps).with_context(|| {
        format!(
            "execution of '{}' failed after reaching PC=0x{:04X}",
            options.rom.display(),
            gb.cpu.regs.pc
        )
    })?;

    let serial = serial.borrow().clone();
    Ok(RunReport {
        summary,
        final_pc: gb.cpu.regs.pc,
        serial,
    })
}
