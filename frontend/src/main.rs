//! Headless reference host.
//!
//! Drives any registered machine without a renderer: load a program, run
//! bounded cycle budgets, type scripted input, and print the display
//! snapshot and serial output. Useful for smoke-testing software images
//! and as the embedding example for real front-ends.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use filament_core::core::machine::Machine;
use filament_machines::AltairSystem;
use filament_machines::registry;

mod config;
mod program;

use config::HostConfig;
use program::{load_program, parse_addr};

#[derive(Parser)]
#[command(name = "filament", about = "Microcomputer emulation host")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the registered machines.
    List,

    /// Run a machine headless and print its display.
    Run {
        /// Machine name (see `list`); falls back to the config default.
        machine: Option<String>,

        /// Raw binary image to load before running.
        #[arg(long)]
        program: Option<PathBuf>,

        /// Load address for the image (hex), default 0.
        #[arg(long, value_parser = parse_addr, default_value = "0000")]
        load: u16,

        /// Entry point (hex); defaults to the load address.
        #[arg(long, value_parser = parse_addr)]
        entry: Option<u16>,

        /// Total CPU cycle budget.
        #[arg(long, default_value_t = 2_000_000)]
        cycles: u64,

        /// Characters to type after one frame of warm-up.
        #[arg(long)]
        r#type: Option<String>,
    },

    /// Script the Altair front panel: deposit bytes, run, inspect.
    Panel {
        /// Raw bytes to deposit (hex, e.g. "3E 42 76").
        #[arg(long)]
        deposit: String,

        /// Deposit/examine start address (hex).
        #[arg(long, value_parser = parse_addr, default_value = "0000")]
        at: u16,

        /// Cycle budget after RUN (0 = don't run).
        #[arg(long, default_value_t = 100_000)]
        cycles: u64,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = HostConfig::load();

    match cli.command {
        Command::List => {
            for entry in registry::all() {
                println!("{:<10} {}", entry.name, entry.description);
            }
        }
        Command::Run {
            machine,
            program,
            load,
            entry,
            cycles,
            r#type,
        } => run_machine(&config, machine, program, load, entry, cycles, r#type),
        Command::Panel { deposit, at, cycles } => run_panel(&deposit, at, cycles),
    }
}

fn run_machine(
    config: &HostConfig,
    machine_name: Option<String>,
    program: Option<PathBuf>,
    load: u16,
    entry: Option<u16>,
    cycles: u64,
    type_script: Option<String>,
) {
    let name = machine_name
        .or_else(|| config.default_machine.clone())
        .unwrap_or_else(|| {
            eprintln!("No machine named; pass one or set default_machine in the config");
            std::process::exit(1);
        });

    let Some(entry_meta) = registry::find(&name) else {
        eprintln!("Unknown machine: {name}");
        eprintln!(
            "Available: {}",
            registry::all()
                .iter()
                .map(|e| e.name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        std::process::exit(1);
    };

    let mut machine = (entry_meta.create)();

    if let Some(path) = &program {
        match load_program(path, load, entry) {
            Ok(image) => {
                log::info!(
                    "loaded {} ({} regions) at 0x{load:04X}",
                    path.display(),
                    image.regions.len()
                );
                machine.load_software(&image);
            }
            Err(err) => {
                eprintln!("Failed to load {}: {err}", path.display());
                std::process::exit(1);
            }
        }
    }

    // Run in frame-sized chunks so scripted keys interleave with
    // execution the way real input would.
    let frame = config.frame_cycles.unwrap_or(33_000).max(1);
    let mut remaining = cycles;
    let mut script: Vec<char> = type_script.map(|s| s.chars().collect()).unwrap_or_default();
    script.reverse(); // pop from the front

    machine.run(frame.min(remaining));
    remaining = remaining.saturating_sub(frame);

    while remaining > 0 {
        if let Some(ch) = script.pop() {
            type_char(machine.as_mut(), &name, ch);
        }
        let budget = frame.min(remaining);
        let consumed = machine.run(budget);
        remaining = remaining.saturating_sub(consumed.max(1));
    }

    let serial = machine.take_serial_output();
    if !serial.is_empty() {
        println!("--- serial output ---");
        println!("{}", String::from_utf8_lossy(&serial));
    }

    println!("--- display ---");
    for line in machine.display_lines() {
        println!("|{line}|");
    }
    log::info!(
        "executed {} cycles, halted={}",
        machine.cycles(),
        machine.is_halted()
    );
}

/// Route one typed character through the machine's input scheme: matrix
/// machines get key-down/key-up pairs, ASCII machines get the byte.
fn type_char(machine: &mut dyn Machine, name: &str, ch: char) {
    if name == "trs80" {
        if let Some((slot, shifted)) = filament_machines::trs80::key_for_char(ch) {
            if shifted {
                machine.set_key(filament_machines::trs80::KEY_SHIFT, true);
            }
            machine.set_key(slot, true);
            machine.set_key(slot, false);
            if shifted {
                machine.set_key(filament_machines::trs80::KEY_SHIFT, false);
            }
        }
    } else {
        let byte = if ch == '\n' { 0x0D } else { ch as u8 };
        machine.set_key(byte, true);
    }
}

fn run_panel(deposit: &str, at: u16, cycles: u64) {
    let bytes: Vec<u8> = deposit
        .split_whitespace()
        .map(|tok| {
            u8::from_str_radix(tok.trim_start_matches("0x"), 16).unwrap_or_else(|e| {
                eprintln!("Bad byte {tok:?}: {e}");
                std::process::exit(1);
            })
        })
        .collect();
    if bytes.is_empty() {
        eprintln!("Nothing to deposit");
        std::process::exit(1);
    }

    let mut system = AltairSystem::new();

    // Toggle the program in through the panel, the way an operator would.
    system.panel.set_address_switches(at);
    system.examine();
    system.panel.set_data_switches(bytes[0]);
    system.deposit();
    for &byte in &bytes[1..] {
        system.panel.set_data_switches(byte);
        system.deposit_next();
    }

    system.panel.set_address_switches(at);
    system.examine();

    if cycles > 0 {
        system.run_switch();
        system.run(cycles);
    }

    let serial = system.take_serial_output();
    if !serial.is_empty() {
        println!("--- serial output ---");
        println!("{}", String::from_utf8_lossy(&serial));
    }
    for line in system.display_lines() {
        println!("{line}");
    }
    let state = system.get_cpu_state();
    println!(
        "PC={:04X} A={:02X} halted={}",
        state.pc, state.a, state.halted
    );
}
