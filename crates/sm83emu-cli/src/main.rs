mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};
use sm83emu_core::{
    cartridge::Cartridge, cpu::StubPolicy, disasm, gameboy::GameBoy, hardware::DmgRevision,
};

use config::RunnerConfig;

#[derive(Parser)]
#[command(name = "sm83emu", about = "Headless SM83 instruction runner")]
struct Args {
    /// Path to ROM file
    rom: PathBuf,

    /// Maximum number of instructions to execute
    #[arg(long)]
    steps: Option<u64>,

    /// Path to runner config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with post-boot register values at $0100
    #[arg(long)]
    post_boot: bool,

    /// Log and skip HALT/STOP/DI/EI/RETI instead of stopping
    #[arg(long)]
    warn_stubs: bool,

    /// Print CPU state every N instructions
    #[arg(long)]
    trace_every: Option<u64>,

    /// Disassemble N instructions from the entry point before running
    #[arg(long)]
    disasm: Option<u16>,
}

/// Folds command line flags over the loaded config.
fn apply_overrides(mut cfg: RunnerConfig, args: &Args) -> RunnerConfig {
    if let Some(steps) = args.steps {
        cfg.max_steps = steps;
    }
    if args.post_boot {
        cfg.post_boot = true;
    }
    if args.warn_stubs {
        cfg.stubs = config::StubMode::Warn;
    }
    if let Some(n) = args.trace_every {
        cfg.trace_every = n;
    }
    cfg
}

fn build_machine(cfg: &RunnerConfig) -> GameBoy {
    let mut gb = if cfg.post_boot {
        let revision = DmgRevision::from_name(&cfg.revision).unwrap_or_else(|| {
            warn!("Unknown DMG revision {:?}; using default", cfg.revision);
            DmgRevision::default()
        });
        GameBoy::new_post_boot(revision)
    } else {
        GameBoy::new()
    };
    gb.set_stub_policy(StubPolicy::from(cfg.stubs));
    gb
}

fn print_listing(gb: &GameBoy, count: u16) {
    let bytes = gb.memory.as_bytes();
    let mut addr = gb.cpu.regs.pc;
    for _ in 0..count {
        let (text, len) = disasm::disassemble(&bytes[addr as usize..], addr);
        println!(
            "{addr:04X}: {:<9} {text}",
            disasm::format_bytes(bytes, addr, len)
        );
        addr = addr.wrapping_add(len);
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let cfg = apply_overrides(config::load_from_file(&config_path), &args);
    info!("Runner config: {cfg:?}");

    let cart = match Cartridge::from_file(&args.rom) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load ROM: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Title: {:?}  type: ${:02X} ({:?})  checksum: {}",
        cart.title,
        cart.cart_type(),
        cart.mbc,
        if cart.header_checksum_ok() { "ok" } else { "bad" }
    );

    let mut gb = build_machine(&cfg);
    gb.load_cartridge(&cart);

    if let Some(count) = args.disasm {
        print_listing(&gb, count);
    }

    let mut executed = 0u64;
    while executed < cfg.max_steps {
        if let Err(e) = gb.try_step() {
            error!("{e}");
            println!("{}", gb.cpu.debug_state());
            return ExitCode::FAILURE;
        }
        executed += 1;

        if cfg.trace_every != 0 && executed.is_multiple_of(cfg.trace_every) {
            println!("{}", gb.cpu.debug_state());
        }
    }

    info!("Executed {executed} instructions");
    println!("{}", gb.cpu.debug_state());
    ExitCode::SUCCESS
}
