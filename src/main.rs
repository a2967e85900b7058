use clap::Parser;

/// Route MIDI from one input port to one output port.
#[derive(Parser, Debug)]
#[command(name = "ridi", version, about)]
struct Args {
    /// Start with the window minimized.
    #[arg(long)]
    minimized: bool,
}

fn main() {
    let args = Args::parse();

    env_logger::init();

    // Ensure all panics are logged properly before crashing.
    std::panic::set_hook(Box::new(|panic_info| {
        let (filename, line) = panic_info
            .location()
            .map(|loc| (loc.file(), loc.line()))
            .unwrap_or(("<unknown>", 0));
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<no message>");
        log::error!("CRASH in {}:{}: {}", filename, line, message);
        eprintln!("CRASH in {}:{}: {}", filename, line, message);
    }));

    if let Err(e) = ridi::app::run(args.minimized) {
        log::error!("Failed to run window: {e}");
        std::process::exit(1);
    }
}
