use pocketboy::RunOptions;

fn main() {
    env_logger::init();

    let options = match RunOptions::from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(2);
        }
    };

    log::info!("Running ROM path: '{}'", options.rom.display());
    match pocketboy::run(&options) {
        Ok(report) => {
            if options.serial && !report.serial.is_empty() {
                println!();
            }
            log::info!(
                "{:?} after {} steps ({} machine cycles), final PC=0x{:04X}",
                report.summary.outcome,
                report.summary.steps,
                report.summary.cycles,
                report.final_pc,
            );
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
