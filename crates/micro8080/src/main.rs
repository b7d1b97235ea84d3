use micro8080::{Cli, Frontend};

fn main() {
    env_logger::init();

    let cli = match Cli::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err:#}");
            eprintln!(
                "Usage: micro8080 [sdl|headless] [program] [duration-ms]\n\
                 program is a catalog name (counter, memfill, fibonacci, delay-count,\n\
                 stack-test), a catalog code (1-5) or a path to a raw image."
            );
            std::process::exit(2);
        }
    };

    if cli.frontend == Frontend::Sdl && cli.program.is_none() {
        log::info!("No program given, set the switches and press F6 (reset) to load one");
    }

    if let Err(err) = micro8080::run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
