use simplelog::*;
use xwinwrap::args::{parse, usage};

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let inv = match parse(argv.get(1..).unwrap_or(&[])) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    if inv.help {
        eprintln!("{}", usage());
        std::process::exit(1);
    }

    let level = if inv.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(level, Config::default(), std::io::stderr()).ok();

    if inv.daemonize {
        if let Err(e) = xwinwrap::daemon::daemonize() {
            log::error!("daemonize failed: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = xwinwrap::run(&inv, &argv) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
