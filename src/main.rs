use clap::Parser;
use floppio::{
    app::{self, StatusLine},
    player::{CancelToken, PlaybackDriver},
    ui, Args, PlayerConfig, PlayerError, SerialTransport,
};
use std::io::{self, Write};

fn main() {
    initialize_logging();
    let args = Args::parse();
    ui::print_banner();

    let code = run(&args);
    log::info!("Exiting with status {}", code);
    std::process::exit(code);
}

fn initialize_logging() {
    if let Err(e) = floppio::logging::init_logger() {
        eprintln!("Logging disabled: {}", e);
    }
    log::info!("Application starting");
}

fn run(args: &Args) -> i32 {
    print!("Loading midi file... ");
    let _ = io::stdout().flush();

    let file = match app::load(args.file.as_deref()) {
        Ok(file) => file,
        Err(e) => {
            println!();
            report_error(&e);
            return app::exit_code_for_error(&e);
        }
    };
    println!("DONE\n");

    let config = match PlayerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            return app::exit_code_for_error(&e);
        }
    };

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel);

    let mut driver =
        PlaybackDriver::new(cancel, config.settle).with_progress(ui::create_playback_progress());
    let settings = config.transport_settings();
    let report = app::play(&file, &mut driver, || SerialTransport::open(&settings));

    println!();
    print_lines(&app::status_lines(&report));
    app::exit_code(&report.outcome)
}

fn install_interrupt_handler(cancel: &CancelToken) {
    let token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || token.cancel()) {
        log::warn!("Could not install Ctrl-C handler: {}", e);
    }
}

fn print_lines(lines: &[StatusLine]) {
    for line in lines {
        match line {
            StatusLine::Info(text) => println!("{}", text),
            StatusLine::Error(text) => {
                log::error!("{}", text);
                eprintln!("{}", text);
            }
        }
    }
}

fn report_error(error: &PlayerError) {
    print_lines(&[StatusLine::Error(app::error_line(error))]);
}
