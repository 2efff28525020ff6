use clap::Parser;
use log::LevelFilter;
use std::io::{self, BufRead};
use std::thread::JoinHandle;
use tapsyncrs::{
    cli::{validate_device, Args},
    config::Settings,
    create_session, create_spawner, handle_device_list, install_interrupt_handler, logging,
    midi::{run_midi_input, DefaultMidiEngine},
    playback::{CpalPlayback, LogPlayback, Playback, WavSample},
    ui::run_status_display,
    AppError, BeatScheduler, SharedSession, Spawner, TapClock,
};

fn main() {
    let args = parse_command_line_arguments();

    if args.list_devices {
        list_available_devices();
        return;
    }

    if let Err(err) = run(args) {
        log::error!("{}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn list_available_devices() {
    let devices = handle_device_list();
    println!("Available MIDI inputs:");
    for device in &devices.midi_inputs {
        println!("  - {}", device);
    }
    println!("Available audio outputs:");
    for device in &devices.audio_outputs {
        println!("  - {}", device);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let settings = Settings::load(args.config.as_deref())?;
    initialize_logging(&settings, &args)?;
    validate_requested_devices(&args)?;

    let playback = create_playback(&args)?;
    let engine = DefaultMidiEngine::new(args.input.as_deref())?;
    println!("Listening for taps on {}", engine.port_name());

    let spawner = create_spawner();
    let session = create_session();
    install_interrupt_handler(session.clone())?;
    let mut workers = Vec::new();

    let scheduler_session = session.clone();
    let idle_poll = settings.idle_poll();
    workers.push(spawner.spawn("beat-scheduler", move || {
        BeatScheduler::with_idle_poll(scheduler_session, playback, idle_poll).run();
    })?);

    if !args.no_status {
        let status_session = session.clone();
        workers.push(spawner.spawn("status", move || {
            run_status_display(status_session);
        })?);
    }

    // Blocks on stdin for the life of the process, so it is never joined.
    let quit_session = session.clone();
    spawner.spawn("quit-watcher", move || watch_for_quit(quit_session))?;

    log::info!("Application running. Press Ctrl-C or type q and Enter to exit...");
    println!("\nPress Ctrl-C or type q and Enter to exit...");

    run_midi_input(engine, session.clone(), TapClock::new(settings.tempo_config()));
    session.shutdown();
    join_workers(workers);

    log::info!("Application stopped");
    Ok(())
}

fn initialize_logging(settings: &Settings, args: &Args) -> Result<(), AppError> {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        settings.level_filter()?
    };
    let log_file = match &settings.log_file {
        Some(path) => path.clone(),
        None => logging::default_log_path()?,
    };

    logging::init_logger(level, &log_file, args.no_status)?;
    log::info!("Application starting, logging to {}", log_file.display());
    Ok(())
}

fn validate_requested_devices(args: &Args) -> Result<(), AppError> {
    let devices = handle_device_list();
    if let Some(input) = &args.input {
        validate_device(input, &devices.midi_inputs).map_err(AppError::Device)?;
    }
    if let (Some(output), false) = (&args.output, args.dry_run) {
        validate_device(output, &devices.audio_outputs).map_err(AppError::Device)?;
    }
    Ok(())
}

fn create_playback(args: &Args) -> Result<Box<dyn Playback>, AppError> {
    let path = args.sample.as_ref().ok_or(AppError::MissingSample)?;
    if args.dry_run {
        return Ok(Box::new(LogPlayback::new(path.display().to_string())));
    }

    let sample = WavSample::open(path)?;
    Ok(Box::new(CpalPlayback::new(sample, args.output.clone())?))
}

fn watch_for_quit(session: SharedSession) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().eq_ignore_ascii_case("q") {
            log::info!("Quit requested");
            session.shutdown();
            break;
        }
    }
}

fn join_workers(workers: Vec<JoinHandle<()>>) {
    for worker in workers {
        let name = worker.thread().name().unwrap_or("<unnamed>").to_string();
        if worker.join().is_err() {
            log::error!("Thread {} panicked", name);
        }
    }
}
