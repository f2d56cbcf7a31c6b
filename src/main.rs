use clap::Parser;
use std::time::Duration;

use livid_code::{code, midi, Button, Code, Config, Encoder, Handler};

/// Logs the events received from a Livid Code v2.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// MIDI In port of the device.
    #[arg(short, long, default_value = code::config::CONTROLS)]
    device: String,

    /// MIDI channel the device sends on (0 to 15).
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..16))]
    channel: u8,

    /// Note number of the first button.
    #[arg(long, default_value_t = code::config::BUTTON_OFFSET)]
    button_offset: u8,

    /// Warn when a handler takes longer than this many milliseconds.
    #[arg(long)]
    handler_budget_ms: Option<u64>,

    /// Name under which to register as a MIDI client.
    #[arg(long, default_value = code::config::DEFAULT_CLIENT_NAME)]
    client_name: String,

    /// Check for the device every this many milliseconds.
    #[arg(long, default_value_t = 1000)]
    watch_interval_ms: u64,

    /// List the MIDI In ports and exit.
    #[arg(short, long)]
    list: bool,

    /// Log debug messages.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default()
            .with_device_name(self.device.as_str())
            .with_client_name(self.client_name.as_str())
            .with_channel(midi::Channel::from(self.channel))
            .with_button_offset(self.button_offset)
            .with_watch_interval(Duration::from_millis(self.watch_interval_ms));

        if let Some(budget) = self.handler_budget_ms {
            config = config.with_handler_budget(Duration::from_millis(budget));
        }

        config
    }
}

struct LogHandler;

impl Handler for LogHandler {
    fn button(&mut self, btn: Button) -> anyhow::Result<()> {
        log::info!("btn {btn:?}");
        Ok(())
    }

    fn encoder(&mut self, enc: Encoder) -> anyhow::Result<()> {
        log::info!("enc {enc:?}");
        Ok(())
    }

    fn err(&mut self, err: &code::Error) {
        log::warn!("No more events: {err}");
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args.config();
    let config_channel = config.channel;

    if args.list {
        for name in Code::list_devices(&config)? {
            println!("{name}");
        }
        return Ok(());
    }

    let code = Code::try_new(config)?;
    if let Some(port_name) = code.port_name() {
        log::info!(
            "Listening to {port_name} on channel {}",
            u8::from(config_channel)
        );
    }

    code.add_handler(LogHandler)?;
    code.join();

    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(args) {
        Ok(()) => log::info!("Exiting"),
        Err(err) => {
            log::error!("Error: {err}");
            for source in err.chain().skip(1) {
                log::error!("\t{source}");
            }
            std::process::exit(1);
        }
    }
}
