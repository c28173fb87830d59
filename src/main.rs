use std::io::BufReader;
use std::path::PathBuf;
use std::thread::JoinHandle;

use anyhow::Context;
use clap::Parser;

use quicksnip::capture::StillCapture;
use quicksnip::config::JsonSettingsStore;
use quicksnip::core::control::spawn_reader;
use quicksnip::core::{App, Control};
use quicksnip::export::{ClipboardSink, ExportSink, PngFileSink};
use quicksnip::render::FontBook;

#[derive(Parser, Debug)]
#[command(
    name = "quicksnip",
    version,
    about = "Capture a screen region, annotate it and copy the result"
)]
struct Cli {
    /// Image that stands in for the screen
    screen: PathBuf,
    /// Save exports as PNG files in the pictures directory instead of the clipboard
    #[arg(long, conflicts_with = "save_dir")]
    save: bool,
    /// Save exports as PNG files in this directory instead of the clipboard
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,
    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,
}

impl Cli {
    fn sink(&self) -> anyhow::Result<Box<dyn ExportSink>> {
        if let Some(dir) = &self.save_dir {
            return Ok(Box::new(PngFileSink::new(dir)));
        }
        if self.save {
            let sink = PngFileSink::in_pictures_dir().context("no pictures directory")?;
            return Ok(Box::new(sink));
        }
        Ok(Box::new(ClipboardSink::new()))
    }
}

/// Join the stdin reader if it is done; it may still be blocked on input.
/// Returns false if it panicked.
fn reap_reader(reader: JoinHandle<()>) -> bool {
    if !reader.is_finished() {
        return true;
    }
    match reader.join() {
        Ok(()) => true,
        Err(_) => {
            log::error!("Input reader thread panicked");
            false
        }
    }
}

/// Headless driver: the given image stands in for the screen, messages are
/// read from stdin one per line (`screenshot`, `quit` or JSON).
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logs = if cli.no_log_file {
        None
    } else {
        quicksnip::logging::logs_dir()
    };
    if let Some(path) = quicksnip::logging::init(logs.as_deref()) {
        log::info!("Logging to {}", path.display());
    }

    let capture = StillCapture::open(&cli.screen)
        .with_context(|| format!("failed to load {}", cli.screen.display()))?;
    let sink = cli.sink()?;
    let store = JsonSettingsStore::in_config_dir();
    log::debug!("Settings file: {}", store.path().display());

    let mut app = App::new(
        Box::new(capture),
        sink,
        Box::new(store),
        FontBook::system(),
    );

    let (control, rx) = Control::channel();
    let reader = spawn_reader(BufReader::new(std::io::stdin()), control);
    app.run(rx, |notice| println!("{notice}"));

    reap_reader(reader);
    Ok(())
}
