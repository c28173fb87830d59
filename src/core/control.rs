//! Control interface for feeding the event loop
//!
//! Hotkey pollers, tray menus and scripted input never touch the session.
//! They hold a `Control` and enqueue messages that `App::run` processes in
//! order.

use std::io::BufRead;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::error::Result;
use crate::session::messages::Msg;

/// Sending half of the event queue
#[derive(Debug, Clone)]
pub struct Control {
    tx: Sender<Msg>,
}

impl Control {
    /// Create the queue; the receiver goes to `App::run`
    pub fn channel() -> (Control, Receiver<Msg>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Control { tx }, rx)
    }

    /// Enqueue a message. Returns false once the event loop is gone.
    pub fn send(&self, msg: Msg) -> bool {
        match self.tx.send(msg) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Event loop closed, dropping {:?}", err.into_inner());
                false
            }
        }
    }

    /// Start a capture (hotkey)
    pub fn take_screenshot(&self) -> bool {
        log::info!("Control: TakeScreenshot command received");
        self.send(Msg::CaptureRequested)
    }

    /// Escape pressed outside the overlay
    pub fn cancel(&self) -> bool {
        self.send(Msg::CancelRequested)
    }

    /// Quit the application
    pub fn quit(&self) -> bool {
        log::info!("Control: Quit command received");
        self.send(Msg::Quit)
    }
}

/// Parse one line of scripted input.
///
/// Blank lines and `#` comments yield `None`. The bare words `screenshot`,
/// `cancel`, `settings` and `quit` are accepted besides JSON messages.
pub fn parse_command(line: &str) -> Option<Result<Msg>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let msg = match line {
        "screenshot" => Msg::CaptureRequested,
        "cancel" => Msg::CancelRequested,
        "settings" => Msg::OpenSettings,
        "quit" => Msg::Quit,
        _ => return Some(serde_json::from_str(line).map_err(Into::into)),
    };
    Some(Ok(msg))
}

/// Read messages line by line on a background thread until EOF, then ask
/// the event loop to quit. Malformed lines are logged and skipped.
pub fn spawn_reader<R>(reader: R, control: Control) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for (n, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log::error!("Input read failed: {err}");
                    break;
                }
            };
            match parse_command(&line) {
                None => {}
                Some(Ok(msg)) => {
                    if !control.send(msg) {
                        return;
                    }
                }
                Some(Err(err)) => log::warn!("Skipping input line {}: {}", n + 1, err),
            }
        }
        control.quit();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_words_and_json() {
        assert!(parse_command("   ").is_none());
        assert!(parse_command("# comment").is_none());
        assert_eq!(parse_command("screenshot").unwrap().unwrap(), Msg::CaptureRequested);
        assert_eq!(parse_command(r#""undo""#).unwrap().unwrap(), Msg::Undo);
        assert_eq!(
            parse_command(r#"{"pointer":{"up":{"x":1,"y":2}}}"#)
                .unwrap()
                .unwrap(),
            Msg::pointer_up(1, 2)
        );
        assert!(parse_command("{not json").unwrap().is_err());
    }

    #[test]
    fn test_reader_forwards_and_quits() {
        let (control, rx) = Control::channel();
        let input = "screenshot\n\nbogus\n\"copy\"\n";
        spawn_reader(std::io::Cursor::new(input), control)
            .join()
            .unwrap();
        let msgs: Vec<Msg> = rx.try_iter().collect();
        assert_eq!(msgs, vec![Msg::CaptureRequested, Msg::Copy, Msg::Quit]);
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (control, rx) = Control::channel();
        drop(rx);
        assert!(!control.take_screenshot());
    }
}
