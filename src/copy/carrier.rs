//! Legacy copy tier: stage the text in a temporary carrier, select it, issue
//! the copy command, and always remove the carrier afterwards.

use std::io::{self, Write};
use std::process::{Child, Command, Stdio};

use super::backend::ClipboardError;

/// Environment variable overriding the fallback copy command line.
pub const COPY_COMMAND_ENV: &str = "CHATDOC_COPY_COMMAND";

/// A transient holder for the text being copied.
pub trait TextCarrier {
    fn populate(&mut self, text: &str) -> io::Result<()>;

    /// Make the populated text the target of the copy command.
    fn select(&mut self) -> io::Result<()>;

    /// Issue the copy command. `Ok(false)` means it ran and refused.
    fn exec_copy(&mut self) -> io::Result<bool>;
}

/// Creates and removes carriers.
pub trait CarrierHost {
    type Carrier: TextCarrier;

    fn create(&mut self) -> io::Result<Self::Carrier>;

    fn remove(&mut self, carrier: Self::Carrier);
}

/// Hands the carrier back to its host on every exit path, unwinding included.
struct CarrierGuard<'h, H: CarrierHost> {
    host: &'h mut H,
    carrier: Option<H::Carrier>,
}

impl<H: CarrierHost> CarrierGuard<'_, H> {
    fn copy(&mut self, text: &str) -> io::Result<bool> {
        let Some(carrier) = self.carrier.as_mut() else {
            return Ok(false);
        };
        carrier.populate(text)?;
        carrier.select()?;
        carrier.exec_copy()
    }
}

impl<H: CarrierHost> Drop for CarrierGuard<'_, H> {
    fn drop(&mut self) {
        if let Some(carrier) = self.carrier.take() {
            self.host.remove(carrier);
        }
    }
}

/// Copy `text` through a freshly created carrier.
pub fn legacy_copy<H: CarrierHost>(host: &mut H, text: &str) -> Result<(), ClipboardError> {
    let carrier = host.create().map_err(ClipboardError::CarrierUnavailable)?;
    let mut guard = CarrierGuard {
        host,
        carrier: Some(carrier),
    };
    if guard.copy(text)? {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed)
    }
}

/// Carrier host backed by a platform copy command reading stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHost {
    program: String,
    args: Vec<String>,
}

impl CommandHost {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a whitespace-separated command line. `None` when blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }

    /// `CHATDOC_COPY_COMMAND` when set, else the platform's usual copy command.
    pub fn detect() -> Self {
        std::env::var(COPY_COMMAND_ENV)
            .ok()
            .and_then(|line| Self::from_command_line(&line))
            .unwrap_or_else(Self::platform_default)
    }

    fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("pbcopy", Vec::<String>::new())
        } else if cfg!(windows) {
            Self::new("clip", Vec::<String>::new())
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Self::new("wl-copy", Vec::<String>::new())
        } else {
            Self::new("xclip", ["-selection", "clipboard"])
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl CarrierHost for CommandHost {
    type Carrier = CommandCarrier;

    fn create(&mut self) -> io::Result<CommandCarrier> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        log::debug!("spawned copy carrier {}", self.program);
        Ok(CommandCarrier { child })
    }

    fn remove(&mut self, mut carrier: CommandCarrier) {
        drop(carrier.child.stdin.take());
        if !matches!(carrier.child.try_wait(), Ok(Some(_))) {
            let _ = carrier.child.kill();
            let _ = carrier.child.wait();
        }
    }
}

/// A running copy command; its stdin is the staged text.
#[derive(Debug)]
pub struct CommandCarrier {
    child: Child,
}

impl TextCarrier for CommandCarrier {
    fn populate(&mut self, text: &str) -> io::Result<()> {
        let stdin = self
            .child
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "carrier input closed"))?;
        stdin.write_all(text.as_bytes())
    }

    fn select(&mut self) -> io::Result<()> {
        // EOF hands the whole text to the command.
        drop(self.child.stdin.take());
        Ok(())
    }

    fn exec_copy(&mut self) -> io::Result<bool> {
        Ok(self.child.wait()?.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingHost {
        live: usize,
        removed: Vec<String>,
        fail_populate: bool,
    }

    struct Staged {
        text: String,
        fail_populate: bool,
    }

    impl TextCarrier for Staged {
        fn populate(&mut self, text: &str) -> io::Result<()> {
            if self.fail_populate {
                return Err(io::Error::other("quota"));
            }
            self.text = text.to_string();
            Ok(())
        }

        fn select(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn exec_copy(&mut self) -> io::Result<bool> {
            Ok(true)
        }
    }

    impl CarrierHost for CountingHost {
        type Carrier = Staged;

        fn create(&mut self) -> io::Result<Staged> {
            self.live += 1;
            Ok(Staged {
                text: String::new(),
                fail_populate: self.fail_populate,
            })
        }

        fn remove(&mut self, carrier: Staged) {
            self.live -= 1;
            self.removed.push(carrier.text);
        }
    }

    #[test]
    fn carrier_is_removed_after_success() {
        let mut host = CountingHost::default();
        legacy_copy(&mut host, "payload").expect("copy");
        assert_eq!(host.live, 0);
        assert_eq!(host.removed, ["payload"]);
    }

    #[test]
    fn carrier_is_removed_after_populate_error() {
        let mut host = CountingHost {
            fail_populate: true,
            ..Default::default()
        };
        let err = legacy_copy(&mut host, "payload").unwrap_err();
        assert!(matches!(err, ClipboardError::Io(_)));
        assert_eq!(host.live, 0);
    }

    #[test]
    fn carrier_is_removed_when_copy_panics() {
        struct Exploding;

        impl TextCarrier for Exploding {
            fn populate(&mut self, _text: &str) -> io::Result<()> {
                panic!("carrier exploded");
            }

            fn select(&mut self) -> io::Result<()> {
                Ok(())
            }

            fn exec_copy(&mut self) -> io::Result<bool> {
                Ok(true)
            }
        }

        #[derive(Default)]
        struct PanicHost {
            live: usize,
        }

        impl CarrierHost for PanicHost {
            type Carrier = Exploding;

            fn create(&mut self) -> io::Result<Exploding> {
                self.live += 1;
                Ok(Exploding)
            }

            fn remove(&mut self, _carrier: Exploding) {
                self.live -= 1;
            }
        }

        let mut host = PanicHost::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = legacy_copy(&mut host, "payload");
        }));
        assert!(result.is_err());
        assert_eq!(host.live, 0);
    }

    #[test]
    fn command_line_parsing() {
        let host = CommandHost::from_command_line("  xclip -selection clipboard ").expect("host");
        assert_eq!(host.program(), "xclip");
        assert_eq!(host.args(), ["-selection", "clipboard"]);
        assert_eq!(CommandHost::from_command_line("   "), None);
    }

    #[cfg(unix)]
    #[test]
    fn command_carrier_round_trip() {
        let mut host = CommandHost::new("cat", Vec::<String>::new());
        legacy_copy(&mut host, "hello").expect("cat accepts stdin");
    }

    #[cfg(unix)]
    #[test]
    fn command_refusal_is_reported() {
        let mut host = CommandHost::new("sh", ["-c", "cat >/dev/null; exit 1"]);
        let err = legacy_copy(&mut host, "hello").unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed));
    }

    #[test]
    fn missing_command_is_unavailable() {
        let mut host = CommandHost::new("chatdoc-no-such-copy-command", Vec::<String>::new());
        let err = legacy_copy(&mut host, "hello").unwrap_err();
        assert!(matches!(err, ClipboardError::CarrierUnavailable(_)));
    }
}
