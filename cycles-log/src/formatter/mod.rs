//! Formatting for log records.
//!
//! The default format is `[<timestamp> <LEVEL> <target>] <message>` followed by a newline.
//! Continuation lines of multiline messages are indented.

use std::fmt::Write;

use log::Record;

mod timestamp;

use self::timestamp::Rfc3339Timestamp;

pub(crate) type FormatFn = Box<dyn Fn(&mut String, &Record) -> std::fmt::Result + Sync + Send>;

pub(crate) struct Builder {
    pub timestamp: bool,
    pub format_level: bool,
    pub format_target: bool,
    pub format_indent: Option<usize>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            timestamp: true,
            format_level: true,
            format_target: true,
            format_indent: Some(4),
        }
    }
}

impl Builder {
    pub fn build(self) -> FormatFn {
        Box::new(move |buf, record| {
            DefaultFormat {
                timestamp: self.timestamp,
                level: self.format_level,
                target: self.format_target,
                indent: self.format_indent,
            }
            .write(buf, record)
        })
    }
}

struct DefaultFormat {
    timestamp: bool,
    level: bool,
    target: bool,
    indent: Option<usize>,
}

impl DefaultFormat {
    fn write(&self, buf: &mut String, record: &Record) -> std::fmt::Result {
        let mut header = Vec::with_capacity(3);
        if self.timestamp {
            header.push(Rfc3339Timestamp::now().to_string());
        }
        if self.level {
            header.push(format!("{:<5}", record.level()));
        }
        if self.target && !record.target().is_empty() {
            header.push(record.target().to_string());
        }

        if !header.is_empty() {
            write!(buf, "[{}] ", header.join(" "))?;
        }

        let message = record.args().to_string();
        match self.indent {
            Some(indent) if indent > 0 => {
                let separator = format!("\n{:indent$}", "");
                writeln!(buf, "{}", message.replace('\n', &separator))
            }
            _ => writeln!(buf, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;

    fn format(target: &str, fmt: DefaultFormat) -> String {
        let mut buf = String::new();
        fmt.write(
            &mut buf,
            &Record::builder()
                .args(format_args!("log\nmessage"))
                .level(Level::Info)
                .target(target)
                .build(),
        )
        .unwrap();
        buf
    }

    #[test]
    fn format_with_header() {
        let written = format(
            "cycles_pricing",
            DefaultFormat {
                timestamp: false,
                level: true,
                target: true,
                indent: None,
            },
        );
        assert_eq!("[INFO  cycles_pricing] log\nmessage\n", written);
    }

    #[test]
    fn format_no_header() {
        let written = format(
            "cycles_pricing",
            DefaultFormat {
                timestamp: false,
                level: false,
                target: false,
                indent: None,
            },
        );
        assert_eq!("log\nmessage\n", written);
    }

    #[test]
    fn format_indent_spaces() {
        let written = format(
            "",
            DefaultFormat {
                timestamp: false,
                level: true,
                target: true,
                indent: Some(4),
            },
        );
        assert_eq!("[INFO ] log\n    message\n", written);
    }

    #[test]
    fn format_with_timestamp() {
        let written = format(
            "target",
            DefaultFormat {
                timestamp: true,
                level: false,
                target: true,
                indent: None,
            },
        );
        assert!(written.starts_with('['));
        assert!(written.ends_with(" target] log\nmessage\n"), "{written}");
    }
}
