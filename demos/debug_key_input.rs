//! Key input inspector.
//!
//! Usage: cargo run --example debug_key_input
//!
//! Prints every parsed key event with its raw bytes. Press q or Ctrl+C to
//! exit.

use repledit_io::{create_console_io, ConsoleInput as _, ConsoleOutput as _, Key};

fn format_bytes(bytes: &[u8]) -> String {
    let hex: String = bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ");

    let ascii: String = bytes
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect();

    format!("[{hex}] \"{ascii}\"")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Key input inspector. Press keys to see events; q or Ctrl+C exits.");

    let (input, output) = create_console_io()?;
    let raw_guard = input.enable_raw_mode()?;

    loop {
        let Some(event) = input.read_key_timeout(Some(100))? else {
            continue;
        };

        let mut line = format!(
            "{:<18} raw={:<28}",
            format!("{:?}", event.key),
            format_bytes(&event.raw_bytes)
        );
        if let Some(text) = &event.text {
            line.push_str(&format!(" text={text:?}"));
        }
        line.push_str("\r\n");
        output.write_text(&line)?;
        output.flush()?;

        if event.key == Key::ControlC || event.text_or_empty() == "q" {
            break;
        }
    }

    drop(raw_guard);
    println!("Done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(b"hello"), "[68 65 6c 6c 6f] \"hello\"");
        assert_eq!(format_bytes(&[0x1b, 0x5b, 0x41]), "[1b 5b 41] \".[A\"");
        assert_eq!(format_bytes(&[]), "[] \"\"");
    }
}
