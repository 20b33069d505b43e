//! Interactive PA level selection

use std::io::{self, BufRead, Write};

use log::warn;
use voltwatch_hal::PaLevel;

/// Ask the operator for a PA level
///
/// Prints the menu to `output` and reads one line from `input`. Anything
/// that is not an index from 0 to 3 keeps the radio default.
pub fn prompt_pa_level<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<PaLevel> {
    writeln!(output, "Enter desired PA level:")?;
    for index in 0..4 {
        if let Some(level) = PaLevel::from_menu_index(index) {
            writeln!(output, "{} = {}", index, level.label())?;
        }
    }
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(parse_choice(line.trim()))
}

/// Map an answer to a level, falling back to the default
fn parse_choice(answer: &str) -> PaLevel {
    match answer.parse::<u8>().ok().and_then(PaLevel::from_menu_index) {
        Some(level) => level,
        None => {
            let fallback = PaLevel::default();
            warn!(
                "Invalid PA level {:?}, keeping {}",
                answer,
                fallback.label()
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(answer: &str) -> (PaLevel, String) {
        let mut output = Vec::new();
        let level = prompt_pa_level(Cursor::new(answer.as_bytes()), &mut output).unwrap();
        (level, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_menu_printed() {
        let (_, menu) = ask("3\n");
        assert_eq!(
            menu,
            "Enter desired PA level:\n0 = MIN\n1 = LOW\n2 = HIGH\n3 = MAX\n"
        );
    }

    #[test]
    fn test_valid_choice() {
        assert_eq!(ask("0\n").0, PaLevel::Min);
        assert_eq!(ask(" 2 \n").0, PaLevel::High);
    }

    #[test]
    fn test_invalid_choice_keeps_max() {
        assert_eq!(ask("7\n").0, PaLevel::Max);
        assert_eq!(ask("high\n").0, PaLevel::Max);
        assert_eq!(ask("").0, PaLevel::Max);
    }
}
