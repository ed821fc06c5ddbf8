use std::io::Write;

use crossterm::{cursor, queue, style, terminal};

/// Key hints shown on the top row of the player.
pub const HINTS: &[&str] = &[
    "[q][Esc] quit",
    "[Space] pause",
    "[r] restart",
    "[w] water",
];

/// Split a hint into `(is_key, text)` runs: text inside `[...]` is a key.
/// An unclosed bracket is treated as plain text.
pub fn hint_runs(hint: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut rest = hint;
    while !rest.is_empty() {
        let Some(open) = rest.find('[') else {
            runs.push((false, rest));
            break;
        };
        if open > 0 {
            runs.push((false, &rest[..open]));
        }
        rest = &rest[open..];
        match rest.find(']') {
            Some(close) => {
                runs.push((true, &rest[..=close]));
                rest = &rest[close + 1..];
            }
            None => {
                runs.push((false, rest));
                break;
            }
        }
    }
    runs
}

/// Draw the hint row: keys bold, descriptions dim.
pub fn render_menubar(out: &mut impl Write, hints: &[&str]) -> anyhow::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::Print(" "),
    )?;
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            queue!(out, style::Print("  "))?;
        }
        for (is_key, text) in hint_runs(hint) {
            let attr = if is_key { style::Attribute::Bold } else { style::Attribute::Dim };
            queue!(
                out,
                style::SetAttribute(attr),
                style::Print(text),
                style::SetAttribute(style::Attribute::Reset),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_runs_split_keys() {
        assert_eq!(
            hint_runs("[q][Esc] quit"),
            vec![(true, "[q]"), (true, "[Esc]"), (false, " quit")]
        );
        assert_eq!(hint_runs("plain"), vec![(false, "plain")]);
        assert_eq!(hint_runs("a [b"), vec![(false, "a "), (false, "[b")]);
    }
}
