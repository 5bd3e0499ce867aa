//! Terminal rendering of bot replies and dataset previews

use crate::store::Dataset;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Split a search result line into its `[dataset]` tag and the matched text
fn split_result_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('[')?;
    let close = rest.find("] ")?;
    Some((&line[..close + 2], &rest[close + 2..]))
}

/// Print a reply, highlighting search result tags and status markers
pub fn print_reply(text: &str, color: bool) -> io::Result<()> {
    let mut stdout = stdout(color);

    for line in text.lines() {
        if let Some((tag, content)) = split_result_line(line) {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(stdout, "{}", tag)?;
            stdout.reset()?;
            writeln!(stdout, " {}", content)?;
        } else if line.starts_with('❌') {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            writeln!(stdout, "{}", line)?;
            stdout.reset()?;
        } else if line.starts_with('✅') {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            writeln!(stdout, "{}", line)?;
            stdout.reset()?;
        } else {
            writeln!(stdout, "{}", line)?;
        }
    }

    Ok(())
}

/// Print dataset metadata followed by its first `preview` lines
pub fn print_dataset(dataset: &Dataset, preview: usize, color: bool) -> io::Result<()> {
    let mut stdout = stdout(color);

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
    writeln!(stdout, "{}", dataset.name())?;
    stdout.reset()?;
    writeln!(stdout, "  Size:  {} bytes", dataset.size())?;
    writeln!(stdout, "  Lines: {}", dataset.lines_count())?;

    if preview == 0 || dataset.lines_count() == 0 {
        return Ok(());
    }

    writeln!(stdout)?;
    for (number, line) in dataset.lines().iter().take(preview).enumerate() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(stdout, "{}", number + 1)?;
        stdout.reset()?;
        writeln!(stdout, ":{}", line)?;
    }

    if dataset.lines_count() > preview {
        writeln!(stdout, "... and {} more", dataset.lines_count() - preview)?;
    }

    Ok(())
}
