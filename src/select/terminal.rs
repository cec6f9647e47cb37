//! Interactive page selection on a terminal

use super::{PageSelector, SelectionState, Step};
use crate::crawler::Sitemap;
use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

/// Longest title shown before truncation
const MAX_TITLE_CHARS: usize = 60;

/// Shortens a title to 60 characters, marking the cut with `...`
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    let mut short: String = title.chars().take(MAX_TITLE_CHARS).collect();
    short.push_str("...");
    short
}

/// Reads selection commands from `input` and renders pages to `output`
///
/// End of input finishes the selection with whatever is selected.
pub struct TerminalSelector<R, W> {
    input: R,
    output: W,
}

impl TerminalSelector<StdinLock<'static>, Stdout> {
    /// A selector on the process's stdin and stdout
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn render(&mut self, state: &SelectionState) -> io::Result<()> {
        writeln!(
            self.output,
            "\nPage {}/{} ({} of {} selected)",
            state.page() + 1,
            state.page_count(),
            state.selected_count(),
            state.len()
        )?;
        for (index, _url, title) in state.visible() {
            let mark = if state.is_selected(index) { 'x' } else { ' ' };
            writeln!(self.output, "  [{}] {:>3}. {}", mark, index, truncate_title(title))?;
        }
        writeln!(
            self.output,
            "Toggle: 3 | 1 3 5 | 2-6   Select: all, none   Page: n, p   Finish: done"
        )?;
        write!(self.output, "> ")?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> PageSelector for TerminalSelector<R, W> {
    fn select_pages(&mut self, sitemap: &Sitemap) -> io::Result<Vec<String>> {
        let mut state = SelectionState::new(sitemap);
        let mut line = String::new();

        loop {
            self.render(&state)?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                break;
            }

            match state.handle_input(&line) {
                Step::Continue => {}
                Step::Invalid(message) => writeln!(self.output, "{}", message)?,
                Step::Done => break,
            }
        }

        Ok(state.selected_urls())
    }
}
