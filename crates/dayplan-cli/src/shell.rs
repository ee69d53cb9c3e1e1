// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use dayplan_app::{
    ActivityId, KeyboardHub, KeyboardNotice, Navigator, ScreenCommand, ScreenController,
    ScreenEvent, ScreenPhase, ScreenView, SelectionSink,
};
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

const LOAD_POLL: Duration = Duration::from_millis(100);
const HEADER_TITLE: &str = "Select essential activities!";
const HEADER_HINT: &str =
    "Choose as many as you want. Those selected will be included in your final schedule.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    EnterSearch,
    Toggle(ActivityId),
    Remove(ActivityId),
    ClearQuery,
    Retry,
    Next,
    Back,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    Left,
    Quit,
    EndOfInput,
}

pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(ShellCommand::Show);
    };
    let command = match head {
        "/" | "search" => ShellCommand::EnterSearch,
        "t" | "toggle" => ShellCommand::Toggle(parse_id(parts.next(), head)?),
        "r" | "remove" => ShellCommand::Remove(parse_id(parts.next(), head)?),
        "c" | "clear" => ShellCommand::ClearQuery,
        "retry" => ShellCommand::Retry,
        "n" | "next" => ShellCommand::Next,
        "b" | "back" => ShellCommand::Back,
        "ls" | "show" => ShellCommand::Show,
        "?" | "help" => ShellCommand::Help,
        "q" | "quit" => ShellCommand::Quit,
        other => return Err(format!("unknown command {other:?}; type `help`")),
    };
    if let Some(extra) = parts.next() {
        return Err(format!("unexpected argument {extra:?} for {head:?}"));
    }
    Ok(command)
}

fn parse_id(raw: Option<&str>, command: &str) -> Result<ActivityId, String> {
    let raw = raw.ok_or_else(|| format!("{command} needs an activity id"))?;
    raw.parse::<i64>()
        .map(ActivityId::new)
        .map_err(|_| format!("{raw:?} is not an activity id"))
}

pub fn render(view: &ScreenView) -> String {
    let mut out = String::new();
    match view.phase {
        ScreenPhase::Loading => {
            out.push_str("loading activities...\n");
            return out;
        }
        ScreenPhase::Failed => {
            out.push_str(&format!(
                "could not load activities: {}\ntype `retry` to try again or `back` to leave\n",
                view.load_error.as_deref().unwrap_or("unknown error")
            ));
            return out;
        }
        ScreenPhase::Ready => {}
    }

    if view.footer_visible() {
        out.push_str(HEADER_TITLE);
        out.push('\n');
        out.push_str(HEADER_HINT);
        out.push('\n');
    }

    out.push_str(&format!("search: {}", view.query));
    if view.has_query {
        out.push_str("  (c to clear)");
    }
    out.push('\n');

    if view.no_results {
        out.push_str("  No activities found\n");
    }
    for row in &view.rows {
        let mark = if row.selected { "x" } else { " " };
        out.push_str(&format!(
            "  [{mark}] {:>4}  {}\n",
            row.activity.id.get(),
            row.activity.title
        ));
    }

    if view.footer_visible() {
        if !view.pills.is_empty() {
            let pills: Vec<String> = view
                .pills
                .iter()
                .map(|pill| format!("[{} x{}]", pill.label, pill.id))
                .collect();
            out.push_str(&format!("selected: {}\n", pills.join(" ")));
        }
        out.push_str("[ Next > ]\n");
    }
    out
}

fn help_text() -> &'static str {
    "commands:\n  /            search (each line sets the query, empty line closes the keyboard)\n  t <id>       toggle an activity\n  r <id>       remove a selected activity\n  c            clear the search\n  retry        reload after a failed load\n  next         submit and continue\n  back         leave without submitting\n  q            quit\n"
}

pub struct Shell<'a> {
    keyboard: &'a KeyboardHub,
    load_budget: Duration,
    searching: bool,
}

impl<'a> Shell<'a> {
    pub fn new(keyboard: &'a KeyboardHub, load_budget: Duration) -> Self {
        Self {
            keyboard,
            load_budget,
            searching: false,
        }
    }

    pub fn run<S, N, R, W>(
        &mut self,
        screen: &mut ScreenController<S, N>,
        input: R,
        output: &mut W,
    ) -> Result<ShellExit>
    where
        S: SelectionSink,
        N: Navigator,
        R: BufRead,
        W: Write,
    {
        self.wait_for_catalog(screen, output)?;
        write!(output, "{}", render(&screen.view())).context("write screen")?;

        for line in input.lines() {
            let line = line.context("read command")?;
            if self.searching {
                self.handle_search_line(screen, &line, output)?;
                continue;
            }

            let command = match parse_line(&line) {
                Ok(command) => command,
                Err(message) => {
                    writeln!(output, "{message}").context("write error")?;
                    continue;
                }
            };
            if let Some(exit) = self.handle_command(screen, command, output)? {
                return Ok(exit);
            }
            report(&screen.pump(), output)?;
        }
        self.close_keyboard();
        Ok(ShellExit::EndOfInput)
    }

    fn handle_command<S, N, W>(
        &mut self,
        screen: &mut ScreenController<S, N>,
        command: ShellCommand,
        output: &mut W,
    ) -> Result<Option<ShellExit>>
    where
        S: SelectionSink,
        N: Navigator,
        W: Write,
    {
        let events = match command {
            ShellCommand::EnterSearch => {
                let events = screen.dispatch(ScreenCommand::FocusSearch);
                self.searching = true;
                self.keyboard.emit(KeyboardNotice::Shown);
                events
            }
            ShellCommand::Toggle(id) => screen.dispatch(ScreenCommand::Toggle(id)),
            ShellCommand::Remove(id) => screen.dispatch(ScreenCommand::Remove(id)),
            ShellCommand::ClearQuery => screen.dispatch(ScreenCommand::ClearQuery),
            ShellCommand::Retry => {
                let events = screen.retry_load();
                report(&events, output)?;
                self.wait_for_catalog(screen, output)?;
                Vec::new()
            }
            ShellCommand::Next => {
                let events = screen.advance();
                if events.is_empty() {
                    writeln!(output, "nothing to submit until activities have loaded")
                        .context("write notice")?;
                    return Ok(None);
                }
                report(&events, output)?;
                return Ok(Some(ShellExit::Left));
            }
            ShellCommand::Back => {
                report(&screen.back(), output)?;
                return Ok(Some(ShellExit::Left));
            }
            ShellCommand::Show => Vec::new(),
            ShellCommand::Help => {
                write!(output, "{}", help_text()).context("write help")?;
                return Ok(None);
            }
            ShellCommand::Quit => {
                screen.teardown();
                return Ok(Some(ShellExit::Quit));
            }
        };
        report(&events, output)?;
        write!(output, "{}", render(&screen.view())).context("write screen")?;
        Ok(None)
    }

    fn handle_search_line<S, N, W>(
        &mut self,
        screen: &mut ScreenController<S, N>,
        line: &str,
        output: &mut W,
    ) -> Result<()>
    where
        S: SelectionSink,
        N: Navigator,
        W: Write,
    {
        if line.is_empty() {
            self.close_keyboard();
        } else {
            screen.dispatch(ScreenCommand::SetQuery(line.to_owned()));
        }
        report(&screen.pump(), output)?;
        write!(output, "{}", render(&screen.view())).context("write screen")
    }

    fn close_keyboard(&mut self) {
        if self.searching {
            self.searching = false;
            self.keyboard.emit(KeyboardNotice::Hidden);
        }
    }

    fn wait_for_catalog<S, N, W>(
        &self,
        screen: &mut ScreenController<S, N>,
        output: &mut W,
    ) -> Result<()>
    where
        S: SelectionSink,
        N: Navigator,
        W: Write,
    {
        let deadline = Instant::now() + self.load_budget;
        while screen.phase() == ScreenPhase::Loading && Instant::now() < deadline {
            report(&screen.pump_blocking(LOAD_POLL), output)?;
        }
        Ok(())
    }
}

fn report<W: Write>(events: &[ScreenEvent], output: &mut W) -> Result<()> {
    for event in events {
        let line = match event {
            ScreenEvent::CatalogFailed { error, attempts } => {
                format!("load failed after {attempts} attempt(s): {error}")
            }
            ScreenEvent::SubmissionFailed { error } => {
                format!("could not save your selection ({error}); continuing anyway")
            }
            ScreenEvent::Submitted { count } => format!("saved {count} essential activities"),
            ScreenEvent::NavigatedForward { route } => format!("-> {route}"),
            ScreenEvent::NavigatedBack => "<- back".to_owned(),
            ScreenEvent::QueryChanged(_)
            | ScreenEvent::SearchActivated
            | ScreenEvent::SelectionChanged(_)
            | ScreenEvent::CatalogLoaded { .. }
            | ScreenEvent::LoadStarted { .. } => continue,
        };
        writeln!(output, "{line}").context("write event")?;
    }
    Ok(())
}
