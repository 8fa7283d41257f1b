// libkeyboard/src/session.rs
//
// Line-oriented driver for one or more keyboards sharing a registry.
//
// A plain line is typed button by button: every character is a button,
// `{name}` runs are function buttons and a blank is `{space}`. Lines that
// start with `:` are commands (see `HELP`).

use anyhow::{anyhow, bail, Context, Result};
use libkeyboard_core::{
    ActivationResult, InstanceRegistry, Keyboard, KeyboardEvent, KeyboardOptions, MountTarget,
    PhysicalKeyEvent,
};

pub const HELP: &str = "\
commands:
  <text>              type each character; {bksp}, {enter}, ... as function buttons
  :key CODE KEY       hardware key down+up, e.g. `:key KeyQ q`
  :caret START [END]  move the caret (UTF-16 offsets)
  :pick N             pick candidate N (1-based) from the visible page
  :next / :prev       page through candidates
  :clear              empty the active input
  :layout NAME        switch layout (default, shift, ...)
  :use N              make keyboard N (1-based) the active one
  :show               print every keyboard
  :help               this text
  :quit               leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Type(Vec<String>),
    Key { code: String, key: String },
    Caret { start: usize, end: Option<usize> },
    Pick(usize),
    NextPage,
    PrevPage,
    Clear,
    Layout(String),
    Use(usize),
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Type(split_buttons(line)));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        let number = |idx: usize| -> Result<usize> {
            let raw = args
                .get(idx)
                .ok_or_else(|| anyhow!(":{name} needs an argument"))?;
            raw.parse()
                .with_context(|| format!("`{raw}` is not a number"))
        };

        let command = match name {
            "key" => match args.as_slice() {
                [code, key] => Command::Key {
                    code: code.to_string(),
                    key: key.to_string(),
                },
                [code] => Command::Key {
                    code: code.to_string(),
                    key: String::new(),
                },
                _ => bail!(":key needs CODE [KEY]"),
            },
            "caret" => Command::Caret {
                start: number(0)?,
                end: if args.len() > 1 { Some(number(1)?) } else { None },
            },
            "pick" => match number(0)? {
                0 => bail!("candidates are numbered from 1"),
                n => Command::Pick(n - 1),
            },
            "next" => Command::NextPage,
            "prev" => Command::PrevPage,
            "clear" => Command::Clear,
            "layout" => Command::Layout(
                args.first()
                    .ok_or_else(|| anyhow!(":layout needs a name"))?
                    .to_string(),
            ),
            "use" => match number(0)? {
                0 => bail!("keyboards are numbered from 1"),
                n => Command::Use(n - 1),
            },
            "show" => Command::Show,
            "help" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => bail!("unknown command :{other} (try :help)"),
        };
        Ok(command)
    }
}

/// Split typed text into buttons.
pub fn split_buttons(text: &str) -> Vec<String> {
    let mut buttons = Vec::new();
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        if ch == '{' {
            if let Some(close) = rest.find('}') {
                if close > 1 {
                    buttons.push(rest[..=close].to_string());
                    rest = &rest[close + 1..];
                    continue;
                }
            }
        }
        if ch == ' ' {
            buttons.push("{space}".to_string());
        } else {
            buttons.push(ch.to_string());
        }
        rest = &rest[ch.len_utf8()..];
    }
    buttons
}

pub struct Session {
    registry: InstanceRegistry,
    keyboards: Vec<Keyboard>,
    active: usize,
}

impl Session {
    /// Start `instances` keyboards with the same options. The first one
    /// mounts on the default container, the rest on `.keyboard-N`.
    pub fn new(options: KeyboardOptions, instances: usize) -> Result<Self> {
        let registry = InstanceRegistry::new();
        let mut keyboards = Vec::new();
        for n in 0..instances.max(1) {
            let mount = if n == 0 {
                MountTarget::Default
            } else {
                MountTarget::Selector(format!(".keyboard-{}", n + 1))
            };
            let mut keyboard = Keyboard::new(mount, options.clone(), &registry)?;
            let id = keyboard.id().to_string();
            keyboard.subscribe(move |event| match event {
                KeyboardEvent::Change { input_name, input } => {
                    tracing::info!(keyboard = %id, input = %input_name, value = %input, "change");
                }
                KeyboardEvent::CandidatesChanged { page: Some(page) } => {
                    tracing::info!(keyboard = %id, trigger = %page.trigger, page = page.page, "candidates");
                }
                _ => {}
            });
            keyboards.push(keyboard);
        }
        Ok(Self {
            registry,
            keyboards,
            active: 0,
        })
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn keyboards(&self) -> &[Keyboard] {
        &self.keyboards
    }

    pub fn active(&self) -> &Keyboard {
        &self.keyboards[self.active]
    }

    fn active_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboards[self.active]
    }

    /// Run a command. Returns lines to print, or `None` to quit.
    pub fn execute(&mut self, command: Command) -> Result<Option<Vec<String>>> {
        let mut out = Vec::new();
        match command {
            Command::Quit => return Ok(None),
            Command::Help => {
                out.extend(HELP.lines().map(str::to_string));
                return Ok(Some(out));
            }
            Command::Show => {
                for idx in 0..self.keyboards.len() {
                    out.extend(self.describe(idx));
                }
                return Ok(Some(out));
            }
            Command::Type(buttons) => {
                for button in &buttons {
                    if self.active_mut().handle_activation(button)? == ActivationResult::Rejected {
                        out.push(format!("rejected {button}"));
                    }
                }
            }
            Command::Key { code, key } => {
                let keyboard = self.active_mut();
                keyboard.handle_physical_key(&PhysicalKeyEvent::down(code.as_str(), key.as_str()))?;
                keyboard.handle_physical_key(&PhysicalKeyEvent::up(code, key))?;
            }
            Command::Caret { start, end } => self.active_mut().set_caret_position(start, end),
            Command::Pick(index) => {
                if self.active_mut().select_candidate(index)?.is_none() {
                    out.push("no such candidate".to_string());
                }
            }
            Command::NextPage => {
                self.active_mut().candidates_next_page();
            }
            Command::PrevPage => {
                self.active_mut().candidates_prev_page();
            }
            Command::Clear => self.active_mut().clear_input(None)?,
            Command::Layout(name) => {
                if !self.active().options().layout.contains(&name) {
                    bail!("no layout named {name}");
                }
                self.active_mut().set_options(|o| o.layout_name = name)?;
            }
            Command::Use(index) => {
                if index >= self.keyboards.len() {
                    bail!("only {} keyboard(s) running", self.keyboards.len());
                }
                self.active = index;
            }
        }
        out.extend(self.describe(self.active));
        Ok(Some(out))
    }

    /// Parse and run one input line.
    pub fn run_line(&mut self, line: &str) -> Result<Option<Vec<String>>> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }
        self.execute(Command::parse(line)?)
    }

    fn describe(&self, idx: usize) -> Vec<String> {
        let keyboard = &self.keyboards[idx];
        let marker = if idx == self.active { '*' } else { ' ' };
        let caret = match (keyboard.caret_position(), keyboard.caret_position_end()) {
            (Some(start), Some(end)) if start != end => format!("{start}..{end}"),
            (Some(start), _) => start.to_string(),
            _ => "-".to_string(),
        };
        let state = keyboard.state();
        let mut lines = vec![format!(
            "{marker} [{}] {:?} caret {caret}",
            keyboard.id(),
            state.raw_input(None)
        )];
        if let Some(page) = state.candidate_page() {
            let items: Vec<String> = page
                .candidates
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}.{}", i + 1, c))
                .collect();
            lines.push(format!(
                "    {} [{}/{}] {}",
                page.trigger,
                page.page + 1,
                page.num_pages,
                items.join(" ")
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_buttons() {
        assert_eq!(split_buttons("ab"), vec!["a", "b"]);
        assert_eq!(split_buttons("a b"), vec!["a", "{space}", "b"]);
        assert_eq!(split_buttons("x{bksp}y"), vec!["x", "{bksp}", "y"]);
        // Unclosed or empty braces are literal
        assert_eq!(split_buttons("{"), vec!["{"]);
        assert_eq!(split_buttons("{}"), vec!["{", "}"]);
        assert_eq!(split_buttons("你好"), vec!["你", "好"]);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse(":key KeyQ q").unwrap(),
            Command::Key {
                code: "KeyQ".into(),
                key: "q".into()
            }
        );
        assert_eq!(
            Command::parse(":caret 1 3").unwrap(),
            Command::Caret {
                start: 1,
                end: Some(3)
            }
        );
        assert_eq!(Command::parse(":pick 2").unwrap(), Command::Pick(1));
        assert_eq!(Command::parse(":q").unwrap(), Command::Quit);
        assert!(Command::parse(":pick 0").is_err());
        assert!(Command::parse(":caret x").is_err());
        assert!(Command::parse(":bogus").is_err());
    }

    #[test]
    fn test_session_types_and_picks() {
        let options = crate::layouts::preset("pinyin").unwrap();
        let mut session = Session::new(options, 1).unwrap();

        let out = session.run_line("ni").unwrap().unwrap();
        assert!(out[1].contains("1.你"));

        session.run_line(":pick 1").unwrap();
        assert_eq!(session.active().get_input(None), "你");
    }

    #[test]
    fn test_quit_and_unknown_layout() {
        let mut session = Session::new(KeyboardOptions::default(), 2).unwrap();
        assert!(session.run_line(":layout nope").is_err());
        assert!(session.run_line(":use 3").is_err());
        assert!(session.run_line(":use 2").is_ok());
        assert_eq!(session.active().id().as_str(), "keyboard2");
        assert_eq!(session.run_line(":quit").unwrap(), None);
    }
}
