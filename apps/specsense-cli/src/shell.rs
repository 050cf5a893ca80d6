/// One line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Search(String),
    Reload,
    Alpha(f32),
    TopK(usize),
    Stats,
    Help,
    Quit,
    Invalid(String),
}

pub const HELP: &str = "\
  <text>       search the catalog
  :alpha <x>   dense weight in [0, 1]
  :k <n>       number of results
  :reload      re-read the catalog and swap in a fresh index
  :stats       index statistics
  :quit        exit";

/// `None` for blank lines.
pub fn parse_line(line: &str) -> Option<ShellCommand> {
    let line = line.trim();
    if line.is_empty() { return None; }
    let Some(command) = line.strip_prefix(':') else { return Some(ShellCommand::Search(line.to_string())) };
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    let parsed = match (name, arg) {
        ("q" | "quit" | "exit", _) => ShellCommand::Quit,
        ("reload", _) => ShellCommand::Reload,
        ("stats", _) => ShellCommand::Stats,
        ("help" | "h", _) => ShellCommand::Help,
        ("alpha", Some(x)) => match x.parse::<f32>() {
            Ok(a) if (0.0..=1.0).contains(&a) => ShellCommand::Alpha(a),
            _ => ShellCommand::Invalid(format!("alpha must be a number in [0, 1], got '{x}'")),
        },
        ("k", Some(n)) => match n.parse::<usize>() {
            Ok(k) if k > 0 => ShellCommand::TopK(k),
            _ => ShellCommand::Invalid(format!("k must be a positive integer, got '{n}'")),
        },
        ("alpha" | "k", None) => ShellCommand::Invalid(format!(":{name} needs a value")),
        _ => ShellCommand::Invalid(format!("unknown command ':{name}' (try :help)")),
    };
    Some(parsed)
}
