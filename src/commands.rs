/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "groups",
    aliases: &["g", "home"],
    description: "Show all groups",
  },
  Command {
    name: "sync",
    aliases: &["s"],
    description: "Sync with the cloud now",
  },
  Command {
    name: "cache",
    aliases: &["c"],
    description: "Cache status; 'cache clear' / 'cache load'",
  },
  Command {
    name: "export",
    aliases: &["x"],
    description: "Export groups to a JSON file",
  },
  Command {
    name: "import",
    aliases: &["m"],
    description: "Import and merge a JSON file",
  },
  Command {
    name: "theme",
    aliases: &["t"],
    description: "Toggle light/dark theme",
  },
  Command {
    name: "login",
    aliases: &[],
    description: "Sign in to cloud sync",
  },
  Command {
    name: "logout",
    aliases: &[],
    description: "Sign out of cloud sync",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit worg",
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  // Only the command word participates in matching; arguments don't.
  let input_lower = input
    .split_whitespace()
    .next()
    .unwrap_or("")
    .to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("groups");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "groups");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("g");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "groups");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("exp");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "export");
  }

  #[test]
  fn test_arguments_do_not_break_matching() {
    let suggestions = get_suggestions("import ~/groups.json");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "import");
  }
}
