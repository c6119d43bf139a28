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
    name: "characters",
    aliases: &["c", "chars", "list"],
    description: "Browse the character directory",
  },
  Command {
    name: "favorites",
    aliases: &["f", "favs"],
    description: "Your favorited characters",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit galdex",
  },
];

/// Get autocomplete suggestions for a given input, best match first.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();

  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| {
      let rank = if cmd.name == input {
        0
      } else if cmd.aliases.contains(&input.as_str()) {
        1
      } else if cmd.name.starts_with(&input) {
        2
      } else if cmd.name.contains(&input) {
        3
      } else {
        return None;
      };
      Some((cmd, rank))
    })
    .collect();

  matches.sort_by_key(|(_, rank)| *rank);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Resolve an input to a single command, if it names one exactly.
pub fn resolve(input: &str) -> Option<&'static Command> {
  let input = input.trim().to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == input || cmd.aliases.contains(&input.as_str()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_input_suggests_everything() {
    assert_eq!(get_suggestions("").len(), COMMANDS.len());
  }

  #[test]
  fn exact_and_alias_matches_rank_first() {
    let suggestions = get_suggestions("c");
    assert_eq!(suggestions[0].name, "characters");

    let suggestions = get_suggestions("favs");
    assert_eq!(suggestions[0].name, "favorites");
  }

  #[test]
  fn prefix_matches_are_found() {
    let suggestions = get_suggestions("fav");
    assert_eq!(suggestions[0].name, "favorites");
  }

  #[test]
  fn resolve_accepts_names_and_aliases_only() {
    assert_eq!(resolve("quit").unwrap().name, "quit");
    assert_eq!(resolve("q").unwrap().name, "quit");
    assert!(resolve("qu").is_none());
  }
}
