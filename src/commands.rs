//! Available commands and autocomplete logic
use crate::api::settings::LegalDoc;
use crate::form::Route;

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// What running a command does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  Open(Route),
  Logout,
  Quit,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "dashboard",
    aliases: &["d", "home", "users"],
    description: "Totals and registered users",
  },
  Command {
    name: "posts",
    aliases: &["p", "ms-posts"],
    description: "MS posts",
  },
  Command {
    name: "stories",
    aliases: &["s", "blogs"],
    description: "User stories",
  },
  Command {
    name: "series",
    aliases: &["v", "videos"],
    description: "Upload series episodes",
  },
  Command {
    name: "donations",
    aliases: &["$", "donors"],
    description: "Donation ledger",
  },
  Command {
    name: "plans",
    aliases: &["subscriptions", "subs"],
    description: "Subscription plans",
  },
  Command {
    name: "profile",
    aliases: &["me", "account"],
    description: "Your profile and password",
  },
  Command {
    name: "terms",
    aliases: &["tos"],
    description: "Terms & conditions",
  },
  Command {
    name: "privacy",
    aliases: &["policy"],
    description: "Privacy policy",
  },
  Command {
    name: "trust",
    aliases: &["safety"],
    description: "Trust & safety",
  },
  Command {
    name: "logout",
    aliases: &["signout"],
    description: "Sign out",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit ms-admin",
  },
];

/// Resolve a command name (as produced by the palette) to its action
pub fn action(name: &str) -> Option<Action> {
  let action = match name {
    "dashboard" => Action::Open(Route::Dashboard),
    "posts" => Action::Open(Route::Posts),
    "stories" => Action::Open(Route::Stories),
    "series" => Action::Open(Route::Series),
    "donations" => Action::Open(Route::Donations),
    "plans" => Action::Open(Route::Plans),
    "profile" => Action::Open(Route::Profile),
    "terms" => Action::Open(Route::Legal(LegalDoc::Terms)),
    "privacy" => Action::Open(Route::Legal(LegalDoc::Privacy)),
    "trust" => Action::Open(Route::Legal(LegalDoc::Trust)),
    "logout" => Action::Logout,
    "quit" => Action::Quit,
    _ => return None,
  };
  Some(action)
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    let priority = if cmd.name == input_lower {
      0
    } else if cmd.aliases.contains(&input_lower.as_str()) {
      1
    } else if cmd.name.starts_with(&input_lower) {
      2
    } else if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      3
    } else if cmd.name.contains(&input_lower) {
      4
    } else if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      5
    } else if is_subsequence(&input_lower, cmd.name) {
      6
    } else {
      continue;
    };
    matches.push((cmd, priority));
  }

  // Stable sort keeps declaration order within a priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// `needle` characters appear in `haystack` in order
fn is_subsequence(needle: &str, haystack: &str) -> bool {
  let mut rest = haystack.chars();
  needle.chars().all(|c| rest.any(|h| h == c))
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
    let suggestions = get_suggestions("posts");
    assert_eq!(suggestions[0].name, "posts");
  }

  #[test]
  fn test_alias_match() {
    assert_eq!(get_suggestions("s")[0].name, "stories");
    assert_eq!(get_suggestions("subs")[0].name, "plans");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("don");
    assert_eq!(suggestions[0].name, "donations");
  }

  #[test]
  fn test_contains_match() {
    let suggestions = get_suggestions("ries");
    assert_eq!(suggestions[0].name, "stories");
    assert!(suggestions.iter().any(|c| c.name == "series"));
  }

  #[test]
  fn test_subsequence_match() {
    let suggestions = get_suggestions("dsh");
    assert_eq!(suggestions[0].name, "dashboard");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("zzz").is_empty());
  }

  #[test]
  fn test_every_command_has_an_action() {
    for cmd in COMMANDS {
      assert!(action(cmd.name).is_some(), "{} has no action", cmd.name);
    }
    assert_eq!(action("trust"), Some(Action::Open(Route::Legal(LegalDoc::Trust))));
    assert_eq!(action("nope"), None);
  }
}
