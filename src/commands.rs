/// A chat command recognised by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Recent,
    /// `None` unless exactly one language argument was given.
    SetLang(Option<String>),
    Help,
    Unknown(String),
}

impl Command {
    /// Classify already-tokenized input. Returns `None` for an empty token list.
    ///
    /// Matching is case-sensitive: `!Recent` is unknown.
    pub fn from_tokens(tokens: &[&str]) -> Option<Self> {
        let (first, args) = tokens.split_first()?;
        let command = match *first {
            "!recent" => Command::Recent,
            "!setLang" => match args {
                [language] => Command::SetLang(Some(language.to_string())),
                _ => Command::SetLang(None),
            },
            "!help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Drop a leading `mention` token (e.g. `@relay_bot`) and surrounding whitespace.
pub fn strip_mention<'a>(text: &'a str, mention: &str) -> &'a str {
    let trimmed = text.trim();
    if mention.is_empty() {
        return trimmed;
    }
    match trimmed.strip_prefix(mention) {
        // Only a whole token counts: `@relay_bot2` is someone else.
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => trimmed,
    }
}

/// Split cleaned message text and classify it.
pub fn parse(text: &str, mention: &str) -> Option<Command> {
    let tokens: Vec<&str> = strip_mention(text, mention).split_whitespace().collect();
    Command::from_tokens(&tokens)
}
