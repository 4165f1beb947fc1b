//! REPL input parsing.

/// Slash commands offered for completion, in display order.
pub const COMMANDS: &[&str] = &[
    "/keys", "/upload", "/search", "/save", "/sessions", "/load", "/clear", "/history", "/help",
];

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Quit,
    Help,
    Keys { openai: &'a str, tavily: &'a str },
    Upload(Vec<&'a str>),
    Search(&'a str),
    Save,
    Sessions,
    Load(&'a str),
    Clear,
    History,
    /// Anything that is not a command goes to the assistant.
    Chat(&'a str),
    /// A known command with missing arguments; carries its usage line.
    Usage(&'static str),
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parses a trimmed, non-empty line.
    pub fn parse(line: &'a str) -> Self {
        if line == "quit" || line == "exit" {
            return Command::Quit;
        }
        if !line.starts_with('/') {
            return Command::Chat(line);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "/help" => Command::Help,
            "/keys" => {
                let mut keys = rest.split_whitespace();
                match (keys.next(), keys.next(), keys.next()) {
                    (Some(openai), Some(tavily), None) => Command::Keys { openai, tavily },
                    _ => Command::Usage("/keys <openai-api-key> <tavily-api-key>"),
                }
            }
            "/upload" => {
                let paths: Vec<&str> = rest.split_whitespace().collect();
                if paths.is_empty() {
                    Command::Usage("/upload <file.pdf> [<file.pdf> ...]")
                } else {
                    Command::Upload(paths)
                }
            }
            "/search" if rest.is_empty() => Command::Usage("/search <question>"),
            "/search" => Command::Search(rest),
            "/save" => Command::Save,
            "/sessions" => Command::Sessions,
            "/load" if rest.is_empty() => Command::Usage("/load <session name>"),
            "/load" => Command::Load(rest),
            "/clear" => Command::Clear,
            "/history" => Command::History,
            other => Command::Unknown(other),
        }
    }
}

/// True for paths with a `.pdf` extension, in any case.
pub fn is_pdf(path: &str) -> bool {
    std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(Command::parse("what is in the manual?"), Command::Chat("what is in the manual?"));
        assert_eq!(Command::parse("exit"), Command::Quit);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            Command::parse("/keys sk-1 tvly-2"),
            Command::Keys {
                openai: "sk-1",
                tavily: "tvly-2"
            }
        );
        assert_eq!(
            Command::parse("/upload a.pdf  b.pdf"),
            Command::Upload(vec!["a.pdf", "b.pdf"])
        );
        assert_eq!(Command::parse("/search  latest  news "), Command::Search("latest  news"));
        assert_eq!(Command::parse("/load hello world"), Command::Load("hello world"));
    }

    #[test]
    fn test_missing_arguments_show_usage() {
        assert!(matches!(Command::parse("/keys only-one"), Command::Usage(_)));
        assert!(matches!(Command::parse("/upload"), Command::Usage(_)));
        assert!(matches!(Command::parse("/load"), Command::Usage(_)));
        assert_eq!(Command::parse("/nope"), Command::Unknown("/nope"));
    }

    #[test]
    fn test_load_finds_name_ending_in_space() {
        use docchat_core::session::{Message, SessionContext};

        let mut ctx = SessionContext::new();
        ctx.push(Message::user("a".repeat(49)));
        ctx.push(Message::user("second question"));
        let name = ctx.save().unwrap();
        assert!(name.ends_with(' '));

        let line = format!("/load {name}");
        let Command::Load(typed) = Command::parse(line.trim()) else {
            panic!("expected /load to parse");
        };
        assert!(ctx.load(typed));
        assert_eq!(ctx.messages().len(), 2);
    }

    #[test]
    fn test_pdf_filter() {
        assert!(is_pdf("docs/Manual.PDF"));
        assert!(is_pdf("a.pdf"));
        assert!(!is_pdf("notes.txt"));
        assert!(!is_pdf("pdf"));
    }
}
