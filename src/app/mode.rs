use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Navigate, // Browse, copy, pin, delete
    Search,   // Typing into the search field
    Edit,     // Text input for new or edited clips
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Navigate => write!(f, "NAVIGATE"),
            Mode::Search => write!(f, "SEARCH"),
            Mode::Edit => write!(f, "INSERT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Mode::Navigate.to_string(), "NAVIGATE");
        assert_eq!(Mode::Search.to_string(), "SEARCH");
        assert_eq!(Mode::Edit.to_string(), "INSERT");
    }

    #[test]
    fn test_default() {
        assert_eq!(Mode::default(), Mode::Navigate);
    }
}
