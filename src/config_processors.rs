use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem};

/// Strip quotes from configuration strings.
pub trait Unquote
where
    Self: Sized,
{
    fn unquote(self) -> Result<StringItem, ConfigError>;
}

impl Unquote for Result<StringItem, ConfigError> {
    /// Trims every value and removes one pair of matching surrounding quotes,
    /// either `"` or `'`. Unquoted values are kept as they are, so paths and
    /// filter directives can be written either way.
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|value| match strip_quotes(value) {
            Some(inner) => MapAction::Replace(vec![inner.to_owned()]),
            None => MapAction::Keep,
        })
    }
}

fn strip_quotes(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.len() < 2 {
        return None;
    }
    ['"', '\'']
        .iter()
        .find(|quote| value.starts_with(**quote) && value.ends_with(**quote))
        .map(|_| &value[1..value.len() - 1])
}
