/// What an encoded tree describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodeMode {
    /// Every configurable path, with current values as defaults. Unset
    /// optionals are described through their default instance and
    /// containers through a single placeholder entry.
    #[default]
    Schema,
    /// Only what is actually set, with real map keys and sequence indexes.
    Data,
}

/// How sequence indexes are spelled when a tree is flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStyle {
    /// Its own segment: `FOO_0_BAR`, `foo/0/bar`.
    Bare,
    /// Attached to the previous segment: `foo[0].bar`.
    Suffix,
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Print the loaded configuration as labels.
    Show,
    /// Print the environment variables the configuration reads, with defaults.
    Env,
    /// Print the command-line flags the configuration reads, with defaults.
    Flags,
}
