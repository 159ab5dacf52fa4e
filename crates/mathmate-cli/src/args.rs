use std::path::PathBuf;

use mathmate_std::EditorPosition;

#[derive(Debug, Clone, clap::Parser)]
#[clap(name = "mathmate", author, version, about)]
pub struct CliArguments {
    /// The configuration file, in JSON or TOML
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Logs debug messages
    #[clap(long, short, global = true)]
    pub verbose: bool,

    /// Mode of the binary
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Commands {
    /// Prints the math region around a position as JSON
    Region(CursorArgs),
    /// Prints the bracket pairs of the math region around a position
    Brackets(CursorArgs),
    /// Searches the symbol table
    Symbols(SymbolsArgs),
    /// Prints the suggestions offered at a position
    Trigger(CursorArgs),
    /// Replays key presses on a document
    Replay(ReplayArgs),
}

#[derive(Debug, Clone, clap::Parser)]
pub struct CursorArgs {
    /// The document to inspect.
    pub file: PathBuf,
    /// The zero-based line of the cursor.
    #[clap(long, default_value_t = 0)]
    pub line: usize,
    /// The zero-based column of the cursor, in UTF-16 code units.
    #[clap(long, default_value_t = 0)]
    pub ch: usize,
}

impl CursorArgs {
    pub fn cursor(&self) -> EditorPosition {
        EditorPosition::new(self.line, self.ch)
    }
}

#[derive(Debug, Clone, clap::Parser)]
pub struct SymbolsArgs {
    /// A symbol name, shorthand or `\`-prefixed LaTeX command.
    pub query: String,
    /// The maximum number of matches to print.
    #[clap(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Clone, clap::Parser)]
pub struct ReplayArgs {
    #[clap(flatten)]
    pub cursor: CursorArgs,
    /// Space separated chords, e.g. `a l Enter Shift+Tab`. A token that names
    /// no key is typed as text.
    #[clap(long, default_value = "")]
    pub keys: String,
    /// Prints every effect as a JSON line.
    #[clap(long)]
    pub effects: bool,
}
