use mathmate_analysis::{MatchKind, SymbolData, SymbolIndex};

use crate::prelude::*;
use crate::trigger::CompletionQuery;

/// A ranked symbol suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolCandidate {
    /// The key the query matched, e.g. a shorthand or a LaTeX command.
    pub key: EcoString,
    /// How the key matched.
    pub kind: MatchKind,
    /// The suggested symbol.
    pub symbol: SymbolData,
}

impl SymbolCandidate {
    /// The popup label, naming the symbol the way the query was typed.
    pub fn label(&self, latex: bool) -> EcoString {
        let name = if latex {
            &self.symbol.latex_name
        } else {
            &self.symbol.name
        };
        eco_format!("{}: {} ({})", self.symbol.sym, name, self.symbol.math_class)
    }
}

/// Searches `index` for the candidates of a symbol query.
pub fn symbol_candidates(index: &SymbolIndex, word: &str) -> Vec<SymbolCandidate> {
    index
        .search(word)
        .into_iter()
        .map(|found| SymbolCandidate {
            key: found.key.into(),
            kind: found.kind,
            symbol: found.symbol.clone(),
        })
        .collect()
}

/// Replaces the query, up to the cursor, with the symbol.
///
/// Inserts the glyph if `unicode` is set and the Typst name otherwise. A space
/// follows unless the symbol usually takes an argument right away.
pub fn apply_symbol(
    query: &CompletionQuery,
    symbol: &SymbolData,
    cursor: EditorPosition,
    unicode: bool,
) -> Splice {
    let inserted = if unicode { &symbol.sym } else { &symbol.name };
    let text = if symbol.math_class.takes_argument() {
        inserted.clone()
    } else {
        eco_format!("{inserted} ")
    };
    Splice::replace(TextEdit::new(EditorRange::new(query.start, cursor), text))
}

/// Replaces the query with the symbol's name, keeping edit mode. A symbol
/// whose name is already fully typed is applied instead.
pub fn complete_symbol(
    query: &CompletionQuery,
    symbol: &SymbolData,
    cursor: EditorPosition,
    unicode: bool,
) -> Splice {
    if symbol.name == query.word {
        return apply_symbol(query, symbol, cursor, unicode);
    }
    Splice::replace(TextEdit::new(query.range(), symbol.name.clone()))
}
