//! The symbol table and its prefix/substring search.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use ecow::EcoString;
use mathmate_std::error::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// The bundled symbol table.
pub static SYMBOLS: LazyLock<SymbolIndex> = LazyLock::new(|| {
    SymbolIndex::from_json(include_str!("../assets/symbols.json")).unwrap_or_else(|err| {
        log::error!("failed to load the bundled symbol table: {err}");
        SymbolIndex::default()
    })
});

/// The math class of a symbol, as reported by the symbol reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "EcoString", into = "EcoString")]
pub enum MathClass {
    /// An ordinary symbol.
    Normal,
    /// A letter.
    Alphabetic,
    /// A binary operator.
    Binary,
    /// A relation.
    Relation,
    /// An opening delimiter.
    Opening,
    /// A closing delimiter.
    Closing,
    /// A fence, e.g. `|`.
    Fence,
    /// Punctuation.
    Punctuation,
    /// A large operator, e.g. `sum`.
    Large,
    /// A text operator, e.g. `lim` or `sin`.
    Op,
    /// A unary operator.
    Unary,
    /// A diacritic.
    Diacritic,
    /// A symbol whose class depends on its context.
    Vary,
    /// A space.
    Space,
    /// Any other class.
    Other(EcoString),
}

impl MathClass {
    /// Whether symbols of this class are usually followed directly by an
    /// argument, so no space is inserted after them.
    pub fn takes_argument(&self) -> bool {
        matches!(self, MathClass::Op | MathClass::Large)
    }

    /// The name of the class.
    pub fn as_str(&self) -> &str {
        match self {
            MathClass::Normal => "Normal",
            MathClass::Alphabetic => "Alphabetic",
            MathClass::Binary => "Binary",
            MathClass::Relation => "Relation",
            MathClass::Opening => "Opening",
            MathClass::Closing => "Closing",
            MathClass::Fence => "Fence",
            MathClass::Punctuation => "Punctuation",
            MathClass::Large => "Large",
            MathClass::Op => "op",
            MathClass::Unary => "Unary",
            MathClass::Diacritic => "Diacritic",
            MathClass::Vary => "Vary",
            MathClass::Space => "Space",
            MathClass::Other(name) => name,
        }
    }
}

impl From<EcoString> for MathClass {
    fn from(name: EcoString) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "normal" => MathClass::Normal,
            "alphabetic" => MathClass::Alphabetic,
            "binary" => MathClass::Binary,
            "relation" => MathClass::Relation,
            "opening" => MathClass::Opening,
            "closing" => MathClass::Closing,
            "fence" => MathClass::Fence,
            "punctuation" => MathClass::Punctuation,
            "large" => MathClass::Large,
            "op" => MathClass::Op,
            "unary" => MathClass::Unary,
            "diacritic" => MathClass::Diacritic,
            "vary" => MathClass::Vary,
            "space" => MathClass::Space,
            _ => MathClass::Other(name),
        }
    }
}

impl From<MathClass> for EcoString {
    fn from(class: MathClass) -> Self {
        match class {
            MathClass::Other(name) => name,
            class => class.as_str().into(),
        }
    }
}

impl std::fmt::Display for MathClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record of the symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolData {
    /// The glyph.
    pub sym: EcoString,
    /// The Unicode name of the glyph.
    #[serde(default)]
    pub unic_name: EcoString,
    /// The Typst identifier.
    pub name: EcoString,
    /// The Typst shorthand, e.g. `->`.
    #[serde(default)]
    pub shorthand: Option<EcoString>,
    /// The math class.
    pub math_class: MathClass,
    /// The LaTeX command, including the backslash. Empty if there is none.
    #[serde(default)]
    pub latex_name: EcoString,
}

/// How a search result matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum MatchKind {
    /// The key starts with the query and has no `.` in it.
    Base,
    /// The key starts with the query and names a variant, e.g. `arrow.r`.
    Variant,
    /// The key merely contains the query.
    Substring,
}

/// A search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMatch<'a> {
    /// The key that matched.
    pub key: &'a str,
    /// The matched symbol.
    pub symbol: &'a SymbolData,
    /// How the key matched.
    pub kind: MatchKind,
}

#[derive(Debug, Default)]
struct Table {
    by_key: FxHashMap<EcoString, SymbolData>,
    /// Keys ordered by length, shortest first.
    keys: Vec<EcoString>,
}

impl Table {
    fn insert(&mut self, key: EcoString, symbol: SymbolData) {
        if key.is_empty() {
            return;
        }
        self.by_key.insert(key, symbol);
    }

    fn seal(&mut self) {
        self.keys = self.by_key.keys().cloned().collect();
        self.keys
            .sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    }

    fn search(&self, query: &str) -> Vec<SymbolMatch<'_>> {
        let (prefixed, substrings): (Vec<_>, Vec<_>) = self
            .keys
            .iter()
            .filter(|key| key.contains(query))
            .partition(|key| key.starts_with(query));
        let (bases, variants): (Vec<_>, Vec<_>) =
            prefixed.into_iter().partition(|key| !key.contains('.'));
        let variant_kind = if bases.is_empty() {
            MatchKind::Base
        } else {
            MatchKind::Variant
        };

        let tagged = bases
            .into_iter()
            .map(|key| (key, MatchKind::Base))
            .chain(variants.into_iter().map(|key| (key, variant_kind)))
            .chain(substrings.into_iter().map(|key| (key, MatchKind::Substring)));
        tagged
            .filter_map(|(key, kind)| {
                let symbol = self.by_key.get(key)?;
                Some(SymbolMatch {
                    key: key.as_str(),
                    symbol,
                    kind,
                })
            })
            .collect()
    }
}

/// Looks up symbols by their Typst name (or shorthand) and by their LaTeX
/// command.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    names: Table,
    latex: Table,
}

impl SymbolIndex {
    /// Builds an index from a JSON object mapping keys to symbol records.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: BTreeMap<EcoString, SymbolData> =
            serde_json::from_str(json).context("symbol table")?;
        Ok(Self::from_records(records))
    }

    /// Builds an index from `(key, record)` pairs. When two records share a
    /// LaTeX command, the later one wins.
    pub fn from_records(records: impl IntoIterator<Item = (EcoString, SymbolData)>) -> Self {
        let mut index = Self::default();
        for (key, symbol) in records {
            index.latex.insert(symbol.latex_name.replace("\\", "").into(), symbol.clone());
            index.names.insert(key, symbol);
        }
        index.names.seal();
        index.latex.seal();
        index
    }

    /// Builds an index keyed by each symbol's name and, if present, its
    /// shorthand.
    pub fn from_symbols(symbols: impl IntoIterator<Item = SymbolData>) -> Self {
        Self::from_records(symbols.into_iter().flat_map(|symbol| {
            let shorthand = symbol.shorthand.clone().map(|s| (s, symbol.clone()));
            shorthand.into_iter().chain([(symbol.name.clone(), symbol)])
        }))
    }

    /// The number of native keys.
    pub fn len(&self) -> usize {
        self.names.keys.len()
    }

    /// Whether the index holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.names.keys.is_empty()
    }

    /// Looks up a symbol by its Typst name or shorthand.
    pub fn get(&self, key: &str) -> Option<&SymbolData> {
        self.names.by_key.get(key)
    }

    /// Searches the index.
    ///
    /// A query starting with `\` searches LaTeX commands, with every backslash
    /// removed from the query. Results list prefix matches without a `.`
    /// first, then prefix matches naming variants, then keys that merely
    /// contain the query; each group is ordered shortest key first. When no
    /// base form matches, variants are reported as bases.
    pub fn search(&self, query: &str) -> Vec<SymbolMatch<'_>> {
        if query.starts_with('\\') {
            self.latex.search(&query.replace('\\', ""))
        } else {
            self.names.search(query)
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn listing(matches: &[SymbolMatch]) -> String {
        matches
            .iter()
            .map(|m| format!("{} {} {}", m.kind, m.key, m.symbol.sym))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn bundled_table_loads() {
        assert!(SYMBOLS.len() > 100);
        assert_eq!(SYMBOLS.get("alpha").map(|s| s.sym.as_str()), Some("α"));
        assert_eq!(SYMBOLS.get("->").map(|s| s.name.as_str()), Some("arrow.r"));
    }

    #[test]
    fn lim_prefixes_rank_first() {
        let found = SYMBOLS.search("lim");
        let keys: Vec<_> = found.iter().take(3).map(|m| m.key).collect();
        assert_eq!(keys, ["lim", "liminf", "limsup"]);
        assert!(found.iter().take(3).all(|m| m.kind == MatchKind::Base));
        assert!(found[3..].iter().all(|m| m.kind == MatchKind::Substring));
    }

    #[test]
    fn variants_follow_bases() {
        assert_snapshot!(listing(&SYMBOLS.search("arrow.l")), @r"
        base arrow.l ←
        base arrow.l.r ↔
        base arrow.l.long ⟵
        base arrow.l.double ⇐
        base arrow.l.r.double ⇔
        ");
        assert_snapshot!(listing(&SYMBOLS.search("eq")), @r"
        base eq =
        base equiv ≡
        variant eq.def ≝
        variant eq.not ≠
        variant eq.colon ≕
        variant equiv.not ≢
        substring gt.eq ≥
        substring lt.eq ≤
        substring prec.eq ⪯
        substring succ.eq ⪰
        substring colon.eq ≔
        substring tilde.eq ≃
        substring subset.eq ⊆
        substring supset.eq ⊇
        substring tilde.equiv ≅
        ");
    }

    #[test]
    fn shorthand_search() {
        assert_snapshot!(listing(&SYMBOLS.search("->")), @r"
        base -> →
        substring --> ⟶
        substring <-> ↔
        substring |-> ↦
        ");
    }

    #[test]
    fn latex_search_strips_backslashes() {
        assert_snapshot!(listing(&SYMBOLS.search(r"\alp")), @"base alpha α");
        assert_snapshot!(listing(&SYMBOLS.search(r"\\left")), @r"
        base leftarrow ←
        base leftrightarrow ↔
        substring longleftarrow ⟵
        ");
    }

    #[test]
    fn no_match_is_empty() {
        assert!(SYMBOLS.search("qqqq").is_empty());
    }

    #[test]
    fn math_class_is_case_insensitive() {
        let op: MathClass = EcoString::from("op").into();
        let large: MathClass = EcoString::from("LARGE").into();
        let other: MathClass = EcoString::from("Special").into();
        assert!(op.takes_argument());
        assert!(large.takes_argument());
        assert!(!MathClass::Normal.takes_argument());
        assert_eq!(other, MathClass::Other("Special".into()));
    }

    #[test]
    fn math_class_keeps_table_labels() {
        assert_eq!(SYMBOLS.get("sum").map(|s| s.math_class.as_str()), Some("Large"));
        assert_eq!(SYMBOLS.get("lim").map(|s| s.math_class.as_str()), Some("op"));
        assert_eq!(MathClass::Op.to_string(), "op");
    }

    #[test]
    fn shorthands_are_keys() {
        let index = SymbolIndex::from_symbols([SymbolData {
            sym: "→".into(),
            unic_name: "Rightwards Arrow".into(),
            name: "arrow.r".into(),
            shorthand: Some("->".into()),
            math_class: MathClass::Relation,
            latex_name: r"\rightarrow".into(),
        }]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.search("->")[0].symbol.name, "arrow.r");
        assert_eq!(index.search(r"\right")[0].key, "rightarrow");
    }
}
