use mathmate::{
    BracketPairEngine, EditorEvent, EditorSnapshot, Effect, LocalRenderer, MathmateConfig,
    MonospaceGeometry, PopupPosition, PopupView, Refresh, Renderer, Session, project_pair,
};
use mathmate_analysis::{SYMBOLS, locate};
use mathmate_query::NoScripts;
use mathmate_std::error::prelude::*;
use serde::Serialize;

use crate::args::{CursorArgs, SymbolsArgs};
use crate::utils::{print_json, read_document};

/// Prints the math region around the cursor.
pub fn region_main(args: CursorArgs) -> Result<()> {
    let buffer = read_document(&args.file)?;
    print_json(&locate(&buffer, args.cursor()))
}

/// Prints the bracket pairs of the math region around the cursor, marking the
/// enclosing one with `*`.
pub async fn brackets_main(args: CursorArgs) -> Result<()> {
    let buffer = read_document(&args.file)?;
    let cursor = buffer.clamp(args.cursor());
    let Some(region) = locate(&buffer, cursor) else {
        println!("no math at {cursor}");
        return Ok(());
    };

    let mut engine = BracketPairEngine::default();
    if let Refresh::Requested(content) = engine.refresh(Some(&region)) {
        let result = LocalRenderer.find_bracket_pairs(&content).await;
        engine.commit(&content, result);
    }

    let enclosing = engine.enclosing_pair(cursor);
    for pair in engine.pairs().unwrap_or_default() {
        let (open, close) = project_pair(&region, pair);
        let mark = if enclosing == Some(pair) { '*' } else { ' ' };
        println!("{mark} {} {open} {close} depth {}", pair.kind, pair.depth);
    }
    Ok(())
}

/// Prints the ranked matches of a symbol query.
pub fn symbols_main(args: SymbolsArgs) -> Result<()> {
    for found in SYMBOLS.search(&args.query).into_iter().take(args.limit) {
        let symbol = found.symbol;
        println!(
            "{} {} {} ({})",
            found.kind, found.key, symbol.sym, symbol.math_class
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct PlacedPopup<'a> {
    popup: &'a PopupView,
    position: PopupPosition,
}

/// Prints the popup a session would show with the cursor at the position.
pub fn trigger_main(args: CursorArgs, config: MathmateConfig) -> Result<()> {
    let buffer = read_document(&args.file)?;
    let cursor = args.cursor();
    let mut session = Session::new(config, Box::new(NoScripts));
    let snapshot = EditorSnapshot::new(buffer.text(), cursor);
    let reaction = session.handle(EditorEvent::Changed(snapshot));

    let popup = reaction.effects.iter().find_map(|effect| match effect {
        Effect::ShowPopup(popup) => Some(popup),
        _ => None,
    });
    let Some(popup) = popup else {
        println!("no query at {cursor}");
        return Ok(());
    };
    let position = PopupPosition::below(&MonospaceGeometry::default(), popup.range);
    print_json(&PlacedPopup { popup, position })
}
