use mathmate::harness::EditorHarness;
use mathmate::{LocalRenderer, MathmateConfig, Session};
use mathmate_query::{Key, KeyEvent, NoScripts};
use mathmate_std::error::prelude::*;

use crate::args::ReplayArgs;
use crate::utils::read_document;

/// Opens the document in a simulated editor, presses the keys and prints the
/// final state.
pub async fn replay_main(args: ReplayArgs, config: MathmateConfig) -> Result<()> {
    let buffer = read_document(&args.cursor.file)?;
    let session = Session::new(config, Box::new(NoScripts));
    let mut editor = EditorHarness::new(session, LocalRenderer);
    editor.load(buffer.text(), args.cursor.cursor()).await;

    for token in args.keys.split_whitespace() {
        let event = KeyEvent::parse(token);
        if matches!(event.key, Key::Named(_)) {
            editor.type_text(token).await;
        } else {
            let handled = editor.key(event).await;
            log::debug!("pressed {token}, handled: {handled}");
        }
        editor.settle().await;

        if args.effects {
            for effect in editor.take_journal() {
                let line = serde_json::to_string(&effect).context("serialize effect")?;
                println!("{line}");
            }
        }
    }

    print!("{}", editor.describe());
    Ok(())
}
