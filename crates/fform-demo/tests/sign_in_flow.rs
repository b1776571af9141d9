#![forbid(unsafe_code)]

//! End-to-end sign-in flow through the text renderer.
//!
//! Run: `cargo test -p fform-demo --test sign_in_flow`

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use fform::{Fragment, SubmitOutcome};
use fform_demo::cli::SignInConfig;
use fform_demo::i18n::Catalog;
use fform_demo::render::TextRenderer;
use fform_demo::screen::{SignInDeps, SignInScreen, instruction};
use fform_demo::services::{RecordingNavigator, SessionStore, StubSessionClient};
use futures::executor::block_on;
use proptest::prelude::*;

/// `Write` sink shared with the test.
#[derive(Clone, Default)]
struct Shared(Rc<RefCell<Vec<u8>>>);

impl Write for Shared {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Shared {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.borrow())
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

fn mount(config: &SignInConfig) -> (SignInScreen, Rc<SessionStore>, Shared) {
    let store = Rc::new(SessionStore::new());
    let screen = SignInScreen::new(
        config,
        SignInDeps {
            translator: Rc::new(Catalog::english()),
            client: Rc::new(StubSessionClient::new()),
            store: Rc::clone(&store),
            navigator: Rc::new(RecordingNavigator::new()),
        },
    );
    let out = Shared::default();
    screen.form().subscribe(TextRenderer::new(out.clone()));
    (screen, store, out)
}

#[test]
fn fix_and_retry_signs_in() {
    let (screen, store, out) = mount(&SignInConfig::default());

    assert!(matches!(
        block_on(screen.handle_submit()),
        SubmitOutcome::Invalid(_)
    ));
    screen.set_phone("5551234");
    screen.handle_submit_phone();
    screen.set_password("secret1");
    assert_eq!(block_on(screen.handle_submit()), SubmitOutcome::Succeeded);
    assert!(store.is_signed_in());

    let lines = out.lines();
    let states: Vec<_> = lines
        .iter()
        .map(|l| &l[..l.find(']').map_or(0, |i| i + 1)])
        .collect();
    assert_eq!(
        states,
        [
            "[idle]",
            "[validating]",
            "[idle]",
            "[idle]",
            "[idle]",
            "[validating]",
            "[submitting]",
            "[succeeded]",
            "[idle]",
        ]
    );
    assert!(lines[2].contains("| Phone number is required"));
    assert!(lines[2].contains("| Password is required"));
    assert!(lines.iter().all(|l| !l.contains("secret1")));
}

proptest! {
    #[test]
    fn instruction_reassembles_phrase(phrase in "[a-z *]{0,40}") {
        let rebuilt: String = instruction(&phrase)
            .into_iter()
            .map(|fragment| match fragment {
                Fragment::Text(text) => text.to_string(),
                Fragment::Node(highlight) => format!("*{}*", highlight.text),
            })
            .collect();
        prop_assert_eq!(rebuilt, phrase);
    }
}
