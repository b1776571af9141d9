#![forbid(unsafe_code)]

//! fform sign-in demo binary.

use std::io;
use std::process::ExitCode;
use std::rc::Rc;

use fform::SubmitOutcome;
use fform_demo::cli::{Action, Opts};
use fform_demo::i18n::{Catalog, keys};
use fform_demo::render::TextRenderer;
use fform_demo::screen::{SignInDeps, SignInScreen, Tab};
use fform_demo::services::{RecordingNavigator, SessionStore, StubSessionClient};
use futures::executor::block_on;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FFORM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let opts = Opts::parse();

    let client = if opts.config.simulate_failure {
        StubSessionClient::failing()
    } else {
        StubSessionClient::new()
    };
    let store = Rc::new(SessionStore::new());
    let navigator = Rc::new(RecordingNavigator::new());
    let screen = SignInScreen::new(
        &opts.config,
        SignInDeps {
            translator: Rc::new(Catalog::english()),
            client: Rc::new(client),
            store: Rc::clone(&store),
            navigator: navigator.clone(),
        },
    );

    for line in screen.header() {
        println!("{line}");
    }
    println!();
    screen.form().subscribe(TextRenderer::new(io::stdout()));

    match opts.action {
        Action::Submit => {
            println!("> {}", screen.t(keys::BUTTON_SIGN_IN));
            let outcome = block_on(screen.handle_submit());
            tracing::debug!(?outcome, "submit finished");
            if let SubmitOutcome::Invalid(errors) = &outcome {
                tracing::info!(fields = errors.len(), "fix the highlighted fields");
            }
            match store.current() {
                Some(session) => {
                    println!("signed in (token {})", session.token);
                    ExitCode::SUCCESS
                }
                None => ExitCode::FAILURE,
            }
        }
        Action::ForgotPassword => {
            println!("> {}", screen.t(keys::BUTTON_FORGOT_PASSWORD));
            screen.handle_forgot_password();
            report_routes(&navigator)
        }
        Action::SignUp => {
            println!("> {}", screen.t(keys::TAB_SIGN_UP));
            screen.handle_tab_change(Tab::SignUp);
            report_routes(&navigator)
        }
    }
}

fn report_routes(navigator: &RecordingNavigator) -> ExitCode {
    for route in navigator.routes() {
        println!("navigate -> {route}");
    }
    ExitCode::SUCCESS
}
