#![forbid(unsafe_code)]

//! Sign-in screen built on fform.
//!
//! The screen layer of the app, reduced to text: translated labels, a stub
//! session client, a session store and a navigator are injected into
//! [`screen::SignInScreen`], which composes them onto a [`fform::Form`].

pub mod cli;
pub mod i18n;
pub mod render;
pub mod screen;
pub mod services;
