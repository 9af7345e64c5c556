//! Pokedex build script.

use rustc_version::{version_meta, Channel};

#[doc(hidden)]
fn main() {
    // `run_migrations` embeds the migrations; `seed_db` is run next to `seed/`.
    println!("cargo:rerun-if-changed=migrations");
    println!("cargo:rerun-if-changed=build.rs");

    // Error backtraces are requested through `error_generic_member_access`, only on Nightly.
    match version_meta() {
        Ok(meta) if meta.channel <= Channel::Nightly => {
            println!("cargo:rustc-cfg=backtrace_support");
        },
        Ok(_) => (),
        Err(err) => println!("cargo:warning=could not detect rustc channel: {}", err),
    }
}
