//! This build script copies the `memory.x` file from the crate root into a directory where
//! the linker can always find it at build time.
//!
//! It also bakes the current time of the build machine into the firmware, which uses it
//! as its clock reference until something better comes along.

use std::{env, fs::File, io::Write, path::PathBuf};

fn main() {
    // Put memory layout in the output directory and ensure it's on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    // create rs file with current UTC time and the local offset
    let now = chrono::Local::now();
    File::create(out.join("utc.rs"))
        .unwrap()
        .write_fmt(format_args!(
            "const UTC_TIME: i64 = {:?};\nconst UTC_OFFSET: i32 = {:?};\n",
            now.timestamp(),
            now.offset().local_minus_utc(),
        ))
        .unwrap();

    // No `rerun-if-changed`: `utc.rs` is regenerated whenever anything in the package changes.
}
