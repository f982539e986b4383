use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        println!("cargo:warning=CARGO_MANIFEST_DIR or OUT_DIR unset; skipping C header");
        return;
    };

    let generated = cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("PLACES_FFI_H")
        .with_documentation(true)
        .generate();

    // A header failure must not break the library build.
    match generated {
        Ok(bindings) => {
            bindings.write_to_file(PathBuf::from(out_dir).join("places_ffi.h"));
        }
        Err(err) => println!("cargo:warning=could not generate C header: {err}"),
    }
}
