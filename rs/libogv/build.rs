use std::env;
use std::fs;
use std::path::PathBuf;

const LIB_NAME: &str = "ogvplay";

fn main() {
	let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap();

	// Generate the C header into target/include/
	let include_dir = target_dir().join("include");
	fs::create_dir_all(&include_dir).expect("failed to create include directory");

	cbindgen::Builder::new()
		.with_crate(&crate_dir)
		.with_language(cbindgen::Language::C)
		.with_include_guard("OGVPLAY_H")
		.with_item_prefix("ogv_")
		.generate()
		.expect("unable to generate bindings")
		.write_to_file(include_dir.join(format!("{LIB_NAME}.h")));
}

fn target_dir() -> PathBuf {
	// OUT_DIR is target/{debug|release}/build/{crate}-{hash}/out
	PathBuf::from(env::var("OUT_DIR").unwrap())
		.ancestors()
		.nth(4)
		.expect("failed to get target directory from OUT_DIR")
		.to_path_buf()
}
