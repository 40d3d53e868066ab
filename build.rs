use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let version_path = Path::new(&out_dir).join("cache_version.rs");
    
    // Read cache format version from Cargo.toml metadata
    let cargo_manifest = env::var("CARGO_MANIFEST_DIR").unwrap();
    let cargo_toml_path = Path::new(&cargo_manifest).join("Cargo.toml");
    let cargo_toml_content = fs::read_to_string(&cargo_toml_path)
        .expect("Failed to read Cargo.toml");
    
    let cargo_toml: toml::Value = cargo_toml_content.parse()
        .expect("Failed to parse Cargo.toml");
    
    let cache_version = cargo_toml
        .get("package")
        .and_then(|p| p.get("metadata"))
        .and_then(|m| m.get("walgen"))
        .and_then(|w| w.get("cache_version"))
        .and_then(|v| v.as_str())
        .expect("Failed to find package.metadata.walgen.cache_version in Cargo.toml");
    
    let version_content = format!(
        "// Auto-generated cache format version from Cargo.toml metadata\n\
         // Source: package.metadata.walgen.cache_version = {:?}\n\
         pub const CACHE_VERSION: &str = {:?};\n",
        cache_version, cache_version
    );
    
    fs::write(&version_path, version_content)
        .expect("Failed to write cache_version.rs");
    
    println!("cargo:rerun-if-changed=Cargo.toml");
}
