//! Build script for ordertrack - locates the DuckDB library used for file decoding

use std::env;
use std::path::PathBuf;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Bundled DuckDB compiles its own copy; nothing to locate.
    if cfg!(feature = "bundled") {
        return;
    }

    if env::var("SKIP_DUCKDB_DETECTION").is_ok() {
        println!("cargo:rustc-link-lib=duckdb");
        return;
    }

    if let Some(lib_path) = find_duckdb_library() {
        println!("cargo:rustc-link-search=native={}", lib_path.display());
        println!("cargo:rustc-link-lib=duckdb");
    } else {
        eprintln!("DuckDB library not found.");
        eprintln!();
        eprintln!("Install DuckDB:");
        if cfg!(target_os = "macos") {
            eprintln!("  brew install duckdb");
        } else if cfg!(target_os = "linux") {
            eprintln!("  sudo apt install libduckdb-dev  # Ubuntu/Debian");
        }
        eprintln!();
        eprintln!("Or build with the bundled copy:");
        eprintln!("  cargo build --features bundled");
        eprintln!();
        eprintln!("Or point at a custom location:");
        eprintln!("  export DUCKDB_LIB_PATH=/path/to/duckdb/lib");
        panic!("DuckDB library not found");
    }
}

fn find_duckdb_library() -> Option<PathBuf> {
    if let Ok(path) = env::var("DUCKDB_LIB_PATH") {
        let path_buf = PathBuf::from(path);
        if check_duckdb_library(&path_buf) {
            return Some(path_buf);
        }
    }

    if let Some(path) = try_pkg_config() {
        return Some(path);
    }

    for path in standard_paths() {
        if check_duckdb_library(&path) {
            return Some(path);
        }
    }

    None
}

fn try_pkg_config() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return None;
    }

    if let Ok(output) = Command::new("pkg-config")
        .args(["--libs-only-L", "duckdb"])
        .output()
    {
        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            for line in stdout.lines() {
                if let Some(path_str) = line.strip_prefix("-L") {
                    let path = PathBuf::from(path_str.trim());
                    if check_duckdb_library(&path) {
                        return Some(path);
                    }
                }
            }
        }
    }

    None
}

fn standard_paths() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/lib"),
            PathBuf::from("/usr/local/lib"),
            PathBuf::from("/opt/local/lib"),
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            PathBuf::from("/usr/lib"),
            PathBuf::from("/usr/local/lib"),
            PathBuf::from("/lib"),
            PathBuf::from("/usr/lib/x86_64-linux-gnu"),
            PathBuf::from("/usr/lib64"),
        ]
    } else if cfg!(target_os = "windows") {
        vec![
            PathBuf::from("C:\\Program Files\\DuckDB\\lib"),
            PathBuf::from("C:\\duckdb\\lib"),
        ]
    } else {
        Vec::new()
    }
}

fn check_duckdb_library(path: &PathBuf) -> bool {
    if !path.exists() {
        return false;
    }

    let library_names = if cfg!(target_os = "windows") {
        vec!["duckdb.dll", "libduckdb.dll", "duckdb.lib"]
    } else if cfg!(target_os = "macos") {
        vec!["libduckdb.dylib", "libduckdb.so", "libduckdb.a"]
    } else {
        vec!["libduckdb.so", "libduckdb.so.1", "libduckdb.a"]
    };

    library_names.iter().any(|name| path.join(name).exists())
}
