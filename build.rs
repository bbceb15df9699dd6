use clap::CommandFactory;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

fn main() -> io::Result<()> {
    // Generate manpage using clap_mangen
    let cmd = moviescope_cli::Args::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buffer: Vec<u8> = Default::default();
    man.render(&mut buffer)?;

    let out_dir = PathBuf::from(
        env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?,
    );
    fs::write(out_dir.join("moviescope.1"), &buffer)?;

    // Release builds also drop the manpage next to the binary (OUT_DIR is target/release/build/<pkg>/out)
    if env::var("PROFILE").unwrap_or_default() == "release" {
        if let Some(release_dir) = out_dir.ancestors().nth(3) {
            fs::write(release_dir.join("moviescope.1"), &buffer)?;
        }
    }

    println!("cargo:rerun-if-changed=crates/moviescope-cli/src/lib.rs");
    println!("cargo:rerun-if-changed=crates/moviescope-cli/long_about.txt");
    Ok(())
}
