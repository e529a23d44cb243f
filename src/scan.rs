use anyhow::{Result, bail};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

const INPUT_EXTENSIONS: [&str; 3] = ["java", "jar", "zip"];

/// Every `.java`, `.jar` and `.zip` file below `base_path`, sorted.
pub fn discover_inputs(base_path: &Path) -> Result<Vec<PathBuf>> {
    if !base_path.exists() {
        bail!("Input path does not exist: {}", base_path.display());
    }

    let (tx, rx) = mpsc::channel();

    let walker = WalkBuilder::new(base_path)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            if let Ok(entry) = entry {
                let path = entry.path();
                if path.is_file() && is_input(path) {
                    let _ = tx.send(path.to_path_buf());
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut inputs: Vec<PathBuf> = rx.iter().collect();
    inputs.sort();
    Ok(inputs)
}

fn is_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| INPUT_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}
