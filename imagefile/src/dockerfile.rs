//! Just enough Dockerfile parsing to find out which images a build depends on.

use std::{collections::BTreeSet, path::Path};

use crate::Result;

/// Joins lines ending in a backslash with the line that follows. Blank and comment lines are dropped, also in the
/// middle of a continuation.
fn logical_lines(contents: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.strip_suffix('\\') {
            Some(head) => {
                current.push_str(head);
                current.push(' ');
            }
            None => {
                current.push_str(trimmed);
                lines.push(std::mem::take(&mut current));
            }
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    lines
}

/// Returns the images referenced by `FROM` instructions. Build stages declared with `AS` and `scratch` are not
/// images that can be pulled and are left out, as are references to build arguments such as `${BASE}`.
pub fn dependency_images(contents: &str) -> BTreeSet<String> {
    let mut stages = BTreeSet::new();
    let mut images = BTreeSet::new();

    for line in logical_lines(contents) {
        let mut words = line.split_whitespace();
        let Some(instruction) = words.next() else {
            continue;
        };
        if !instruction.eq_ignore_ascii_case("FROM") {
            continue;
        }

        let mut words = words.skip_while(|word| word.starts_with("--"));
        let Some(image) = words.next() else {
            continue;
        };

        // Images built from `ARG` values are only known to the engine.
        let is_variable = image.contains('$');
        if !is_variable
            && !image.eq_ignore_ascii_case("scratch")
            && !stages.contains(&image.to_ascii_lowercase())
        {
            images.insert(image.to_owned());
        }

        if let (Some(keyword), Some(stage)) = (words.next(), words.next()) {
            if keyword.eq_ignore_ascii_case("AS") {
                stages.insert(stage.to_ascii_lowercase());
            }
        }
    }

    images
}

pub fn dependency_images_from_path(path: &Path) -> Result<BTreeSet<String>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|error| format!("failed to read dockerfile {path:?}: {error}"))?;
    Ok(dependency_images(&contents))
}
