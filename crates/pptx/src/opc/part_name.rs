//! Part name arithmetic: resolving and building relationship targets.
//!
//! Part names are absolute paths inside the package, e.g.
//! `/ppt/slides/slide1.xml`. Relationship targets are usually relative to the
//! directory of their source part.

/// Directory of a part name, with trailing '/'.
pub fn dir_of(part_name: &str) -> &str {
    match part_name.rfind('/') {
        Some(pos) => &part_name[..=pos],
        None => "/",
    }
}

/// File name component of a part name.
pub fn file_of(part_name: &str) -> &str {
    match part_name.rfind('/') {
        Some(pos) => &part_name[pos + 1..],
        None => part_name,
    }
}

/// Resolve a relationship target against the part that owns the relationship.
///
/// `source` is `/` for package-level relationships.
pub fn resolve(source: &str, target: &str) -> String {
    let joined = if target.starts_with('/') {
        target.to_string()
    } else {
        format!("{}{}", dir_of(source), target)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Relative target that reaches `target` from the directory of `source`.
pub fn relative(source: &str, target: &str) -> String {
    let from: Vec<&str> = dir_of(source).split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
    let (to_dirs, to_file) = match to.split_last() {
        Some((file, dirs)) => (dirs, *file),
        None => (&[][..], ""),
    };

    let common = from
        .iter()
        .zip(to_dirs.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(from.len() - common));
    parts.extend(&to_dirs[common..]);
    parts.push(to_file);
    parts.join("/")
}

/// Name of the relationships part belonging to `part_name`.
///
/// `/ppt/slides/slide1.xml` has its relationships in
/// `/ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_part_for(part_name: &str) -> String {
    format!("{}_rels/{}.rels", dir_of(part_name), file_of(part_name))
}

/// Inverse of [`rels_part_for`]: the source part of a relationships part.
pub fn source_of_rels(rels_name: &str) -> Option<String> {
    let file = file_of(rels_name).strip_suffix(".rels")?;
    let dir = dir_of(rels_name).strip_suffix("_rels/")?;
    Some(format!("{}{}", dir, file))
}

/// Extension of a part name, lower-cased.
pub fn extension_of(part_name: &str) -> Option<String> {
    let file = file_of(part_name);
    file.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Extract a trailing number from a string like "rId2" or "slide3.xml".
pub fn trailing_number(s: &str) -> Option<u32> {
    let stem = match s.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => s,
    };
    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    stem[digits_start..].parse().ok()
}

/// Split a numbered part name into its prefix and extension:
/// `/ppt/media/image12.png` becomes (`/ppt/media/image`, `png`).
pub fn numbered_stem(part_name: &str) -> (String, String) {
    let (stem, ext) = match part_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.ends_with('/') => (stem, ext),
        _ => (part_name, ""),
    };
    let prefix = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    (prefix.to_string(), ext.to_string())
}
